//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional. Empty values count as unset.
//!
//! - `CATALOG_API_BASE_URL` - Product API root; without it the mock source is used
//! - `CATALOG_API_TOKEN` - Bearer token for the product API
//! - `CATALOG_REQUEST_TIMEOUT_SECS` - HTTP timeout (default: 10)
//! - `CATALOG_FIXTURES` - JSON fixture file for the mock source (default: built-in sample)
//! - `CATALOG_MOCK_LATENCY_MS` - Simulated mock latency (default: 300)
//! - `CATALOG_PAGE_SIZE` - Default page size (default: 20)
//! - `CATALOG_CACHE_TTL_SECS` - Cache time-to-live, 0 disables expiry (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use shopfront_catalog::page::DEFAULT_PAGE_SIZE;
use shopfront_catalog::{CacheSettings, HttpSourceConfig};
use thiserror::Error;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MOCK_LATENCY_MS: u64 = 300;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog CLI configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Product API root, `None` selects the mock source
    pub api_base_url: Option<Url>,
    /// Product API bearer token
    pub api_token: Option<SecretString>,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Fixture file for the mock source
    pub fixtures: Option<PathBuf>,
    /// Simulated latency of the mock source
    pub mock_latency: Duration,
    /// Page size used when `--page-size` is not given
    pub page_size: usize,
    /// Cache expiry, `None` keeps entries until cleared
    pub cache_ttl: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("api_base_url", &self.api_base_url.as_ref().map(Url::as_str))
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .field("fixtures", &self.fixtures)
            .field("mock_latency", &self.mock_latency)
            .field("page_size", &self.page_size)
            .field("cache_ttl", &self.cache_ttl)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value, or if
    /// a token is given without an API base URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base_url = get("CATALOG_API_BASE_URL")
            .map(|raw| {
                Url::parse(raw.trim()).map_err(|e| {
                    ConfigError::InvalidEnvVar("CATALOG_API_BASE_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let api_token = get("CATALOG_API_TOKEN").map(SecretString::from);
        if api_token.is_some() && api_base_url.is_none() {
            return Err(ConfigError::MissingEnvVar("CATALOG_API_BASE_URL".to_string()));
        }

        let request_timeout = Duration::from_secs(parse_or(
            &get,
            "CATALOG_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_REQUEST_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let page_size = parse_or(&get, "CATALOG_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let cache_ttl_secs = parse_or(&get, "CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;

        Ok(Self {
            api_base_url,
            api_token,
            request_timeout,
            fixtures: get("CATALOG_FIXTURES").map(PathBuf::from),
            mock_latency: Duration::from_millis(parse_or(
                &get,
                "CATALOG_MOCK_LATENCY_MS",
                DEFAULT_MOCK_LATENCY_MS,
            )?),
            page_size,
            cache_ttl: (cache_ttl_secs > 0).then(|| Duration::from_secs(cache_ttl_secs)),
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }

    /// HTTP source settings, if an API base URL is configured.
    #[must_use]
    pub fn http_source(&self) -> Option<HttpSourceConfig> {
        let base_url = self.api_base_url.clone()?;
        Some(HttpSourceConfig {
            base_url,
            api_token: self.api_token.clone(),
            timeout: self.request_timeout,
        })
    }

    /// Cache settings for the configured TTL.
    #[must_use]
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            time_to_live: self.cache_ttl,
            ..CacheSettings::default()
        }
    }
}

/// Parse `key` if set, otherwise fall back to `default`.
fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    get(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
