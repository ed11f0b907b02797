//! Product API client.
//!
//! Talks to a JSON product API:
//!
//! | Operation | Request |
//! |---|---|
//! | product list | `GET {base}/products` |
//! | product detail | `GET {base}/products/{id}` |
//! | search | `GET {base}/products/search?keyword=...` |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use shopfront_core::{Product, ProductId};
use tracing::{debug, instrument};
use url::Url;

use super::{ProductSource, validate_all};
use crate::error::SourceError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response body excerpt kept in errors and logs.
const BODY_EXCERPT_CHARS: usize = 200;

/// Product API connection settings.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct HttpSourceConfig {
    /// API root, e.g. `https://shop.example.com/api/`
    pub base_url: Url,
    /// Bearer token sent with every request.
    pub api_token: Option<SecretString>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpSourceConfig {
    /// Settings for `base_url` with no token and the default timeout.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for HttpSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSourceConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Client for the product API.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone)]
pub struct HttpProductSource {
    inner: Arc<HttpProductSourceInner>,
}

struct HttpProductSourceInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
}

impl HttpProductSource {
    /// Create a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &HttpSourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(HttpProductSourceInner {
                client,
                base_url: with_trailing_slash(config.base_url.clone()),
                api_token: config.api_token.clone(),
            }),
        })
    }

    /// The normalized API root.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a GET request and decode a JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        let mut request = self
            .inner
            .client
            .get(url)
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let body = excerpt(&response_text);
            tracing::warn!(status = %status, body = %body, "Product API returned non-success status");
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(&response_text),
                "Failed to parse product API response"
            );
            SourceError::Parse(e)
        })
    }
}

#[async_trait]
impl ProductSource for HttpProductSource {
    fn name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self))]
    async fn fetch_product_list(&self) -> Result<Vec<Product>, SourceError> {
        let products: Vec<Product> = self.get_json(self.endpoint("products")?).await?;
        debug!(count = products.len(), "Fetched product list");
        Ok(products)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn fetch_product_by_id(&self, id: ProductId) -> Result<Product, SourceError> {
        let url = self.endpoint(&format!("products/{id}"))?;
        let product: Product = match self.get_json(url).await {
            Ok(product) => product,
            Err(SourceError::Status { status: 404, .. }) => return Err(SourceError::NotFound(id)),
            Err(e) => return Err(e),
        };
        product.validate()?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, SourceError> {
        let mut url = self.endpoint("products/search")?;
        url.query_pairs_mut().append_pair("keyword", keyword);
        let products: Vec<Product> = self.get_json(url).await?;
        validate_all(&products)?;
        Ok(products)
    }
}

/// `Url::join` drops the last path segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
