//! CLI command implementations.
//!
//! Every command builds a [`CatalogView`] over the configured source, then
//! reads from it. Listing output goes to stdout; logs go to stderr.

pub mod facets;
pub mod list;
pub mod search;
pub mod show;

use std::sync::Arc;

use shopfront_catalog::{
    CatalogError, CatalogView, HttpProductSource, MockProductSource, ProductCache, ProductSource,
    SourceError, ViewOptions,
};
use thiserror::Error;

use crate::config::CatalogConfig;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configured data source could not be set up.
    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    /// The catalog rejected a request.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Output serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Select the data source named by `config`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the fixture file
/// cannot be loaded.
pub async fn build_source(config: &CatalogConfig) -> Result<Arc<dyn ProductSource>, CliError> {
    if let Some(http) = config.http_source() {
        tracing::info!(base_url = %http.base_url, "Using HTTP product source");
        return Ok(Arc::new(HttpProductSource::new(&http)?));
    }

    let source = match &config.fixtures {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using fixture product source");
            MockProductSource::from_path(path).await?
        }
        None => {
            tracing::info!("Using built-in sample products");
            MockProductSource::sample()?
        }
    };
    Ok(Arc::new(source.with_latency(config.mock_latency)))
}

/// Build a view over the configured source.
///
/// # Errors
///
/// Returns an error if the source cannot be set up.
pub async fn build_view(config: &CatalogConfig) -> Result<CatalogView, CliError> {
    let source = build_source(config).await?;
    let options = ViewOptions {
        page_size: config.page_size,
        ..ViewOptions::default()
    };
    Ok(CatalogView::with_options(
        source,
        ProductCache::new(config.cache_settings()),
        options,
    ))
}

/// Fetch the product list, turning a recorded fetch error into a failure.
///
/// # Errors
///
/// Returns the fetch error recorded by the view.
pub async fn load(view: &mut CatalogView) -> Result<(), CliError> {
    view.fetch(false).await;
    match view.error() {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}
