//! Error types for data sources and the catalog view boundary.

use shopfront_core::{ProductError, ProductId};
use thiserror::Error;

/// Errors that can occur when talking to a product data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// The configured base URL cannot address an endpoint.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Reading fixture data failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A product record broke a data invariant.
    #[error("Invalid product: {0}")]
    InvalidProduct(#[from] ProductError),

    /// No product with the requested ID.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// The source is switched off or unreachable.
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by [`CatalogView`](crate::CatalogView).
///
/// Cloneable so it can be held in view state and broadcast to observers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Loading the product list failed.
    #[error("Failed to fetch product list: {0}")]
    FetchFailed(String),

    /// A single-item lookup found no product.
    #[error("Product not found: {0}")]
    NotFound(ProductId),
}

impl From<SourceError> for CatalogError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound(id) => Self::NotFound(id),
            other => Self::FetchFailed(other.to_string()),
        }
    }
}
