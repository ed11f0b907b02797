//! Product data sources.
//!
//! The engine only sees [`ProductSource`]; whether products come from fixture
//! data or a product API is the caller's choice.
//!
//! - [`MockProductSource`] - in-memory fixtures with simulated latency
//! - [`HttpProductSource`] - JSON product API over `reqwest`

mod http;
mod mock;

pub use http::{HttpProductSource, HttpSourceConfig};
pub use mock::MockProductSource;

use async_trait::async_trait;
use shopfront_core::{Product, ProductId};

use crate::error::SourceError;

/// Asynchronous access to the product catalog.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// A name for tracing.
    fn name(&self) -> &'static str;

    /// Fetch the full product list.
    async fn fetch_product_list(&self) -> Result<Vec<Product>, SourceError>;

    /// Fetch a single product.
    ///
    /// Must return [`SourceError::NotFound`] when no product has `id`.
    async fn fetch_product_by_id(&self, id: ProductId) -> Result<Product, SourceError>;

    /// Search products by keyword.
    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, SourceError>;
}

/// Reject a batch if any product breaks a data invariant.
pub(crate) fn validate_all(products: &[Product]) -> Result<(), SourceError> {
    for product in products {
        product.validate()?;
    }
    Ok(())
}
