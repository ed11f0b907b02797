//! Fixture-backed product source with simulated network latency.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shopfront_core::{Product, ProductId};
use tracing::{debug, instrument};

use super::{ProductSource, validate_all};
use crate::error::SourceError;

/// Built-in sample catalogue.
const SAMPLE_PRODUCTS: &str = include_str!("../../fixtures/products.json");

/// Simulated latency of list and search requests.
const LIST_LATENCY: Duration = Duration::from_millis(300);

/// Simulated latency of detail requests.
const DETAIL_LATENCY: Duration = Duration::from_millis(200);

/// In-memory product source standing in for the product API.
///
/// Every call counts towards [`request_count`](Self::request_count), and the
/// source can be switched offline to simulate a failing backend.
#[derive(Debug)]
pub struct MockProductSource {
    products: Vec<Product>,
    list_latency: Duration,
    detail_latency: Duration,
    offline: AtomicBool,
    requests: AtomicUsize,
}

impl MockProductSource {
    /// Serve `products` with the default simulated latency.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            list_latency: LIST_LATENCY,
            detail_latency: DETAIL_LATENCY,
            offline: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        }
    }

    /// Serve the built-in sample catalogue.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled fixture data fails to parse or validate.
    pub fn sample() -> Result<Self, SourceError> {
        Self::from_json(SAMPLE_PRODUCTS)
    }

    /// Serve products parsed from a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a product is invalid.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        validate_all(&products)?;
        Ok(Self::new(products))
    }

    /// Serve products loaded from a JSON fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is invalid.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&json)
    }

    /// Override the simulated latency for every request kind.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.list_latency = latency;
        self.detail_latency = latency;
        self
    }

    /// Make every subsequent request fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of requests served or refused so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// The fixture products.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    async fn begin_request(&self, latency: Duration) -> Result<(), SourceError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("mock source is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductSource for MockProductSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    #[instrument(skip(self))]
    async fn fetch_product_list(&self) -> Result<Vec<Product>, SourceError> {
        self.begin_request(self.list_latency).await?;
        debug!(count = self.products.len(), "Serving mock product list");
        Ok(self.products.clone())
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn fetch_product_by_id(&self, id: ProductId) -> Result<Product, SourceError> {
        self.begin_request(self.detail_latency).await?;
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(SourceError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, SourceError> {
        self.begin_request(self.list_latency).await?;
        // Case-sensitive, unlike the catalog keyword filter
        Ok(self
            .products
            .iter()
            .filter(|p| p.name.contains(keyword) || p.description.contains(keyword))
            .cloned()
            .collect())
    }
}
