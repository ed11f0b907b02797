//! Snapshot cache for fetched product collections.
//!
//! Holds at most one [`CacheEntry`] per fetch key. Entries are immutable and
//! shared through `Arc`, so replacing one never disturbs a reader holding
//! the previous snapshot.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use shopfront_core::Product;
use tracing::{debug, instrument};

use crate::error::SourceError;
use crate::source::ProductSource;

/// An immutable, shareable product sequence.
pub type Collection = Arc<[Product]>;

/// One fetched snapshot of the catalog.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Fetch key this snapshot belongs to.
    pub key: String,
    /// Products in API order.
    pub data: Collection,
    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
}

/// Cache sizing and expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Maximum number of keys kept.
    pub max_capacity: u64,
    /// Expire entries this long after insertion. `None` keeps them until
    /// cleared or replaced.
    pub time_to_live: Option<Duration>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: 16,
            time_to_live: None,
        }
    }
}

/// Keyed store of product snapshots.
///
/// Cheaply cloneable; clones share the same entries.
#[derive(Clone)]
pub struct ProductCache {
    entries: Cache<String, Arc<CacheEntry>>,
}

impl Default for ProductCache {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}

impl std::fmt::Debug for ProductCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCache")
            .field("entry_count", &self.entries.entry_count())
            .finish()
    }
}

impl ProductCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(settings: CacheSettings) -> Self {
        let mut builder = Cache::builder().max_capacity(settings.max_capacity);
        if let Some(ttl) = settings.time_to_live {
            builder = builder.time_to_live(ttl);
        }
        Self {
            entries: builder.build(),
        }
    }

    /// Look up the snapshot stored under `key`.
    pub async fn get(&self, key: &str) -> Option<Arc<CacheEntry>> {
        self.entries.get(key).await
    }

    /// Whether a snapshot is stored under `key`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Store `data` under `key`, replacing any previous snapshot in one step.
    pub async fn put(&self, key: &str, data: Collection) -> Arc<CacheEntry> {
        let entry = Arc::new(CacheEntry {
            key: key.to_owned(),
            data,
            fetched_at: Utc::now(),
        });
        self.entries.insert(key.to_owned(), Arc::clone(&entry)).await;
        debug!(key, count = entry.data.len(), "Cached product snapshot");
        entry
    }

    /// Drop the snapshot stored under `key`.
    pub async fn invalidate(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    /// Drop every snapshot. Subsequent lookups miss until the next `put`.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        debug!("Cleared product cache");
    }

    /// Fetch the product list from `source`, validate it, and store it
    /// under `key`.
    ///
    /// On failure the existing snapshot, if any, is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the source error if the fetch fails or a product is invalid.
    #[instrument(skip(self, source), fields(source = source.name()))]
    pub async fn refresh(
        &self,
        key: &str,
        source: &dyn ProductSource,
    ) -> Result<Arc<CacheEntry>, SourceError> {
        let products = source.fetch_product_list().await.inspect_err(|e| {
            debug!(key, error = %e, "Product list fetch failed, keeping cached snapshot");
        })?;
        crate::source::validate_all(&products)?;
        Ok(self.put(key, products.into()).await)
    }

    /// Serve `key` from the cache unless `force` is set or the key misses;
    /// otherwise [`refresh`](Self::refresh).
    ///
    /// For callers without view state. [`CatalogView::fetch`](crate::CatalogView::fetch)
    /// splits these two steps so it can publish the loading transition.
    ///
    /// # Errors
    ///
    /// Returns the source error if a fetch was needed and failed.
    pub async fn fetch_products(
        &self,
        key: &str,
        source: &dyn ProductSource,
        force: bool,
    ) -> Result<Arc<CacheEntry>, SourceError> {
        if !force && let Some(entry) = self.get(key).await {
            debug!(key, "Cache hit for product list");
            return Ok(entry);
        }
        self.refresh(key, source).await
    }
}
