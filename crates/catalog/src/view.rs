//! View controller: owns the view parameters and derives the visible page.
//!
//! [`CatalogView`] holds the filter, sort and pagination parameters next to
//! the committed product [`Collection`]. Nothing is precomputed; every
//! derived read runs `filter → sort → page` over the current inputs, so
//! reading twice without a mutation in between yields the same result.
//!
//! Mutations take `&mut self`. `fetch` is the only one that suspends, and
//! observers following [`CatalogView::subscribe`] see `loading = true` with
//! the previous collection and error until it commits.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shopfront_core::{Product, ProductId};
use tokio::sync::watch;
use tracing::{debug, error, instrument};

use crate::cache::{CacheEntry, Collection, ProductCache};
use crate::error::CatalogError;
use crate::filter::{self, FilterSpec, FilterUpdate};
use crate::page::{self, DEFAULT_PAGE_SIZE, PageState};
use crate::sort::{self, SortKey};
use crate::source::ProductSource;

/// Cache key of the full product list.
pub const DEFAULT_CACHE_KEY: &str = "all-products";

/// Construction options for [`CatalogView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// Key the product list is cached under.
    pub cache_key: String,
    /// Initial page size.
    pub page_size: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Snapshot published to observers after each committed mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewStatus {
    /// A fetch is in flight.
    pub loading: bool,
    /// Error recorded by the last fetch.
    pub error: Option<CatalogError>,
    /// Products matching the current filters.
    pub total: usize,
    /// When the committed collection was fetched.
    pub fetched_at: Option<DateTime<Utc>>,
    /// The committed collection.
    pub products: Option<Collection>,
}

/// Derived view over a cached product collection.
pub struct CatalogView {
    source: Arc<dyn ProductSource>,
    cache: ProductCache,
    cache_key: String,
    products: Option<Collection>,
    fetched_at: Option<DateTime<Utc>>,
    filters: FilterSpec,
    sort_by: SortKey,
    pagination: PageState,
    loading: bool,
    error: Option<CatalogError>,
    status: watch::Sender<ViewStatus>,
}

impl std::fmt::Debug for CatalogView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogView")
            .field("source", &self.source.name())
            .field("cache_key", &self.cache_key)
            .field("products", &self.products.as_ref().map(|p| p.len()))
            .field("filters", &self.filters)
            .field("sort_by", &self.sort_by)
            .field("pagination", &self.pagination)
            .field("loading", &self.loading)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl CatalogView {
    /// Create a view over `source` with a private cache and default options.
    #[must_use]
    pub fn new(source: Arc<dyn ProductSource>) -> Self {
        Self::with_options(source, ProductCache::default(), ViewOptions::default())
    }

    /// Create a view with an explicit cache and options.
    ///
    /// Views sharing a [`ProductCache`] share fetched snapshots.
    #[must_use]
    pub fn with_options(
        source: Arc<dyn ProductSource>,
        cache: ProductCache,
        options: ViewOptions,
    ) -> Self {
        let (status, _) = watch::channel(ViewStatus::default());
        Self {
            source,
            cache,
            cache_key: options.cache_key,
            products: None,
            fetched_at: None,
            filters: FilterSpec::default(),
            sort_by: SortKey::default(),
            pagination: PageState::new(1, options.page_size),
            loading: false,
            error: None,
            status,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Load the product list.
    ///
    /// Without `force`, a cached snapshot is committed with no request and no
    /// loading transition. Otherwise the source is queried; on failure the
    /// previous collection stays in place and the error is recorded in
    /// [`error`](Self::error) instead of being returned. The previous error
    /// is kept while the request is in flight and cleared on success.
    #[instrument(skip(self), fields(key = %self.cache_key))]
    pub async fn fetch(&mut self, force: bool) {
        if !force && let Some(entry) = self.cache.get(&self.cache_key).await {
            debug!("Serving product list from cache");
            self.commit(&entry);
            self.recompute_total();
            self.publish();
            return;
        }

        self.loading = true;
        self.publish();

        match self
            .cache
            .refresh(&self.cache_key, self.source.as_ref())
            .await
        {
            Ok(entry) => {
                self.commit(&entry);
                self.error = None;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch product list");
                self.error = Some(e.into());
            }
        }

        self.loading = false;
        self.recompute_total();
        self.publish();
    }

    /// Merge `update` into the filters and go back to the first page.
    pub fn update_filters(&mut self, update: FilterUpdate) {
        self.filters.merge(update);
        self.pagination.set_current_page(1);
        self.recompute_total();
        self.publish();
    }

    /// Clear every filter and go back to the first page.
    pub fn reset_filters(&mut self) {
        self.filters = FilterSpec::default();
        self.pagination.set_current_page(1);
        self.recompute_total();
        self.publish();
    }

    /// Change the sort order and go back to the first page.
    pub fn update_sort_by(&mut self, sort_by: SortKey) {
        self.sort_by = sort_by;
        self.pagination.set_current_page(1);
        self.recompute_total();
        self.publish();
    }

    /// Set the page and/or the page size. Values below 1 are clamped to 1.
    pub fn update_pagination(&mut self, current_page: Option<usize>, page_size: Option<usize>) {
        if let Some(page) = current_page {
            self.pagination.set_current_page(page);
        }
        if let Some(size) = page_size {
            self.pagination.set_page_size(size);
        }
        self.publish();
    }

    /// Drop every cached snapshot. The committed collection stays visible
    /// until the next fetch.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    // =========================================================================
    // Derived reads
    // =========================================================================

    /// Products matching the current filters, in collection order.
    #[must_use]
    pub fn filtered_products(&self) -> Vec<&Product> {
        filter::filter(self.collection(), &self.filters)
    }

    /// Filtered products in the current sort order.
    #[must_use]
    pub fn sorted_products(&self) -> Vec<&Product> {
        sort::sort(self.filtered_products(), self.sort_by)
    }

    /// The current page of sorted products.
    #[must_use]
    pub fn visible_page(&self) -> Vec<&Product> {
        let sorted = self.sorted_products();
        page::page(&sorted, &self.pagination).to_vec()
    }

    /// Distinct categories across the whole collection, in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        distinct(self.collection().iter().map(|p| p.category.as_str()))
    }

    /// Distinct brands across the whole collection, in first-seen order.
    #[must_use]
    pub fn brands(&self) -> Vec<&str> {
        distinct(self.collection().iter().map(|p| p.brand.as_str()))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The committed collection, if any fetch succeeded.
    #[must_use]
    pub const fn products(&self) -> Option<&Collection> {
        self.products.as_ref()
    }

    #[must_use]
    pub const fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    #[must_use]
    pub const fn sort_by(&self) -> SortKey {
        self.sort_by
    }

    #[must_use]
    pub const fn pagination(&self) -> &PageState {
        &self.pagination
    }

    /// Products matching the current filters.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.pagination.total()
    }

    #[must_use]
    pub const fn loading(&self) -> bool {
        self.loading
    }

    /// Error recorded by the last fetch.
    #[must_use]
    pub const fn error(&self) -> Option<&CatalogError> {
        self.error.as_ref()
    }

    #[must_use]
    pub const fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    #[must_use]
    pub fn cache(&self) -> &ProductCache {
        &self.cache
    }

    /// Follow status changes. The receiver starts at the latest snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewStatus> {
        self.status.subscribe()
    }

    // =========================================================================
    // Single-item reads
    // =========================================================================

    /// Look up one product at the source.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no product has `id`, or
    /// [`CatalogError::FetchFailed`] if the source fails.
    pub async fn product_by_id(&self, id: ProductId) -> Result<Product, CatalogError> {
        Ok(self.source.fetch_product_by_id(id).await?)
    }

    /// Search the source by keyword. Does not touch the view parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::FetchFailed`] if the source fails.
    pub async fn search(&self, keyword: &str) -> Result<Vec<Product>, CatalogError> {
        Ok(self.source.search_products(keyword).await?)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn collection(&self) -> &[Product] {
        self.products.as_deref().unwrap_or_default()
    }

    fn commit(&mut self, entry: &CacheEntry) {
        self.products = Some(Arc::clone(&entry.data));
        self.fetched_at = Some(entry.fetched_at);
    }

    fn recompute_total(&mut self) {
        let total = self.filtered_products().len();
        self.pagination.set_total(total);
        debug!(total, "Recomputed product total");
    }

    fn publish(&self) {
        self.status.send_replace(ViewStatus {
            loading: self.loading,
            error: self.error.clone(),
            total: self.pagination.total(),
            fetched_at: self.fetched_at,
            products: self.products.clone(),
        });
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shopfront_core::Rating;
    use tokio::sync::Notify;

    use super::*;
    use crate::error::SourceError;
    use crate::filter::PriceRange;
    use crate::source::MockProductSource;

    fn product(id: i64, price: i64, category: &str, brand: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            category: category.to_string(),
            brand: brand.to_string(),
            price: Decimal::from(price),
            sales: 0,
            rating: Rating::new(4.0).unwrap(),
            create_time: String::new(),
            image: None,
            stock: None,
        }
    }

    fn three_products() -> Vec<Product> {
        vec![
            product(1, 10, "phones", "Nova"),
            product(2, 20, "audio", "Orbit"),
            product(3, 30, "phones", "Orbit"),
        ]
    }

    fn mock(products: Vec<Product>) -> Arc<MockProductSource> {
        Arc::new(MockProductSource::new(products).with_latency(Duration::ZERO))
    }

    fn prices(products: &[&Product]) -> Vec<Decimal> {
        products.iter().map(|p| p.price).collect()
    }

    fn decimals(values: &[i64]) -> Vec<Decimal> {
        values.iter().copied().map(Decimal::from).collect()
    }

    async fn loaded_view() -> CatalogView {
        let mut view = CatalogView::new(mock(three_products()));
        view.fetch(false).await;
        view
    }

    #[tokio::test]
    async fn test_new_view_is_empty() {
        let view = CatalogView::new(mock(three_products()));
        assert!(view.products().is_none());
        assert!(view.visible_page().is_empty());
        assert!(view.categories().is_empty());
        assert_eq!(view.total(), 0);
        assert!(!view.loading());
        assert_eq!(view.pagination().page_size(), DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_fetch_commits_collection() {
        let view = loaded_view().await;
        assert_eq!(view.products().unwrap().len(), 3);
        assert_eq!(view.total(), 3);
        assert!(view.error().is_none());
        assert!(!view.loading());
        assert!(view.fetched_at().is_some());
    }

    #[tokio::test]
    async fn test_price_range_filter_scenario() {
        let mut view = loaded_view().await;
        view.update_filters(
            FilterUpdate::new().price_range(PriceRange::new(Decimal::from(15), Decimal::from(25))),
        );

        assert_eq!(prices(&view.visible_page()), decimals(&[20]));
        assert_eq!(view.total(), 1);
    }

    #[tokio::test]
    async fn test_sort_price_desc_scenario() {
        let mut view = loaded_view().await;
        view.update_sort_by(SortKey::PriceDesc);
        assert_eq!(prices(&view.visible_page()), decimals(&[30, 20, 10]));
    }

    #[tokio::test]
    async fn test_pagination_scenario() {
        let mut view = loaded_view().await;
        view.update_sort_by(SortKey::PriceAsc);
        view.update_pagination(Some(2), Some(1));

        assert_eq!(prices(&view.visible_page()), decimals(&[20]));
        assert_eq!(view.total(), 3);
        assert_eq!(view.pagination().total_pages(), 3);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_products() {
        let source = mock(three_products());
        let mut view = CatalogView::new(Arc::clone(&source) as Arc<dyn ProductSource>);
        view.fetch(false).await;
        let before = Arc::clone(view.products().unwrap());

        source.set_offline(true);
        view.fetch(true).await;

        assert!(matches!(view.error(), Some(CatalogError::FetchFailed(_))));
        assert!(Arc::ptr_eq(view.products().unwrap(), &before));
        assert!(!view.loading());
        assert_eq!(view.total(), 3);
    }

    #[tokio::test]
    async fn test_fetch_failure_without_prior_collection() {
        let source = mock(three_products());
        source.set_offline(true);
        let mut view = CatalogView::new(Arc::clone(&source) as Arc<dyn ProductSource>);
        view.fetch(false).await;

        assert!(view.error().is_some());
        assert!(view.products().is_none());
        assert!(view.visible_page().is_empty());
    }

    #[tokio::test]
    async fn test_successful_fetch_clears_error() {
        let source = mock(three_products());
        let mut view = CatalogView::new(Arc::clone(&source) as Arc<dyn ProductSource>);
        source.set_offline(true);
        view.fetch(false).await;
        assert!(view.error().is_some());

        source.set_offline(false);
        view.fetch(false).await;
        assert!(view.error().is_none());
        assert_eq!(view.total(), 3);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_source() {
        let source = mock(three_products());
        let mut view = CatalogView::new(Arc::clone(&source) as Arc<dyn ProductSource>);

        view.fetch(false).await;
        view.fetch(false).await;
        assert_eq!(source.request_count(), 1);

        view.fetch(true).await;
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn test_shared_cache_serves_second_view() {
        let source = mock(three_products());
        let cache = ProductCache::default();
        let shared = Arc::clone(&source) as Arc<dyn ProductSource>;

        let mut first =
            CatalogView::with_options(Arc::clone(&shared), cache.clone(), ViewOptions::default());
        let mut second = CatalogView::with_options(shared, cache, ViewOptions::default());
        first.fetch(false).await;
        second.fetch(false).await;

        assert_eq!(source.request_count(), 1);
        assert_eq!(second.total(), 3);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_next_fetch() {
        let source = mock(three_products());
        let mut view = CatalogView::new(Arc::clone(&source) as Arc<dyn ProductSource>);
        view.fetch(false).await;

        assert!(view.cache().has(DEFAULT_CACHE_KEY));

        view.clear_cache();
        assert!(!view.cache().has(DEFAULT_CACHE_KEY));
        assert_eq!(view.products().unwrap().len(), 3);

        view.fetch(false).await;
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn test_filter_update_resets_page_and_merges() {
        let mut view = loaded_view().await;
        view.update_pagination(Some(3), Some(1));

        view.update_filters(FilterUpdate::new().category("phones"));
        assert_eq!(view.pagination().current_page(), 1);
        assert_eq!(view.total(), 2);

        view.update_filters(FilterUpdate::new().brand("Orbit"));
        assert_eq!(view.filters().category.as_deref(), Some("phones"));
        assert_eq!(prices(&view.visible_page()), decimals(&[30]));
    }

    #[tokio::test]
    async fn test_reset_filters() {
        let mut view = loaded_view().await;
        view.update_filters(FilterUpdate::new().category("audio"));
        view.update_pagination(Some(2), None);

        view.reset_filters();
        assert!(view.filters().is_empty());
        assert_eq!(view.pagination().current_page(), 1);
        assert_eq!(view.total(), 3);
    }

    #[tokio::test]
    async fn test_sort_change_resets_page() {
        let mut view = loaded_view().await;
        view.update_pagination(Some(2), Some(1));
        view.update_sort_by(SortKey::Sales);
        assert_eq!(view.pagination().current_page(), 1);
        assert_eq!(view.pagination().page_size(), 1);
    }

    #[tokio::test]
    async fn test_update_pagination_clamps_and_keeps_other_field() {
        let mut view = loaded_view().await;
        view.update_pagination(Some(0), Some(0));
        assert_eq!(view.pagination().current_page(), 1);
        assert_eq!(view.pagination().page_size(), 1);

        view.update_pagination(None, Some(2));
        assert_eq!(view.pagination().current_page(), 1);
        view.update_pagination(Some(2), None);
        assert_eq!(view.pagination().page_size(), 2);
        assert_eq!(view.visible_page().len(), 1);
    }

    #[tokio::test]
    async fn test_page_beyond_range_is_empty() {
        let mut view = loaded_view().await;
        view.update_pagination(Some(99), Some(2));
        assert!(view.visible_page().is_empty());
        assert_eq!(view.total(), 3);
    }

    #[tokio::test]
    async fn test_visible_page_is_idempotent() {
        let mut view = loaded_view().await;
        view.update_sort_by(SortKey::PriceDesc);
        let first: Vec<ProductId> = view.visible_page().iter().map(|p| p.id).collect();
        let second: Vec<ProductId> = view.visible_page().iter().map(|p| p.id).collect();
        assert_eq!(first, second);
        assert_eq!(view.total(), 3);
    }

    #[tokio::test]
    async fn test_facets_ignore_filters() {
        let mut view = loaded_view().await;
        view.update_filters(FilterUpdate::new().category("audio"));
        assert_eq!(view.categories(), vec!["phones", "audio"]);
        assert_eq!(view.brands(), vec!["Nova", "Orbit"]);
    }

    #[tokio::test]
    async fn test_product_by_id() {
        let view = loaded_view().await;
        let found = view.product_by_id(ProductId::new(2)).await.unwrap();
        assert_eq!(found.price, Decimal::from(20));

        let missing = view.product_by_id(ProductId::new(42)).await;
        assert_eq!(missing, Err(CatalogError::NotFound(ProductId::new(42))));
    }

    #[tokio::test]
    async fn test_search_maps_source_failure() {
        let source = mock(three_products());
        let view = CatalogView::new(Arc::clone(&source) as Arc<dyn ProductSource>);
        assert_eq!(view.search("Product 3").await.unwrap().len(), 1);

        source.set_offline(true);
        assert!(matches!(
            view.search("Product").await,
            Err(CatalogError::FetchFailed(_))
        ));
    }

    /// Source whose list requests wait for a permit.
    struct GatedSource {
        products: Vec<Product>,
        gate: Notify,
        offline: AtomicBool,
    }

    impl GatedSource {
        fn new(products: Vec<Product>) -> Self {
            Self {
                products,
                gate: Notify::new(),
                offline: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ProductSource for GatedSource {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn fetch_product_list(&self) -> Result<Vec<Product>, SourceError> {
            self.gate.notified().await;
            if self.offline.load(Ordering::SeqCst) {
                return Err(SourceError::Unavailable("gated source is offline".to_string()));
            }
            Ok(self.products.clone())
        }

        async fn fetch_product_by_id(&self, id: ProductId) -> Result<Product, SourceError> {
            Err(SourceError::NotFound(id))
        }

        async fn search_products(&self, _keyword: &str) -> Result<Vec<Product>, SourceError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_observer_sees_prior_state_while_loading() {
        let source = Arc::new(GatedSource::new(three_products()));
        let mut view = CatalogView::new(Arc::clone(&source) as Arc<dyn ProductSource>);

        source.gate.notify_one();
        view.fetch(false).await;
        let before = Arc::clone(view.products().unwrap());

        let mut status = view.subscribe();
        let observer = async {
            let mid_fetch = status.wait_for(|s| s.loading).await.unwrap().clone();
            source.gate.notify_one();
            mid_fetch
        };
        let ((), mid_fetch) = tokio::join!(view.fetch(true), observer);

        assert!(mid_fetch.loading);
        assert!(mid_fetch.error.is_none());
        assert!(Arc::ptr_eq(mid_fetch.products.as_ref().unwrap(), &before));
        assert_eq!(mid_fetch.total, 3);

        let done = view.subscribe().borrow().clone();
        assert!(!done.loading);
        assert!(!Arc::ptr_eq(done.products.as_ref().unwrap(), &before));
    }

    #[tokio::test]
    async fn test_observer_sees_prior_error_while_loading() {
        let source = Arc::new(GatedSource::new(three_products()));
        let mut view = CatalogView::new(Arc::clone(&source) as Arc<dyn ProductSource>);

        source.offline.store(true, Ordering::SeqCst);
        source.gate.notify_one();
        view.fetch(false).await;
        let failure = view.error().cloned().unwrap();

        source.offline.store(false, Ordering::SeqCst);
        let mut status = view.subscribe();
        let observer = async {
            let mid_fetch = status.wait_for(|s| s.loading).await.unwrap().clone();
            source.gate.notify_one();
            mid_fetch
        };
        let ((), mid_fetch) = tokio::join!(view.fetch(true), observer);

        assert_eq!(mid_fetch.error, Some(failure));
        assert!(mid_fetch.products.is_none());
        assert!(view.error().is_none());
        assert!(!view.loading());
        assert_eq!(view.total(), 3);
    }

    #[tokio::test]
    async fn test_independent_views() {
        let source = mock(three_products()) as Arc<dyn ProductSource>;
        let mut a = CatalogView::new(Arc::clone(&source));
        let mut b = CatalogView::new(source);
        a.fetch(false).await;
        b.fetch(false).await;

        a.update_filters(FilterUpdate::new().category("audio"));
        assert_eq!(a.total(), 1);
        assert_eq!(b.total(), 3);
    }

    #[test]
    fn test_distinct_keeps_first_seen_order() {
        let values = ["b", "a", "b", "c", "a"];
        assert_eq!(distinct(values.into_iter()), vec!["b", "a", "c"]);
    }
}
