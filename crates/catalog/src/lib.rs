//! Shopfront Catalog - Product collection view engine.
//!
//! A derived view over a cached product collection:
//!
//! ```text
//! ProductSource ──fetch──▶ ProductCache ──▶ filter ──▶ sort ──▶ page ──▶ visible page
//!                                                 ▲         ▲        ▲
//!                                               CatalogView parameters
//! ```
//!
//! # Modules
//!
//! - [`cache`] - One snapshot per fetch key, backed by `moka`
//! - [`filter`] - Category, brand, price range and keyword predicates
//! - [`sort`] - Stable comparators selected by [`SortKey`]
//! - [`page`] - Page window slicing and page bookkeeping
//! - [`view`] - [`CatalogView`], the controller that owns the parameters
//! - [`source`] - The data source trait plus mock and HTTP implementations
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopfront_catalog::{CatalogView, FilterUpdate, MockProductSource, SortKey};
//!
//! let mut view = CatalogView::new(Arc::new(MockProductSource::sample()?));
//! view.fetch(false).await;
//! view.update_filters(FilterUpdate::new().category("phones"));
//! view.update_sort_by(SortKey::PriceDesc);
//! for product in view.visible_page() {
//!     println!("{} {}", product.name, product.price);
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
mod error;
pub mod filter;
pub mod page;
pub mod sort;
pub mod source;
pub mod view;

pub use cache::{CacheEntry, CacheSettings, Collection, ProductCache};
pub use error::{CatalogError, SourceError};
pub use filter::{FilterSpec, FilterUpdate, PriceRange};
pub use page::PageState;
pub use sort::{ParseSortKeyError, SortKey};
pub use source::{HttpProductSource, HttpSourceConfig, MockProductSource, ProductSource};
pub use view::{CatalogView, DEFAULT_CACHE_KEY, ViewOptions, ViewStatus};
