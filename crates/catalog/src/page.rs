//! Page stage: slice the ordered products into the requested page window.

use serde::Serialize;

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Pagination parameters plus the derived result count.
///
/// `current_page` and `page_size` are never below 1; setters clamp rather
/// than reject. `total` is the number of products after filtering and
/// sorting, before slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    current_page: usize,
    page_size: usize,
    total: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl PageState {
    /// Create a page state with `total` zero. Inputs below 1 are clamped to 1.
    #[must_use]
    pub fn new(current_page: usize, page_size: usize) -> Self {
        Self {
            current_page: current_page.max(1),
            page_size: page_size.max(1),
            total: 0,
        }
    }

    /// 1-based index of the page being shown.
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Products per page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Products matching the current filters.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Move to `page`, clamped to at least 1.
    pub fn set_current_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Change the page size, clamped to at least 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    /// Replace the derived count.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    /// Number of non-empty pages (zero when there are no results).
    #[must_use]
    pub const fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    /// Whether a page exists after the current one.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Whether a page exists before the current one.
    #[must_use]
    pub const fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    /// Half-open index range `[start, end)` of the current window, unclamped.
    #[must_use]
    pub const fn window(&self) -> (usize, usize) {
        let start = (self.current_page - 1).saturating_mul(self.page_size);
        (start, start.saturating_add(self.page_size))
    }
}

/// Slice `items` to the window described by `state`.
///
/// A window past the end yields an empty slice.
#[must_use]
pub fn page<'a, T>(items: &'a [T], state: &PageState) -> &'a [T] {
    let (start, end) = state.window();
    let end = end.min(items.len());
    items.get(start..end).unwrap_or_default()
}
