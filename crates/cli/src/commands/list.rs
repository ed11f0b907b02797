//! Product listing command.
//!
//! # Usage
//!
//! ```bash
//! # First page of everything
//! sf-cli list
//!
//! # Phones between 1000 and 5000, cheapest first, 5 per page
//! sf-cli list --category phones --price-range 1000,5000 --sort price-asc --page-size 5
//!
//! # Second page as JSON
//! sf-cli list --keyword pro --page 2 --json
//! ```

use clap::Args;
use rust_decimal::Decimal;
use shopfront_catalog::{CatalogView, FilterUpdate, PriceRange, SortKey};
use shopfront_core::Product;

use super::CliError;
use crate::config::CatalogConfig;

/// Filter, sort and pagination flags for `list`.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Only products in this category (exact match)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Only products of this brand (exact match)
    #[arg(short, long)]
    pub brand: Option<String>,

    /// Inclusive price bounds, e.g. `100,500`
    #[arg(long, value_name = "MIN,MAX", value_parser = parse_price_range)]
    pub price_range: Option<PriceRange>,

    /// Case-insensitive search in name and description
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Sort order (default, price-asc, price-desc, sales, rating, newest)
    #[arg(short, long, default_value_t = SortKey::Default)]
    pub sort: SortKey,

    /// Page to show, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Products per page (defaults to `CATALOG_PAGE_SIZE`)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    fn filter_update(&self) -> FilterUpdate {
        let mut update = FilterUpdate::new();
        if let Some(category) = &self.category {
            update = update.category(category.clone());
        }
        if let Some(brand) = &self.brand {
            update = update.brand(brand.clone());
        }
        if let Some(range) = self.price_range {
            update = update.price_range(range);
        }
        if let Some(keyword) = &self.keyword {
            update = update.keyword(keyword.clone());
        }
        update
    }
}

/// List one page of products.
///
/// # Errors
///
/// Returns an error if the product list cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn run(config: &CatalogConfig, args: &ListArgs) -> Result<(), CliError> {
    let mut view = super::build_view(config).await?;
    super::load(&mut view).await?;
    apply(&mut view, args);

    tracing::debug!(
        total = view.total(),
        page = view.pagination().current_page(),
        "Listing products"
    );

    if args.json {
        let output = serde_json::json!({
            "products": view.visible_page(),
            "pagination": view.pagination(),
            "totalPages": view.pagination().total_pages(),
            "filters": view.filters(),
            "sortBy": view.sort_by(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_page(&view));
    }
    Ok(())
}

/// Push the command-line parameters into `view`.
///
/// Pagination goes last because filter and sort updates reset the page.
pub fn apply(view: &mut CatalogView, args: &ListArgs) {
    let update = args.filter_update();
    if !update.is_noop() {
        view.update_filters(update);
    }
    view.update_sort_by(args.sort);
    view.update_pagination(Some(args.page), args.page_size);
}

/// Parse `MIN,MAX` into a price range.
///
/// # Errors
///
/// Returns a message if either bound is not a decimal or `MIN > MAX`.
pub fn parse_price_range(raw: &str) -> Result<PriceRange, String> {
    let (min, max) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected MIN,MAX, got `{raw}`"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<Decimal>()
            .map_err(|e| format!("invalid price `{}`: {e}", s.trim()))
    };
    let (min, max) = (parse(min)?, parse(max)?);
    if min > max {
        return Err(format!("minimum {min} is above maximum {max}"));
    }
    Ok(PriceRange::new(min, max))
}

/// Render the visible page as a table with a pagination footer.
#[must_use]
pub fn render_page(view: &CatalogView) -> String {
    let mut out = String::new();
    let page = view.visible_page();

    if page.is_empty() {
        out.push_str("No products match.\n");
    } else {
        out.push_str(&format!(
            "{:>5}  {:<32} {:<12} {:<8} {:>10} {:>7} {:>6}\n",
            "ID", "NAME", "CATEGORY", "BRAND", "PRICE", "SALES", "RATING"
        ));
        for product in &page {
            out.push_str(&render_row(product));
        }
    }

    let pagination = view.pagination();
    out.push_str(&format!(
        "Page {} of {} ({} products)\n",
        pagination.current_page(),
        pagination.total_pages().max(1),
        pagination.total()
    ));
    out
}

fn render_row(product: &Product) -> String {
    format!(
        "{:>5}  {:<32} {:<12} {:<8} {:>10} {:>7} {:>6}\n",
        product.id.to_string(),
        truncate(&product.name, 32),
        truncate(&product.category, 12),
        truncate(&product.brand, 8),
        product.price.to_string(),
        product.sales,
        product.rating.to_string()
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
