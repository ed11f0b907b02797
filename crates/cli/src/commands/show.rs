//! Single product lookup.

use shopfront_core::{Product, ProductId};

use super::CliError;
use crate::config::CatalogConfig;

/// Print one product.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`](shopfront_catalog::CatalogError::NotFound)
/// if no product has `id`.
#[allow(clippy::print_stdout)]
pub async fn run(config: &CatalogConfig, id: ProductId, json: bool) -> Result<(), CliError> {
    let view = super::build_view(config).await?;
    let product = view.product_by_id(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
    } else {
        print!("{}", render_product(&product));
    }
    Ok(())
}

/// Render a product as labelled lines.
#[must_use]
pub fn render_product(product: &Product) -> String {
    let mut lines = vec![
        format!("{} (#{})", product.name, product.id),
        format!("  Category:  {}", product.category),
        format!("  Brand:     {}", product.brand),
        format!("  Price:     {}", product.price),
        format!("  Rating:    {}", product.rating),
        format!("  Sales:     {}", product.sales),
    ];
    if let Some(stock) = product.stock {
        lines.push(format!("  Stock:     {stock}"));
    }
    if let Some(listed) = product.created_at() {
        lines.push(format!("  Listed:    {}", listed.format("%Y-%m-%d")));
    }
    if !product.description.is_empty() {
        lines.push(String::new());
        lines.push(format!("  {}", product.description));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
