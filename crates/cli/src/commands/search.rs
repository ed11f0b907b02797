//! Keyword search at the data source.
//!
//! Unlike `list --keyword`, this asks the source to search, so matching rules
//! are the source's own.

use super::CliError;
use crate::config::CatalogConfig;

/// Print every product the source returns for `keyword`.
///
/// # Errors
///
/// Returns an error if the source search fails.
#[allow(clippy::print_stdout)]
pub async fn run(config: &CatalogConfig, keyword: &str, json: bool) -> Result<(), CliError> {
    let view = super::build_view(config).await?;
    let products = view.search(keyword).await?;
    tracing::debug!(keyword, count = products.len(), "Search finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
        return Ok(());
    }

    if products.is_empty() {
        println!("No products found for \"{keyword}\".");
    }
    for product in &products {
        println!("{:>5}  {}  {}", product.id.to_string(), product.name, product.price);
    }
    Ok(())
}
