//! Category and brand facets.

use shopfront_catalog::CatalogView;

use super::CliError;
use crate::config::CatalogConfig;

/// Print the distinct categories and brands of the catalog.
///
/// # Errors
///
/// Returns an error if the product list cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn run(config: &CatalogConfig, json: bool) -> Result<(), CliError> {
    let mut view = super::build_view(config).await?;
    super::load(&mut view).await?;

    if json {
        let output = serde_json::json!({
            "categories": view.categories(),
            "brands": view.brands(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_facets(&view));
    }
    Ok(())
}

/// Render facets as two labelled lists.
#[must_use]
pub fn render_facets(view: &CatalogView) -> String {
    format!(
        "Categories: {}\nBrands: {}\n",
        view.categories().join(", "),
        view.brands().join(", ")
    )
}
