//! Filter stage: reduce a collection to the products matching active predicates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::Product;

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lowest accepted price.
    pub min: Decimal,
    /// Highest accepted price.
    pub max: Decimal,
}

impl PriceRange {
    /// Create a range from explicit bounds.
    #[must_use]
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Build a range from a list of bounds.
    ///
    /// Only exactly two bounds make a range; any other count means "no price
    /// filter" and yields `None`.
    #[must_use]
    pub fn from_bounds(bounds: &[Decimal]) -> Option<Self> {
        match bounds {
            [min, max] => Some(Self::new(*min, *max)),
            _ => None,
        }
    }

    /// Whether `price` lies within the bounds (both ends inclusive).
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.min <= price && price <= self.max
    }
}

/// The active set of inclusion predicates.
///
/// Absent fields and empty strings are pass-through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Exact, case-sensitive category.
    pub category: Option<String>,
    /// Exact, case-sensitive brand.
    pub brand: Option<String>,
    /// Inclusive price bounds.
    pub price_range: Option<PriceRange>,
    /// Case-insensitive substring of name or description.
    pub keyword: Option<String>,
}

impl FilterSpec {
    /// Whether no predicate is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        active(self.category.as_ref()).is_none()
            && active(self.brand.as_ref()).is_none()
            && self.price_range.is_none()
            && active(self.keyword.as_ref()).is_none()
    }

    /// Evaluate every active predicate against one product.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let keyword = active(self.keyword.as_ref()).map(str::to_lowercase);
        self.matches_with(product, keyword.as_deref())
    }

    /// Apply a partial update. Fields the update leaves untouched keep their value.
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
        if let Some(price_range) = update.price_range {
            self.price_range = price_range;
        }
        if let Some(keyword) = update.keyword {
            self.keyword = keyword;
        }
    }

    fn matches_with(&self, product: &Product, lowered_keyword: Option<&str>) -> bool {
        if let Some(category) = active(self.category.as_ref())
            && product.category != category
        {
            return false;
        }

        if let Some(brand) = active(self.brand.as_ref())
            && product.brand != brand
        {
            return false;
        }

        if let Some(range) = self.price_range
            && !range.contains(product.price)
        {
            return false;
        }

        if let Some(keyword) = lowered_keyword {
            return product.name.to_lowercase().contains(keyword)
                || product.description.to_lowercase().contains(keyword);
        }

        true
    }
}

/// A partial [`FilterSpec`].
///
/// Each field is either left alone, set to a value, or cleared.
///
/// ```
/// use shopfront_catalog::{FilterSpec, FilterUpdate};
///
/// let mut spec = FilterSpec::default();
/// spec.merge(FilterUpdate::new().category("phones").brand("Acme"));
/// spec.merge(FilterUpdate::new().clear_brand());
/// assert_eq!(spec.category.as_deref(), Some("phones"));
/// assert_eq!(spec.brand, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::option_option)]
pub struct FilterUpdate {
    category: Option<Option<String>>,
    brand: Option<Option<String>>,
    price_range: Option<Option<PriceRange>>,
    keyword: Option<Option<String>>,
}

impl FilterUpdate {
    /// An update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the category predicate.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(Some(category.into()));
        self
    }

    /// Remove the category predicate.
    #[must_use]
    pub fn clear_category(mut self) -> Self {
        self.category = Some(None);
        self
    }

    /// Set the brand predicate.
    #[must_use]
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(Some(brand.into()));
        self
    }

    /// Remove the brand predicate.
    #[must_use]
    pub fn clear_brand(mut self) -> Self {
        self.brand = Some(None);
        self
    }

    /// Set the price predicate.
    #[must_use]
    pub fn price_range(mut self, range: PriceRange) -> Self {
        self.price_range = Some(Some(range));
        self
    }

    /// Remove the price predicate.
    #[must_use]
    pub fn clear_price_range(mut self) -> Self {
        self.price_range = Some(None);
        self
    }

    /// Set the keyword predicate.
    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(Some(keyword.into()));
        self
    }

    /// Remove the keyword predicate.
    #[must_use]
    pub fn clear_keyword(mut self) -> Self {
        self.keyword = Some(None);
        self
    }

    /// Whether applying this update would change nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.category.is_none()
            && self.brand.is_none()
            && self.price_range.is_none()
            && self.keyword.is_none()
    }
}

/// Keep the products matching every active predicate of `spec`, in input order.
///
/// Takes any iterator of product references, so the output of one pass can
/// be fed straight into another.
pub fn filter<'a, I>(products: I, spec: &FilterSpec) -> Vec<&'a Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    let keyword = active(spec.keyword.as_ref()).map(str::to_lowercase);
    products
        .into_iter()
        .filter(|product| spec.matches_with(product, keyword.as_deref()))
        .collect()
}

fn active(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopfront_core::{ProductId, Rating};

    fn product(id: i64, category: &str, brand: &str, price: i64, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: format!("{name} by {brand}"),
            category: category.to_string(),
            brand: brand.to_string(),
            price: Decimal::new(price, 0),
            sales: 0,
            rating: Rating::new(4.0).unwrap(),
            create_time: String::new(),
            image: None,
            stock: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "phones", "Acme", 10, "Acme Phone"),
            product(2, "phones", "Zen", 20, "Zen Phone"),
            product(3, "audio", "Acme", 30, "Acme Buds"),
            product(4, "audio", "Zen", 40, "Studio Monitor"),
        ]
    }

    fn ids(products: &[&Product]) -> Vec<i64> {
        products.iter().map(|p| p.id.as_i64()).collect()
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let products = catalog();
        let spec = FilterSpec::default();
        assert!(spec.is_empty());
        assert_eq!(ids(&filter(&products, &spec)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_strings_are_pass_through() {
        let products = catalog();
        let spec = FilterSpec {
            category: Some(String::new()),
            brand: Some(String::new()),
            price_range: None,
            keyword: Some(String::new()),
        };
        assert!(spec.is_empty());
        assert_eq!(filter(&products, &spec).len(), 4);
    }

    #[test]
    fn test_category_and_brand_are_case_sensitive() {
        let products = catalog();
        let spec = FilterSpec {
            category: Some("Phones".to_string()),
            ..FilterSpec::default()
        };
        assert!(filter(&products, &spec).is_empty());

        let spec = FilterSpec {
            brand: Some("Acme".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter(&products, &spec)), vec![1, 3]);
    }

    #[test]
    fn test_price_range_inclusive() {
        let products = catalog();
        let spec = FilterSpec {
            price_range: Some(PriceRange::new(Decimal::new(20, 0), Decimal::new(30, 0))),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter(&products, &spec)), vec![2, 3]);
    }

    #[test]
    fn test_inverted_price_range_matches_nothing() {
        let products = catalog();
        let spec = FilterSpec {
            price_range: Some(PriceRange::new(Decimal::new(30, 0), Decimal::new(20, 0))),
            ..FilterSpec::default()
        };
        assert!(filter(&products, &spec).is_empty());
    }

    #[test]
    fn test_price_range_requires_two_bounds() {
        let ten = Decimal::new(10, 0);
        assert_eq!(PriceRange::from_bounds(&[]), None);
        assert_eq!(PriceRange::from_bounds(&[ten]), None);
        assert_eq!(PriceRange::from_bounds(&[ten, ten, ten]), None);
        assert_eq!(
            PriceRange::from_bounds(&[ten, Decimal::new(20, 0)]),
            Some(PriceRange::new(ten, Decimal::new(20, 0)))
        );
    }

    #[test]
    fn test_keyword_matches_name_or_description_ignoring_case() {
        let products = catalog();
        let spec = FilterSpec {
            keyword: Some("PHONE".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter(&products, &spec)), vec![1, 2]);

        // "by zen" only appears in descriptions
        let spec = FilterSpec {
            keyword: Some("by zen".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter(&products, &spec)), vec![2, 4]);
    }

    #[test]
    fn test_filters_compose_as_logical_and() {
        let products = catalog();
        let by_category = FilterSpec {
            category: Some("audio".to_string()),
            ..FilterSpec::default()
        };
        let by_brand = FilterSpec {
            brand: Some("Zen".to_string()),
            ..FilterSpec::default()
        };
        let combined = FilterSpec {
            category: Some("audio".to_string()),
            brand: Some("Zen".to_string()),
            ..FilterSpec::default()
        };

        let chained = filter(filter(&products, &by_category), &by_brand);
        let reversed = filter(filter(&products, &by_brand), &by_category);
        let direct = filter(&products, &combined);

        assert_eq!(ids(&chained), vec![4]);
        assert_eq!(chained, direct);
        assert_eq!(reversed, direct);
    }

    #[test]
    fn test_matches_single_product() {
        let spec = FilterSpec {
            category: Some("phones".to_string()),
            keyword: Some("zen".to_string()),
            ..FilterSpec::default()
        };
        assert!(spec.matches(&product(2, "phones", "Zen", 20, "Zen Phone")));
        assert!(!spec.matches(&product(1, "phones", "Acme", 10, "Acme Phone")));
    }

    #[test]
    fn test_merge_keeps_unspecified_fields() {
        let mut spec = FilterSpec::default();
        spec.merge(
            FilterUpdate::new()
                .category("phones")
                .keyword("zen")
                .price_range(PriceRange::new(Decimal::ONE, Decimal::TEN)),
        );
        spec.merge(FilterUpdate::new().brand("Zen"));

        assert_eq!(spec.category.as_deref(), Some("phones"));
        assert_eq!(spec.brand.as_deref(), Some("Zen"));
        assert_eq!(spec.keyword.as_deref(), Some("zen"));
        assert!(spec.price_range.is_some());

        spec.merge(FilterUpdate::new().clear_keyword().clear_price_range());
        assert_eq!(spec.keyword, None);
        assert_eq!(spec.price_range, None);
        assert_eq!(spec.category.as_deref(), Some("phones"));
    }

    #[test]
    fn test_noop_update() {
        assert!(FilterUpdate::new().is_noop());
        assert!(!FilterUpdate::new().clear_category().is_noop());
    }
}
