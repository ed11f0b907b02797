//! Sort stage: order the filtered subset by the selected comparator.

use core::cmp::Reverse;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use shopfront_core::Product;

/// Error returned for an unknown sort key name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key {0:?} (expected one of: default, price-asc, price-desc, sales, rating, newest)")]
pub struct ParseSortKeyError(String);

/// Ordering applied to the filtered products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Keep collection order.
    #[default]
    Default,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Best selling first.
    Sales,
    /// Highest rated first.
    Rating,
    /// Most recently listed first.
    Newest,
}

impl SortKey {
    /// Every sort key, in menu order.
    pub const ALL: [Self; 6] = [
        Self::Default,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::Sales,
        Self::Rating,
        Self::Newest,
    ];

    /// The kebab-case name used in URLs and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Sales => "sales",
            Self::Rating => "rating",
            Self::Newest => "newest",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ParseSortKeyError(s.to_owned()))
    }
}

/// Order `products` by `key`.
///
/// All sorts are stable: products that compare equal keep their input order.
/// For [`SortKey::Newest`], products whose `createTime` does not parse sort
/// after every dated product.
#[must_use]
pub fn sort(mut products: Vec<&Product>, key: SortKey) -> Vec<&Product> {
    match key {
        SortKey::Default => {}
        SortKey::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::Sales => products.sort_by(|a, b| b.sales.cmp(&a.sales)),
        SortKey::Rating => products.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        // None < Some, so reversing puts undated products last
        SortKey::Newest => products.sort_by_cached_key(|p| Reverse(p.created_at())),
    }
    products
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shopfront_core::{ProductId, Rating};

    fn product(id: i64, price: i64, sales: u64, rating: f64, created: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            category: "general".to_string(),
            brand: "Acme".to_string(),
            price: Decimal::new(price, 0),
            sales,
            rating: Rating::new(rating).unwrap(),
            create_time: created.to_string(),
            image: None,
            stock: None,
        }
    }

    fn ids(products: &[&Product]) -> Vec<i64> {
        products.iter().map(|p| p.id.as_i64()).collect()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, 20, 5, 4.0, "2024-02-01"),
            product(2, 10, 50, 3.5, "2024-05-01"),
            product(3, 30, 5, 4.9, "not a date"),
            product(4, 20, 80, 4.0, "2024-03-15 08:00:00"),
        ]
    }

    #[test]
    fn test_default_keeps_order() {
        let products = catalog();
        assert_eq!(ids(&sort(products.iter().collect(), SortKey::Default)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_price_orders_stable() {
        let products = catalog();
        assert_eq!(ids(&sort(products.iter().collect(), SortKey::PriceAsc)), vec![2, 1, 4, 3]);
        assert_eq!(ids(&sort(products.iter().collect(), SortKey::PriceDesc)), vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_sales_descending_stable() {
        let products = catalog();
        assert_eq!(ids(&sort(products.iter().collect(), SortKey::Sales)), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_rating_descending_stable() {
        let products = catalog();
        assert_eq!(ids(&sort(products.iter().collect(), SortKey::Rating)), vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_newest_puts_unparseable_last() {
        let products = catalog();
        assert_eq!(ids(&sort(products.iter().collect(), SortKey::Newest)), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_newest_ties_keep_input_order() {
        let products = vec![
            product(1, 1, 0, 1.0, ""),
            product(2, 1, 0, 1.0, "2024-01-01"),
            product(3, 1, 0, 1.0, "garbage"),
            product(4, 1, 0, 1.0, "2024-01-01T00:00:00Z"),
        ];
        assert_eq!(ids(&sort(products.iter().collect(), SortKey::Newest)), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_parse_round_trips_names() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
            assert_eq!(key.to_string(), key.as_str());
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "cheapest".parse::<SortKey>().unwrap_err();
        assert!(err.to_string().contains("\"cheapest\""));
        assert!("Price-Asc".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_serde_kebab_case() {
        assert_eq!(serde_json::to_string(&SortKey::PriceDesc).unwrap(), "\"price-desc\"");
        let key: SortKey = serde_json::from_str("\"newest\"").unwrap();
        assert_eq!(key, SortKey::Newest);
    }
}
