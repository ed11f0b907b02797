//! Product record as served by the product API.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::rating::Rating;

/// Naive timestamp layouts accepted for `createTime`, tried in order after RFC 3339.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Date-only layout accepted for `createTime` (interpreted as midnight UTC).
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors raised when a product record breaks a data invariant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The price is below zero.
    #[error("product {id} has negative price {price}")]
    NegativePrice {
        /// Offending product.
        id: ProductId,
        /// Offending price.
        price: Decimal,
    },
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product key.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Plain text description.
    pub description: String,
    /// Category name (exact-match facet).
    pub category: String,
    /// Brand name (exact-match facet).
    pub brand: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Units sold.
    pub sales: u64,
    /// Average review score.
    pub rating: Rating,
    /// Listing timestamp as supplied by the API.
    #[serde(default)]
    pub create_time: String,
    /// Primary image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Units in stock, if inventory is tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl Product {
    /// Parse `create_time` into a UTC timestamp.
    ///
    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and
    /// `YYYY-MM-DD`. Returns `None` for anything else, including an empty
    /// string.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.create_time)
    }

    /// Check data invariants the type system does not enforce.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NegativePrice`] if the price is below zero.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.price < Decimal::ZERO {
            return Err(ProductError::NegativePrice {
                id: self.id,
                price: self.price,
            });
        }
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}
