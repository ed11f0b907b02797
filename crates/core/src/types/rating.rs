//! Bounded product rating.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum RatingError {
    /// The value is not a number.
    #[error("rating must be a number")]
    NotANumber,
    /// The value lies outside the rating scale.
    #[error("rating {value} is outside {min}..={max}")]
    OutOfRange {
        /// Offending value.
        value: f64,
        /// Lowest allowed rating.
        min: f64,
        /// Highest allowed rating.
        max: f64,
    },
}

/// Average review score on a 0-5 scale.
///
/// ## Constraints
///
/// - Never NaN
/// - `Rating::MIN <= value <= Rating::MAX`
///
/// Deserialization goes through the same validation, so a fixture file with
/// a 7-star product fails to load instead of skewing the rating sort.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    /// Lowest rating on the scale.
    pub const MIN: f64 = 0.0;
    /// Highest rating on the scale.
    pub const MAX: f64 = 5.0;

    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is NaN or outside `MIN..=MAX`.
    pub fn new(value: f64) -> Result<Self, RatingError> {
        if value.is_nan() {
            return Err(RatingError::NotANumber);
        }
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(RatingError::OutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    /// Returns the rating value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Total ordering over ratings (valid ratings are never NaN).
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<f64> for Rating {
    type Error = RatingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
