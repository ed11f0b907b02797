//! Core types for the Shopfront catalog.
//!
//! This module provides type-safe wrappers for product data.

pub mod id;
pub mod product;
pub mod rating;

pub use id::{ParseProductIdError, ProductId};
pub use product::{Product, ProductError};
pub use rating::{Rating, RatingError};
