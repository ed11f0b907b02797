//! Shopfront Core - Shared product types.
//!
//! This crate provides the domain types used across all Shopfront components:
//! - `catalog` - Product collection view engine and data sources
//! - `cli` - Command-line front end over the catalog
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no caching,
//! no HTTP clients. Everything here is plain data that the engine reads but
//! never mutates.
//!
//! # Modules
//!
//! - [`types`] - Product records, type-safe IDs and bounded ratings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
