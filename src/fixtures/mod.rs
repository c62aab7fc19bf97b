//! Fixtures
//!
//! YAML seed data standing in for a backend catalog. Fixture sets live under
//! `<base>/products/<set>.yml` and `<base>/users/<set>.yml`; the `default` set is also
//! compiled into the crate so it can be loaded without touching the filesystem.

use thiserror::Error;

pub mod products;
pub mod users;

/// Default directory fixture sets are read from.
pub const FIXTURES_DIR: &str = "./fixtures";

/// Name of the fixture set bundled into the crate.
pub const DEFAULT_SET: &str = "default";

/// Bundled `products/default.yml`.
pub const DEFAULT_PRODUCTS_YAML: &str = include_str!("../../fixtures/products/default.yml");

/// Bundled `users/default.yml`.
pub const DEFAULT_USERS_YAML: &str = include_str!("../../fixtures/users/default.yml");

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Invalid rating value
    #[error("Invalid rating: {0}")]
    InvalidRating(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Two products share an id
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(String),

    /// A product references a review that is not defined
    #[error("Review not found: {0}")]
    ReviewNotFound(String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,
}
