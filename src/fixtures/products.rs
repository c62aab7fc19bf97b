//! Product Fixtures

use std::collections::BTreeMap;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    fixtures::FixtureError,
    products::{MAX_RATING, Product, Review},
};

/// Wrapper for the catalog in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Category names, in display order
    #[serde(default)]
    pub categories: Vec<String>,

    /// Brand names, in display order
    #[serde(default)]
    pub brands: Vec<String>,

    /// Colour palette as hex codes
    #[serde(default)]
    pub colors: Vec<String>,

    /// Shared sample reviews, referenced from products by key
    #[serde(default)]
    pub reviews: FxHashMap<String, Review>,

    /// Products, in catalog order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product id
    pub id: String,

    /// Product title
    pub title: String,

    /// Brand name
    pub brand: String,

    /// Category name
    pub category: String,

    /// Selling price (e.g., "899 INR")
    pub price: String,

    /// List price (e.g., "1299 INR")
    pub mrp: String,

    /// Discount (e.g., "31%")
    pub discount: String,

    /// Rating (e.g., "4.4")
    pub rating: String,

    /// Number of reviews
    #[serde(default)]
    pub reviews_count: u32,

    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,

    /// One-line summary
    #[serde(default)]
    pub short_description: String,

    /// Full description
    #[serde(default)]
    pub description: String,

    /// Colour variants
    #[serde(default)]
    pub colors: Vec<String>,

    /// Size variants
    #[serde(default)]
    pub sizes: Vec<String>,

    /// Units in stock
    #[serde(default)]
    pub inventory: u32,

    /// Popularity score
    #[serde(default)]
    pub popularity: u32,

    /// Listing timestamp (RFC 3339)
    pub created_at: Timestamp,

    /// Attribute name to value
    #[serde(default)]
    pub specs: BTreeMap<String, String>,

    /// Keys into [`ProductsFixture::reviews`]
    #[serde(default)]
    pub reviews: Vec<String>,
}

impl ProductFixture {
    /// Build a [`Product`], resolving review references against the shared reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if a price, percentage or rating cannot be parsed, if the price and
    /// list price use different currencies, or if a review key is not defined.
    pub fn into_product(
        self,
        reviews: &FxHashMap<String, Review>,
    ) -> Result<Product<'static>, FixtureError> {
        let (price_minor, currency) = parse_price(&self.price)?;
        let (mrp_minor, mrp_currency) = parse_price(&self.mrp)?;

        if mrp_currency != currency {
            return Err(FixtureError::CurrencyMismatch(
                currency.iso_alpha_code.to_string(),
                mrp_currency.iso_alpha_code.to_string(),
            ));
        }

        let reviews = self
            .reviews
            .iter()
            .map(|key| {
                reviews
                    .get(key)
                    .cloned()
                    .ok_or_else(|| FixtureError::ReviewNotFound(key.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Product {
            id: self.id,
            title: self.title,
            brand: self.brand,
            category: self.category,
            price: Money::from_minor(price_minor, currency),
            mrp: Money::from_minor(mrp_minor, currency),
            discount: parse_percentage(&self.discount)?,
            rating: parse_rating(&self.rating)?,
            reviews_count: self.reviews_count,
            images: SmallVec::from_vec(self.images),
            short_description: self.short_description,
            description: self.description,
            colors: SmallVec::from_vec(self.colors),
            sizes: SmallVec::from_vec(self.sizes),
            inventory: self.inventory,
            popularity: self.popularity,
            created_at: self.created_at,
            specs: self.specs,
            reviews,
        })
    }
}

/// Parse price string (e.g., "899 INR" or "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = iso::find(currency_code)
        .ok_or_else(|| FixtureError::UnknownCurrency(currency_code.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::from(10_i64.pow(currency.exponent)))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse percentage string (e.g., "31%" or "0.31") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "31%" for 31%
/// - Decimal format: "0.31" for 31%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / Decimal::ONE_HUNDRED))
    } else {
        let value = trimmed
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}

/// Parse a rating string into a decimal in `[0, 5]`.
///
/// # Errors
///
/// Returns an error if the value is not a decimal or lies outside the range.
pub fn parse_rating(s: &str) -> Result<Decimal, FixtureError> {
    let rating = s
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidRating(s.to_string()))?;

    if rating.is_sign_negative() || rating > Decimal::from(MAX_RATING) {
        return Err(FixtureError::InvalidRating(s.to_string()));
    }

    Ok(rating)
}
