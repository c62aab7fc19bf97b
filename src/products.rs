//! Products

use std::collections::BTreeMap;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use serde::Deserialize;
use slotmap::new_key_type;
use smallvec::SmallVec;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Highest rating a product or review can carry.
pub const MAX_RATING: u8 = 5;

/// A customer review embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Review {
    /// Reviewer display name
    pub user: String,

    /// Star rating, 1 to 5
    pub rating: u8,

    /// Free-form review text
    pub comment: String,

    /// When the review was written
    pub date: Timestamp,
}

/// Product
///
/// Products are immutable catalog entries. Quantities live on cart lines, never here.
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Unique product id, e.g. `P001`
    pub id: String,

    /// Product title
    pub title: String,

    /// Brand name
    pub brand: String,

    /// Category name
    pub category: String,

    /// Selling price
    pub price: Money<'a, Currency>,

    /// List price before discount
    pub mrp: Money<'a, Currency>,

    /// Advertised discount
    pub discount: Percentage,

    /// Average rating in `[0, 5]`
    pub rating: Decimal,

    /// Number of reviews the rating is based on
    pub reviews_count: u32,

    /// Image URLs, primary image first
    pub images: SmallVec<[String; 4]>,

    /// One-line summary
    pub short_description: String,

    /// Full description
    pub description: String,

    /// Colour variants as hex codes
    pub colors: SmallVec<[String; 4]>,

    /// Size variants
    pub sizes: SmallVec<[String; 6]>,

    /// Units in stock
    pub inventory: u32,

    /// Popularity score used for trending listings
    pub popularity: u32,

    /// When the product was listed
    pub created_at: Timestamp,

    /// Attribute name to value
    pub specs: BTreeMap<String, String>,

    /// Embedded reviews
    pub reviews: Vec<Review>,
}

impl<'a> Product<'a> {
    /// Number of filled stars when rendering the rating (rounded down).
    pub fn full_stars(&self) -> u8 {
        self.rating
            .floor()
            .to_u8()
            .map_or(0, |stars| stars.min(MAX_RATING))
    }

    /// Whether the list price is above the selling price.
    pub fn is_discounted(&self) -> bool {
        self.mrp.to_minor_units() > self.price.to_minor_units()
    }

    /// Amount saved against the list price.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the price and list price use different currencies.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.mrp.sub(self.price)
    }

    /// Whether any units are in stock.
    pub fn in_stock(&self) -> bool {
        self.inventory > 0
    }

    /// The primary image, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;

    use decimal_percentage::Percentage;
    use jiff::Timestamp;
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::INR};
    use smallvec::SmallVec;

    use super::Product;

    /// Minimal product priced in whole rupees.
    pub(crate) fn product(id: &str, rupees: i64) -> Product<'static> {
        Product {
            id: id.to_string(),
            title: format!("Product {id}"),
            brand: "UrbanLoom".to_string(),
            category: "Men".to_string(),
            price: Money::from_minor(rupees * 100, INR),
            mrp: Money::from_minor(rupees * 100, INR),
            discount: Percentage::from(0.0),
            rating: Decimal::new(40, 1),
            reviews_count: 0,
            images: SmallVec::new(),
            short_description: String::new(),
            description: String::new(),
            colors: SmallVec::new(),
            sizes: SmallVec::new(),
            inventory: 10,
            popularity: 0,
            created_at: Timestamp::UNIX_EPOCH,
            specs: BTreeMap::new(),
            reviews: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::INR};
    use testresult::TestResult;

    use super::{test_support::product, *};

    #[test]
    fn full_stars_rounds_down() {
        let mut shirt = product("P001", 899);
        shirt.rating = Decimal::new(44, 1);

        assert_eq!(shirt.full_stars(), 4);
    }

    #[test]
    fn full_stars_is_capped() {
        let mut shirt = product("P001", 899);
        shirt.rating = Decimal::new(9, 0);

        assert_eq!(shirt.full_stars(), MAX_RATING);
    }

    #[test]
    fn savings_is_mrp_minus_price() -> TestResult {
        let mut shirt = product("P001", 899);
        shirt.mrp = Money::from_minor(129_900, INR);

        assert!(shirt.is_discounted());
        assert_eq!(shirt.savings()?, Money::from_minor(40_000, INR));

        Ok(())
    }

    #[test]
    fn primary_image_is_first_image() {
        let mut shirt = product("P001", 899);

        assert_eq!(shirt.primary_image(), None);

        shirt.images.push("https://example.com/a.jpg".to_string());
        shirt.images.push("https://example.com/b.jpg".to_string());

        assert_eq!(shirt.primary_image(), Some("https://example.com/a.jpg"));
    }
}
