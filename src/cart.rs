//! Cart
//!
//! An ordered list of product lines, unique by product id, each with a quantity in
//! `[MIN_QUANTITY, MAX_QUANTITY]`. Persisted carts are normalized when deserialized, so a
//! line outside that range never survives a load.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod details;

/// Smallest quantity a line can hold; anything lower removes the line.
pub const MIN_QUANTITY: u32 = 1;

/// Largest quantity a line can hold.
pub const MAX_QUANTITY: u32 = 99;

/// A product id and quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product id
    pub id: String,

    /// Quantity, within `[MIN_QUANTITY, MAX_QUANTITY]`
    pub qty: u32,
}

/// Outcome of setting a line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineUpdate {
    /// No line with that id; nothing changed
    Missing,

    /// Quantity was zero or negative; the line was removed
    Removed,

    /// The line now holds this quantity
    Updated(u32),
}

/// A cart line as it may appear in storage, before normalization.
#[derive(Debug, Deserialize)]
struct StoredCartLine {
    id: String,

    #[serde(default = "StoredCartLine::default_qty")]
    qty: i64,
}

impl StoredCartLine {
    fn default_qty() -> i64 {
        i64::from(MIN_QUANTITY)
    }
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

fn clamp_quantity(qty: i64) -> u32 {
    let clamped = qty.clamp(i64::from(MIN_QUANTITY), i64::from(MAX_QUANTITY));

    u32::try_from(clamped).unwrap_or(MAX_QUANTITY)
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `qty` units of a product, creating the line if needed.
    ///
    /// The resulting quantity is clamped to `[MIN_QUANTITY, MAX_QUANTITY]`; adding zero
    /// units still creates a line with the minimum quantity. Returns the new quantity.
    pub fn add(&mut self, id: &str, qty: u32) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|line| line.id == id) {
            line.qty = clamp_quantity(i64::from(line.qty.saturating_add(qty)));

            return line.qty;
        }

        let qty = clamp_quantity(i64::from(qty));

        self.lines.push(CartLine {
            id: id.to_string(),
            qty,
        });

        qty
    }

    /// Remove a product's line. Returns whether a line was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.lines.len();

        self.lines.retain(|line| line.id != id);

        self.lines.len() != before
    }

    /// Set a line's quantity. Zero or negative removes the line; unknown ids are ignored.
    pub fn set_quantity(&mut self, id: &str, qty: i64) -> LineUpdate {
        let Some(position) = self.lines.iter().position(|line| line.id == id) else {
            return LineUpdate::Missing;
        };

        if qty < i64::from(MIN_QUANTITY) {
            self.lines.remove(position);

            return LineUpdate::Removed;
        }

        let qty = clamp_quantity(qty);

        if let Some(line) = self.lines.get_mut(position) {
            line.qty = qty;
        }

        LineUpdate::Updated(qty)
    }

    /// The line for a product id.
    pub fn get(&self, id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Iterate over lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.qty))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Cart {
    fn from_stored(stored: Vec<StoredCartLine>) -> Self {
        let mut cart = Cart::new();

        for line in stored {
            if line.qty < i64::from(MIN_QUANTITY) {
                continue;
            }

            match cart.lines.iter_mut().find(|existing| existing.id == line.id) {
                Some(existing) => {
                    existing.qty = clamp_quantity(i64::from(existing.qty).saturating_add(line.qty));
                }
                None => cart.lines.push(CartLine {
                    id: line.id,
                    qty: clamp_quantity(line.qty),
                }),
            }
        }

        cart
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.lines.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<StoredCartLine>::deserialize(deserializer).map(Cart::from_stored)
    }
}

impl<'c> IntoIterator for &'c Cart {
    type Item = &'c CartLine;
    type IntoIter = std::slice::Iter<'c, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn add_creates_then_increments() {
        let mut cart = Cart::new();

        assert_eq!(cart.add("P001", 1), 1);
        assert_eq!(cart.add("P001", 2), 3);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn add_clamps_to_maximum() {
        let mut cart = Cart::new();

        cart.add("P001", 98);

        assert_eq!(cart.add("P001", 5), MAX_QUANTITY);
        assert_eq!(cart.add("P002", u32::MAX), MAX_QUANTITY);
    }

    #[test]
    fn add_zero_still_creates_minimum_line() {
        let mut cart = Cart::new();

        assert_eq!(cart.add("P001", 0), MIN_QUANTITY);
    }

    #[test]
    fn remove_twice_is_idempotent() {
        let mut cart = Cart::new();

        cart.add("P001", 1);
        cart.add("P002", 1);

        assert!(cart.remove("P001"));

        let after_first = cart.clone();

        assert!(!cart.remove("P001"));
        assert_eq!(cart, after_first);
    }

    #[test]
    fn set_quantity_zero_removes() {
        let mut cart = Cart::new();

        cart.add("P001", 2);

        assert_eq!(cart.set_quantity("P001", 0), LineUpdate::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_negative_removes() {
        let mut cart = Cart::new();

        cart.add("P001", 2);

        assert_eq!(cart.set_quantity("P001", -3), LineUpdate::Removed);
        assert!(cart.get("P001").is_none());
    }

    #[test]
    fn set_quantity_clamps_and_ignores_unknown_ids() {
        let mut cart = Cart::new();

        cart.add("P001", 1);

        assert_eq!(cart.set_quantity("P001", 250), LineUpdate::Updated(MAX_QUANTITY));
        assert_eq!(cart.set_quantity("P404", 3), LineUpdate::Missing);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn lines_keep_insertion_order() {
        let mut cart = Cart::new();

        cart.add("P003", 1);
        cart.add("P001", 1);
        cart.add("P003", 1);

        let ids: Vec<_> = cart.iter().map(|line| line.id.as_str()).collect();

        assert_eq!(ids, ["P003", "P001"]);
    }

    #[test]
    fn serializes_as_plain_list() -> TestResult {
        let mut cart = Cart::new();

        cart.add("P001", 2);

        assert_eq!(serde_json::to_string(&cart)?, r#"[{"id":"P001","qty":2}]"#);

        Ok(())
    }

    #[test]
    fn deserializing_normalizes_lines() -> TestResult {
        let cart: Cart = serde_json::from_str(
            r#"[
                {"id":"P001","qty":2},
                {"id":"P002","qty":0},
                {"id":"P003","qty":-4},
                {"id":"P004","qty":500},
                {"id":"P001","qty":3},
                {"id":"P005"}
            ]"#,
        )?;

        assert_eq!(
            cart.lines(),
            [
                CartLine {
                    id: "P001".to_string(),
                    qty: 5
                },
                CartLine {
                    id: "P004".to_string(),
                    qty: MAX_QUANTITY
                },
                CartLine {
                    id: "P005".to_string(),
                    qty: 1
                },
            ]
        );

        Ok(())
    }
}
