//! Cart Details
//!
//! The joined view of a cart against the catalog, used to render cart pages.

use rusty_money::{Money, iso::Currency};

use crate::{
    cart::Cart,
    catalog::Catalog,
    pricing::{TotalPriceError, line_total, total_price},
    products::Product,
};

/// A cart line joined with its product.
#[derive(Debug, Clone)]
pub struct CartLineDetails<'c> {
    /// Product id as stored on the line
    pub id: &'c str,

    /// The product, or `None` if the id no longer resolves
    pub product: Option<&'c Product<'c>>,

    /// Quantity
    pub qty: u32,

    /// `price × qty`, zero for unresolvable lines
    pub subtotal: Money<'c, Currency>,
}

/// Cart Details
#[derive(Debug, Clone)]
pub struct CartDetails<'c> {
    /// Lines in cart order
    pub items: Vec<CartLineDetails<'c>>,

    /// Sum of line subtotals
    pub total: Money<'c, Currency>,
}

impl<'c> CartDetails<'c> {
    /// Join every cart line with the catalog and total them.
    ///
    /// # Errors
    ///
    /// - [`TotalPriceError::NoCurrency`]: the catalog has no currency.
    /// - [`TotalPriceError::Overflow`]: a line total does not fit in minor units.
    /// - [`TotalPriceError::Money`]: a product is priced in another currency.
    pub fn build(cart: &'c Cart, catalog: &'c Catalog<'c>) -> Result<Self, TotalPriceError> {
        let currency = catalog.currency().ok_or(TotalPriceError::NoCurrency)?;

        let items = cart
            .iter()
            .map(|line| {
                let product = catalog.get(&line.id);

                let subtotal = match product {
                    Some(product) => line_total(product.price, line.qty)?,
                    None => Money::from_minor(0, currency),
                };

                Ok(CartLineDetails {
                    id: &line.id,
                    product,
                    qty: line.qty,
                    subtotal,
                })
            })
            .collect::<Result<Vec<_>, TotalPriceError>>()?;

        let total = total_price(items.iter().map(|item| item.subtotal), currency)?;

        Ok(CartDetails { items, total })
    }

    /// Whether there are no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines whose product could not be found.
    pub fn unresolved(&self) -> impl Iterator<Item = &CartLineDetails<'c>> {
        self.items.iter().filter(|item| item.product.is_none())
    }
}
