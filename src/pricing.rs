//! Pricing

use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors that can occur while calculating line or cart totals.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// No products were loaded, so currency could not be determined.
    #[error("no products loaded; cannot determine currency")]
    NoCurrency,

    /// Price multiplied by quantity does not fit in minor units.
    #[error("line total overflows for quantity {0}")]
    Overflow(u32),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates the total for a single line, `price × qty`.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the result does not fit in minor units.
pub fn line_total<'a>(
    price: Money<'a, Currency>,
    qty: u32,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    let minor_units = price
        .to_minor_units()
        .checked_mul(i64::from(qty))
        .ok_or(TotalPriceError::Overflow(qty))?;

    Ok(Money::from_minor(minor_units, price.currency()))
}

/// Sums a list of amounts, starting from zero in the given currency.
///
/// # Errors
///
/// - [`TotalPriceError::Money`]: an amount is in a different currency.
pub fn total_price<'a>(
    amounts: impl IntoIterator<Item = Money<'a, Currency>>,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    let total = amounts
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, amount| acc.add(amount))?;

    Ok(total)
}

/// Flat-fee shipping that becomes free above a subtotal threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Subtotals strictly above this amount (major units) ship free
    pub free_above: Decimal,

    /// Fee charged otherwise (major units)
    pub flat_fee: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_above: Decimal::from(500),
            flat_fee: Decimal::from(40),
        }
    }
}

impl ShippingPolicy {
    /// Creates a policy from whole major-unit amounts.
    pub fn new(free_above: u32, flat_fee: u32) -> Self {
        Self {
            free_above: Decimal::from(free_above),
            flat_fee: Decimal::from(flat_fee),
        }
    }

    /// Shipping charged for the given subtotal.
    pub fn shipping_for<'a>(&self, subtotal: &Money<'a, Currency>) -> Money<'a, Currency> {
        if *subtotal.amount() > self.free_above {
            Money::from_minor(0, subtotal.currency())
        } else {
            Money::from_decimal(self.flat_fee, subtotal.currency())
        }
    }
}
