//! Receipt
//!
//! Plain-text rendering of an order or a cart for terminal output.

use std::io;

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::details::CartDetails,
    checkout::order::{Order, UNKNOWN_PRODUCT_TITLE},
    pricing::{TotalPriceError, line_total, total_price},
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating a line or cart total.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The order's currency code is not a known ISO currency.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// IO error
    #[error("IO error")]
    IO,
}

/// A receipt row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine<'a> {
    /// Product title
    pub title: String,

    /// Quantity
    pub qty: u32,

    /// Unit price
    pub unit_price: Money<'a, Currency>,

    /// `unit_price × qty`
    pub total: Money<'a, Currency>,
}

/// Receipt for a placed order or a cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    reference: Option<String>,
    status: Option<String>,
    lines: SmallVec<[ReceiptLine<'a>; 8]>,
    subtotal: Money<'a, Currency>,
    shipping: Option<Money<'a, Currency>>,
    total: Money<'a, Currency>,
    savings: Option<Money<'a, Currency>>,
}

impl<'a> Receipt<'a> {
    /// Receipt for a placed order, using the amounts recorded on it.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::UnknownCurrency`] if the order's currency code is not known,
    /// or [`ReceiptError::TotalPrice`] if a line total overflows.
    pub fn from_order(order: &Order) -> Result<Receipt<'static>, ReceiptError> {
        let currency = order
            .currency()
            .ok_or_else(|| ReceiptError::UnknownCurrency(order.currency.clone()))?;

        let lines: SmallVec<[ReceiptLine<'static>; 8]> = order
            .items
            .iter()
            .map(|item| {
                let unit_price = Money::from_minor(item.price, currency);

                Ok(ReceiptLine {
                    title: item.title.clone(),
                    qty: item.qty,
                    unit_price,
                    total: line_total(unit_price, item.qty)?,
                })
            })
            .collect::<Result<_, ReceiptError>>()?;

        Ok(Receipt {
            reference: Some(order.id.clone()),
            status: Some(order.status.to_string()),
            lines,
            subtotal: Money::from_minor(order.subtotal, currency),
            shipping: Some(Money::from_minor(order.shipping, currency)),
            total: Money::from_minor(order.total, currency),
            savings: None,
        })
    }

    /// Receipt for the current cart, before shipping. Savings are measured against list
    /// prices.
    ///
    /// # Errors
    ///
    /// Returns an error if the savings cannot be totalled.
    pub fn from_cart(details: &CartDetails<'a>) -> Result<Self, ReceiptError> {
        let currency = details.total.currency();

        let lines: SmallVec<[ReceiptLine<'a>; 8]> = details
            .items
            .iter()
            .map(|item| ReceiptLine {
                title: item
                    .product
                    .map_or_else(|| UNKNOWN_PRODUCT_TITLE.to_string(), |product| product.title.clone()),
                qty: item.qty,
                unit_price: item
                    .product
                    .map_or_else(|| Money::from_minor(0, currency), |product| product.price),
                total: item.subtotal,
            })
            .collect();

        let savings = details
            .items
            .iter()
            .filter_map(|item| item.product.map(|product| (product, item.qty)))
            .map(|(product, qty)| Ok(line_total(product.savings()?, qty)?))
            .collect::<Result<Vec<_>, ReceiptError>>()?;

        Ok(Receipt {
            reference: None,
            status: None,
            lines,
            subtotal: details.total,
            shipping: None,
            total: details.total,
            savings: Some(total_price(savings, currency)?),
        })
    }

    /// Receipt rows in order.
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Shipping charged, if the receipt is for an order.
    pub fn shipping(&self) -> Option<Money<'a, Currency>> {
        self.shipping
    }

    /// Amount payable.
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Savings against list prices, if known.
    pub fn savings(&self) -> Option<Money<'a, Currency>> {
        self.savings
    }

    /// Writes the receipt as a table followed by a totals summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if let Some(reference) = &self.reference {
            let status = self.status.as_deref().unwrap_or_default();

            writeln!(out, "\n \x1b[1m{reference}\x1b[0m  {status}").map_err(|_err| ReceiptError::IO)?;
        }

        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Unit Price", "Total"]);

        for (idx, line) in self.lines.iter().enumerate() {
            builder.push_record([
                format!("#{}", idx + 1),
                line.title.clone(),
                line.qty.to_string(),
                line.unit_price.to_string(),
                line.total.to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(1, HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')));

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut rows: SmallVec<[(&str, String); 4]> = SmallVec::new();

        rows.push((" Subtotal:", format!("{}  ", self.subtotal)));

        if let Some(shipping) = self.shipping {
            let value = if shipping.is_zero() {
                "Free  ".to_string()
            } else {
                format!("{shipping}  ")
            };

            rows.push((" Shipping:", value));
        }

        rows.push((" \x1b[1mTotal:\x1b[0m", format!("\x1b[1m{}  \x1b[0m", self.total)));

        if let Some(savings) = self.savings.filter(|savings| savings.is_positive()) {
            rows.push((" You save:", format!("{savings}  ")));
        }

        let label_width = rows.iter().map(|(label, _)| visible_width(label)).max().unwrap_or_default();
        let value_width = rows.iter().map(|(_, value)| visible_width(value)).max().unwrap_or_default();

        for (label, value) in &rows {
            write_summary_line(out, label, value, label_width, value_width)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {:>value_pad$}{value}",
        "", ""
    )
    .map_err(|_err| ReceiptError::IO)
}
