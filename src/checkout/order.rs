//! Orders
//!
//! Order records are snapshots: item titles and prices are copied out of the catalog when
//! the order is built, so later catalog changes never alter a placed order. Amounts are
//! stored as integer minor units next to the ISO currency code.

use std::fmt;

use clap::ValueEnum;
use jiff::Timestamp;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::{Deserialize, Serialize};

use crate::{
    cart::Cart,
    catalog::Catalog,
    checkout::form::CheckoutForm,
    pricing::{ShippingPolicy, TotalPriceError, line_total, total_price},
};

/// Title recorded for a line whose product no longer resolves.
pub const UNKNOWN_PRODUCT_TITLE: &str = "Product";

/// How the customer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery
    #[default]
    Cod,

    /// Card, settled through the payment gateway
    Card,

    /// UPI transfer
    Upi,
}

impl PaymentMethod {
    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cod => "Cash on Delivery",
            PaymentMethod::Card => "Card",
            PaymentMethod::Upi => "UPI",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the order is shipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryMethod {
    /// Standard delivery
    #[default]
    StandardDelivery,

    /// Express delivery
    ExpressDelivery,
}

impl DeliveryMethod {
    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            DeliveryMethod::StandardDelivery => "Standard Delivery",
            DeliveryMethod::ExpressDelivery => "Express Delivery",
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Accepted; nothing left to settle
    Confirmed,

    /// Awaiting payment confirmation
    #[serde(rename = "Payment Pending")]
    PaymentPending,
}

impl OrderStatus {
    /// Status an order starts in for the given payment method.
    pub fn initial(payment: PaymentMethod) -> Self {
        match payment {
            PaymentMethod::Cod => OrderStatus::Confirmed,
            PaymentMethod::Card | PaymentMethod::Upi => OrderStatus::PaymentPending,
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::PaymentPending => "Payment Pending",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Delivery address captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAddress {
    /// Street address
    pub line: String,

    /// City
    pub city: String,

    /// Postal code
    pub postal: String,
}

/// Contact details captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Full name
    pub name: String,

    /// Phone number
    pub phone: String,

    /// Delivery address
    pub address: CustomerAddress,
}

/// A purchased line, copied from the catalog at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product id
    pub id: String,

    /// Product title at time of purchase
    pub title: String,

    /// Quantity
    pub qty: u32,

    /// Unit price in minor units
    pub price: i64,
}

impl OrderItem {
    /// `price × qty` in minor units.
    pub fn line_total(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.qty))
    }
}

/// Order Snapshot
///
/// The priced contents of a cart, before it becomes an [`Order`].
#[derive(Debug, Clone)]
pub struct OrderSnapshot<'a> {
    /// Purchased lines in cart order
    pub items: Vec<OrderItem>,

    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// Shipping charge
    pub shipping: Money<'a, Currency>,

    /// Subtotal plus shipping
    pub total: Money<'a, Currency>,
}

impl<'a> OrderSnapshot<'a> {
    /// Price the cart against the catalog.
    ///
    /// Lines whose product no longer resolves are kept, titled [`UNKNOWN_PRODUCT_TITLE`] and
    /// priced at zero.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalPriceError`] if the catalog has no currency or a total cannot be
    /// computed.
    pub fn build(
        cart: &Cart,
        catalog: &Catalog<'a>,
        policy: &ShippingPolicy,
    ) -> Result<Self, TotalPriceError> {
        let currency = catalog.currency().ok_or(TotalPriceError::NoCurrency)?;

        let items: Vec<OrderItem> = cart
            .iter()
            .map(|line| match catalog.get(&line.id) {
                Some(product) => OrderItem {
                    id: product.id.clone(),
                    title: product.title.clone(),
                    qty: line.qty,
                    price: product.price.to_minor_units(),
                },
                None => OrderItem {
                    id: line.id.clone(),
                    title: UNKNOWN_PRODUCT_TITLE.to_string(),
                    qty: line.qty,
                    price: 0,
                },
            })
            .collect();

        let line_totals = items
            .iter()
            .map(|item| line_total(Money::from_minor(item.price, currency), item.qty))
            .collect::<Result<Vec<_>, _>>()?;

        let subtotal = total_price(line_totals, currency)?;
        let shipping = policy.shipping_for(&subtotal);
        let total = subtotal.add(shipping)?;

        Ok(OrderSnapshot {
            items,
            subtotal,
            shipping,
            total,
        })
    }

    /// Whether there is nothing to order.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order id, e.g. `OD-M5X2K1AB-7QZ3`
    pub id: String,

    /// When the order was placed
    pub created_at: Timestamp,

    /// Contact and delivery details
    pub customer: Customer,

    /// Shipping option
    pub delivery_method: DeliveryMethod,

    /// Payment option
    pub payment_method: PaymentMethod,

    /// Purchased lines
    pub items: Vec<OrderItem>,

    /// Sum of line totals, minor units
    pub subtotal: i64,

    /// Shipping charge, minor units
    pub shipping: i64,

    /// Amount payable, minor units
    pub total: i64,

    /// ISO 4217 code the amounts are in
    pub currency: String,

    /// Status
    pub status: OrderStatus,
}

impl Order {
    /// Build an order from a validated form and a priced snapshot.
    pub fn new(
        id: String,
        created_at: Timestamp,
        form: &CheckoutForm,
        snapshot: OrderSnapshot<'_>,
    ) -> Self {
        Order {
            id,
            created_at,
            customer: form.customer(),
            delivery_method: form.delivery,
            payment_method: form.payment,
            currency: snapshot.total.currency().iso_alpha_code.to_string(),
            subtotal: snapshot.subtotal.to_minor_units(),
            shipping: snapshot.shipping.to_minor_units(),
            total: snapshot.total.to_minor_units(),
            items: snapshot.items,
            status: OrderStatus::initial(form.payment),
        }
    }

    /// Apply an approved gateway settlement. Only card payments are settled by the gateway.
    #[must_use]
    pub fn settled(mut self) -> Self {
        if self.payment_method == PaymentMethod::Card {
            self.status = OrderStatus::Confirmed;
        }

        self
    }

    /// The order currency, if the stored code is known.
    pub fn currency(&self) -> Option<&'static Currency> {
        iso::find(&self.currency)
    }

    /// An amount from this order as [`Money`].
    pub fn money(&self, minor_units: i64) -> Option<Money<'static, Currency>> {
        self.currency()
            .map(|currency| Money::from_minor(minor_units, currency))
    }

    /// Total number of units ordered.
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |count, item| count.saturating_add(item.qty))
    }
}
