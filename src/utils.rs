//! Utils

use clap::Parser;

use crate::{
    checkout::order::{DeliveryMethod, PaymentMethod},
    config::ShopConfig,
};

/// Arguments for the storefront demos
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Storefront settings
    #[command(flatten)]
    pub config: ShopConfig,

    /// Product to add to the cart, as `ID` or `ID:QTY`; may be repeated
    #[arg(short, long = "product", value_parser = parse_cart_line, default_values = ["P001:2", "P003"])]
    pub products: Vec<(String, u32)>,

    /// Payment method used at checkout
    #[arg(long, value_enum, default_value_t = PaymentMethod::Cod)]
    pub payment: PaymentMethod,

    /// Delivery method used at checkout
    #[arg(long, value_enum, default_value_t = DeliveryMethod::StandardDelivery)]
    pub delivery: DeliveryMethod,
}

/// Parse `ID` or `ID:QTY` into a product id and quantity.
///
/// # Errors
///
/// Returns a message if the id is empty or the quantity is not a positive integer.
pub fn parse_cart_line(s: &str) -> Result<(String, u32), String> {
    let (id, qty) = match s.split_once(':') {
        Some((id, qty)) => (
            id.trim(),
            qty.trim()
                .parse::<u32>()
                .map_err(|err| format!("invalid quantity in `{s}`: {err}"))?,
        ),
        None => (s.trim(), 1),
    };

    if id.is_empty() {
        return Err(format!("missing product id in `{s}`"));
    }

    if qty == 0 {
        return Err(format!("quantity must be at least 1 in `{s}`"));
    }

    Ok((id.to_string(), qty))
}
