//! Checkout Example
//!
//! Fills a cart, signs in the first sample user and places an order through the
//! simulated payment gateway, then prints the order receipt.
//!
//! Use `--payment cod|card|upi` to choose the payment method
//! Use `--payment-delay-ms` to change the simulated gateway delay

use std::{io, time::Instant};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing_subscriber::EnvFilter;

use shopease::{
    checkout::{
        CheckoutFlow,
        form::{CardDetails, CheckoutForm},
        order::PaymentMethod,
    },
    receipt::Receipt,
    storefront::Storefront,
    utils::DemoArgs,
};

/// Checkout Example
#[tokio::main(flavor = "current_thread")]
#[expect(clippy::print_stdout, reason = "Example code")]
pub async fn main() -> Result<()> {
    _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = DemoArgs::parse();

    let catalog = args.config.load_catalog()?;
    let mut storefront = Storefront::open(&catalog, args.config.open_store()?);

    if storefront.user().is_none() {
        storefront.set_user(catalog.users().first().cloned())?;
    }

    for (id, qty) in &args.products {
        storefront.add_to_cart(id, *qty)?;
    }

    let mut form = CheckoutForm::prefilled(storefront.user());

    form.payment = args.payment;
    form.delivery = args.delivery;

    if args.payment == PaymentMethod::Card {
        form.card = Some(CardDetails {
            number: "4111 1111 1111 1111".to_string(),
            expiry: "12/30".to_string(),
            cvv: "123".to_string(),
        });
    }

    let mut flow = CheckoutFlow::new().with_shipping(args.config.shipping_policy());
    let gateway = args.config.gateway();

    println!("Placing order...");

    let start = Instant::now();

    let order = flow.place_order(&mut storefront, &form, &gateway).await?;

    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::from_order(&order)?.write_to(&mut handle)?;

    println!("Processed in {}", elapsed.human(Truncate::Nano));
    println!("Orders on record: {}", storefront.orders().len());

    Ok(())
}
