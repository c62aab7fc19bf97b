//! Cart Example
//!
//! Fills a cart from the bundled catalog, toggles a wishlist entry and prints the cart.
//!
//! Use `-p ID[:QTY]` (repeatable) to choose the products added to the cart
//! Use `--storage-dir` to persist state between runs

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use shopease::{receipt::Receipt, storefront::Storefront, utils::DemoArgs};

/// Cart Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = DemoArgs::parse();

    let catalog = args.config.load_catalog()?;
    let mut storefront = Storefront::open(&catalog, args.config.open_store()?);

    storefront.on_change(|event| {
        if let Some(message) = event.message() {
            println!("» {message}");
        }
    });

    for (id, qty) in &args.products {
        storefront.add_to_cart(id, *qty)?;
    }

    if let Some((id, _)) = args.products.first() {
        storefront.toggle_wishlist(id)?;
    }

    let details = storefront.cart_details()?;

    for item in details.unresolved() {
        println!("! {} is no longer available", item.id);
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::from_cart(&details)?.write_to(&mut handle)?;

    println!(
        "Cart: {} item(s), wishlist: {}",
        storefront.cart_count(),
        storefront.wishlist().len()
    );

    Ok(())
}
