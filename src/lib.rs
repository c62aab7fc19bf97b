//! ShopEase
//!
//! ShopEase is the state engine behind a small storefront: a read-only product catalog, a
//! persistent key-value state store, a cart/wishlist manager mirrored over that store and a
//! checkout flow that turns the cart into an order record.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod storage;
pub mod storefront;
pub mod users;
pub mod utils;
pub mod wishlist;
