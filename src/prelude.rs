//! ShopEase prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        Cart, CartLine, LineUpdate, MAX_QUANTITY, MIN_QUANTITY,
        details::{CartDetails, CartLineDetails},
    },
    catalog::Catalog,
    checkout::{
        CheckoutError, CheckoutFlow, CheckoutState, PendingOrder,
        form::{CardDetails, CheckoutForm, FormField, ValidationErrors},
        order::{
            Customer, CustomerAddress, DeliveryMethod, Order, OrderItem, OrderSnapshot,
            OrderStatus, PaymentMethod,
        },
        payment::{PaymentGateway, PaymentOutcome, SimulatedGateway},
    },
    config::ShopConfig,
    fixtures::FixtureError,
    pricing::{ShippingPolicy, TotalPriceError},
    products::{Product, ProductKey, Review},
    receipt::{Receipt, ReceiptError, ReceiptLine},
    storage::{
        StateStore, Storage, StoreError, StoreKey, file::FileStorage, memory::MemoryStorage,
    },
    storefront::{Storefront, StorefrontEvent},
    users::{Address, User},
    wishlist::ProductSet,
};
