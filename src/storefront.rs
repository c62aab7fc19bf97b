//! Storefront
//!
//! The in-memory mirror of the persisted cart, wishlist, comparison list and user. Every
//! mutation is applied to a copy, written back to the store, and only then committed to the
//! mirror and announced to listeners, which is the signal for a presentation layer to
//! re-render. A failed write leaves the mirror untouched.

use std::fmt;

use tracing::{debug, info};

use crate::{
    cart::{Cart, LineUpdate, details::CartDetails},
    catalog::Catalog,
    checkout::order::Order,
    pricing::TotalPriceError,
    storage::{StateStore, Storage, StoreError, StoreKey},
    users::User,
    wishlist::ProductSet,
};

/// A state change, delivered to listeners after it has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorefrontEvent {
    /// Units were added to the cart
    CartItemAdded {
        /// Product id
        id: String,

        /// Line quantity after the add
        qty: u32,
    },

    /// A line was removed from the cart
    CartItemRemoved {
        /// Product id
        id: String,
    },

    /// A line's quantity was set
    CartQuantityChanged {
        /// Product id
        id: String,

        /// The new quantity
        qty: u32,
    },

    /// Wishlist membership changed
    WishlistUpdated {
        /// Product id
        id: String,

        /// Whether the product is now wishlisted
        added: bool,
    },

    /// Comparison list membership changed
    CompareUpdated {
        /// Product id
        id: String,

        /// Whether the product is now being compared
        added: bool,
    },

    /// The signed-in user changed
    UserChanged,

    /// An order was placed and the cart emptied
    OrderPlaced {
        /// Order id
        order_id: String,
    },

    /// State was re-read from the store
    Reloaded,
}

impl StorefrontEvent {
    /// Toast text for the event, if it warrants one.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            StorefrontEvent::CartItemAdded { .. } => Some("Added to cart"),
            StorefrontEvent::WishlistUpdated { .. } => Some("Wishlist updated"),
            StorefrontEvent::CompareUpdated { added: true, .. } => Some("Added to compare"),
            StorefrontEvent::CompareUpdated { added: false, .. } => Some("Removed from compare"),
            StorefrontEvent::OrderPlaced { .. } => Some("Order placed"),
            StorefrontEvent::CartItemRemoved { .. }
            | StorefrontEvent::CartQuantityChanged { .. }
            | StorefrontEvent::UserChanged
            | StorefrontEvent::Reloaded => None,
        }
    }

    /// Whether the cart badge needs refreshing.
    pub fn affects_cart(&self) -> bool {
        matches!(
            self,
            StorefrontEvent::CartItemAdded { .. }
                | StorefrontEvent::CartItemRemoved { .. }
                | StorefrontEvent::CartQuantityChanged { .. }
                | StorefrontEvent::OrderPlaced { .. }
                | StorefrontEvent::Reloaded
        )
    }
}

type Listener<'c> = Box<dyn FnMut(&StorefrontEvent) + 'c>;

/// Storefront
pub struct Storefront<'c, S> {
    catalog: &'c Catalog<'c>,
    store: StateStore<S>,
    cart: Cart,
    wishlist: ProductSet,
    compare: ProductSet,
    user: Option<User>,
    listeners: Vec<Listener<'c>>,
}

impl<S: fmt::Debug> fmt::Debug for Storefront<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storefront")
            .field("products", &self.catalog.len())
            .field("store", &self.store)
            .field("cart", &self.cart)
            .field("wishlist", &self.wishlist)
            .field("compare", &self.compare)
            .field("user", &self.user)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<'c, S: Storage> Storefront<'c, S> {
    /// Open a storefront over a catalog and a state store, loading persisted state.
    pub fn open(catalog: &'c Catalog<'c>, store: StateStore<S>) -> Self {
        let mut storefront = Storefront {
            catalog,
            store,
            cart: Cart::new(),
            wishlist: ProductSet::new(),
            compare: ProductSet::new(),
            user: None,
            listeners: Vec::new(),
        };

        storefront.load();

        storefront
    }

    fn load(&mut self) {
        self.cart = self.store.load_or_default(StoreKey::Cart);
        self.wishlist = self.store.load_or_default(StoreKey::Wishlist);
        self.compare = self.store.load_or_default(StoreKey::Compare);
        self.user = self.store.load(StoreKey::User, None);

        debug!(
            cart_lines = self.cart.len(),
            wishlist = self.wishlist.len(),
            compare = self.compare.len(),
            signed_in = self.user.is_some(),
            "loaded storefront state"
        );
    }

    /// Re-read every mirrored key from the store. The store wins over in-memory state.
    pub fn reload(&mut self) {
        self.load();
        self.emit(&StorefrontEvent::Reloaded);
    }

    /// Register a listener called after every persisted change.
    pub fn on_change(&mut self, listener: impl FnMut(&StorefrontEvent) + 'c) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: &StorefrontEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    fn commit_cart(&mut self, cart: Cart) -> Result<(), StoreError> {
        self.store.save(StoreKey::Cart, &cart)?;
        self.cart = cart;

        Ok(())
    }

    /// Add `qty` units of a product to the cart. Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the cart cannot be persisted.
    #[tracing::instrument(name = "storefront.add_to_cart", skip(self), err)]
    pub fn add_to_cart(&mut self, product_id: &str, qty: u32) -> Result<u32, StoreError> {
        if !self.catalog.contains(product_id) {
            debug!("adding product missing from catalog");
        }

        let mut cart = self.cart.clone();
        let qty = cart.add(product_id, qty);

        self.commit_cart(cart)?;
        self.emit(&StorefrontEvent::CartItemAdded {
            id: product_id.to_string(),
            qty,
        });

        Ok(qty)
    }

    /// Remove a product's line from the cart. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the cart cannot be persisted.
    #[tracing::instrument(name = "storefront.remove_from_cart", skip(self), err)]
    pub fn remove_from_cart(&mut self, product_id: &str) -> Result<bool, StoreError> {
        let mut cart = self.cart.clone();
        let removed = cart.remove(product_id);

        self.commit_cart(cart)?;
        self.emit(&StorefrontEvent::CartItemRemoved {
            id: product_id.to_string(),
        });

        Ok(removed)
    }

    /// Set a line's quantity; zero or less removes it, unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the cart cannot be persisted.
    #[tracing::instrument(name = "storefront.update_quantity", skip(self), err)]
    pub fn update_quantity(&mut self, product_id: &str, qty: i64) -> Result<LineUpdate, StoreError> {
        let mut cart = self.cart.clone();
        let update = cart.set_quantity(product_id, qty);

        let event = match update {
            LineUpdate::Missing => return Ok(update),
            LineUpdate::Removed => StorefrontEvent::CartItemRemoved {
                id: product_id.to_string(),
            },
            LineUpdate::Updated(qty) => StorefrontEvent::CartQuantityChanged {
                id: product_id.to_string(),
                qty,
            },
        };

        self.commit_cart(cart)?;
        self.emit(&event);

        Ok(update)
    }

    /// Flip wishlist membership. Returns whether the product is now wishlisted.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the wishlist cannot be persisted.
    #[tracing::instrument(name = "storefront.toggle_wishlist", skip(self), err)]
    pub fn toggle_wishlist(&mut self, product_id: &str) -> Result<bool, StoreError> {
        let mut wishlist = self.wishlist.clone();
        let added = wishlist.toggle(product_id);

        self.store.save(StoreKey::Wishlist, &wishlist)?;
        self.wishlist = wishlist;
        self.emit(&StorefrontEvent::WishlistUpdated {
            id: product_id.to_string(),
            added,
        });

        Ok(added)
    }

    /// Flip comparison list membership. Returns whether the product is now being compared.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the list cannot be persisted.
    #[tracing::instrument(name = "storefront.toggle_compare", skip(self), err)]
    pub fn toggle_compare(&mut self, product_id: &str) -> Result<bool, StoreError> {
        let mut compare = self.compare.clone();
        let added = compare.toggle(product_id);

        self.store.save(StoreKey::Compare, &compare)?;
        self.compare = compare;
        self.emit(&StorefrontEvent::CompareUpdated {
            id: product_id.to_string(),
            added,
        });

        Ok(added)
    }

    /// Sign a (mock) user in, or out with `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the user cannot be persisted.
    pub fn set_user(&mut self, user: Option<User>) -> Result<(), StoreError> {
        self.store.save(StoreKey::User, &user)?;
        self.user = user;
        self.emit(&StorefrontEvent::UserChanged);

        Ok(())
    }

    /// The cart joined with the catalog, with its total.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalPriceError`] if the catalog has no currency or a total overflows.
    pub fn cart_details(&self) -> Result<CartDetails<'_>, TotalPriceError> {
        CartDetails::build(&self.cart, self.catalog)
    }

    /// Units in the cart, for the header badge.
    pub fn cart_count(&self) -> u32 {
        self.cart.item_count()
    }

    /// Whether a product is wishlisted.
    pub fn is_wishlisted(&self, product_id: &str) -> bool {
        self.wishlist.contains(product_id)
    }

    /// Placed orders, most recent first.
    pub fn orders(&self) -> Vec<Order> {
        self.store.load_or_default(StoreKey::Orders)
    }

    /// The most recently placed order.
    pub fn last_order(&self) -> Option<Order> {
        self.store.load(StoreKey::LastOrder, None)
    }

    /// Persist a placed order and empty the cart.
    ///
    /// The order is written before the cart is removed, so a failed write never leaves an
    /// emptied cart without its order.
    pub(crate) fn record_order(&mut self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders();

        orders.retain(|placed| placed.id != order.id);
        orders.insert(0, order.clone());

        self.store.save(StoreKey::Orders, &orders)?;
        self.store.save(StoreKey::LastOrder, order)?;
        self.store.remove(StoreKey::Cart)?;
        self.cart.clear();

        info!(order_id = %order.id, orders = orders.len(), "recorded order");

        self.emit(&StorefrontEvent::OrderPlaced {
            order_id: order.id.clone(),
        });

        Ok(())
    }

    /// The catalog.
    pub fn catalog(&self) -> &'c Catalog<'c> {
        self.catalog
    }

    /// The cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The wishlist.
    pub fn wishlist(&self) -> &ProductSet {
        &self.wishlist
    }

    /// The comparison list.
    pub fn compare(&self) -> &ProductSet {
        &self.compare
    }

    /// The signed-in user.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The underlying state store.
    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    /// Close the storefront, returning the state store.
    pub fn into_store(self) -> StateStore<S> {
        self.store
    }
}
