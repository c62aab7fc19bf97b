//! Storage
//!
//! The persistent state store: a namespaced, JSON-serializing wrapper over a raw string
//! key-value backend. Reads never fail; missing or malformed values fall back to a default.

use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, warn};

pub mod file;
pub mod memory;

/// Prefix applied to every key unless configured otherwise.
pub const DEFAULT_KEY_PREFIX: &str = "shop_";

/// Errors raised while writing to or reading from a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend I/O failure
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized
    #[error("failed to serialize value: {0}")]
    Json(#[from] serde_json::Error),

    /// Key cannot be represented by the backend
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A raw string key-value backend.
pub trait Storage: fmt::Debug {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Durably store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// The keys the storefront persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Cart lines, `[{id, qty}]`
    Cart,

    /// Wishlisted product ids
    Wishlist,

    /// Last known user, or `null`
    User,

    /// Placed orders, most recent first
    Orders,

    /// The most recent order
    LastOrder,

    /// Product ids selected for comparison
    Compare,
}

impl StoreKey {
    /// Every key, in declaration order.
    pub const ALL: [StoreKey; 6] = [
        StoreKey::Cart,
        StoreKey::Wishlist,
        StoreKey::User,
        StoreKey::Orders,
        StoreKey::LastOrder,
        StoreKey::Compare,
    ];

    /// The unprefixed key name.
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Cart => "cart",
            StoreKey::Wishlist => "wishlist",
            StoreKey::User => "user",
            StoreKey::Orders => "orders",
            StoreKey::LastOrder => "last_order",
            StoreKey::Compare => "compare",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State Store
#[derive(Debug, Clone)]
pub struct StateStore<S> {
    backend: S,
    prefix: String,
}

impl<S: Storage> StateStore<S> {
    /// Wrap a backend using the default `shop_` prefix.
    pub fn new(backend: S) -> Self {
        Self::with_prefix(backend, DEFAULT_KEY_PREFIX)
    }

    /// Wrap a backend using a custom key prefix.
    pub fn with_prefix(backend: S, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    /// The namespaced key for `key`, e.g. `shop_cart`.
    pub fn namespaced(&self, key: StoreKey) -> String {
        format!("{}{}", self.prefix, key.as_str())
    }

    /// Serialize `value` and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if serialization or the backend write fails.
    pub fn save<T: Serialize + ?Sized>(&mut self, key: StoreKey, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        let name = self.namespaced(key);

        self.backend.set(&name, &json)?;

        debug!(key = %name, bytes = json.len(), "saved state");

        Ok(())
    }

    /// Load the value under `key`, or `fallback` if it is missing or malformed.
    pub fn load<T: DeserializeOwned>(&self, key: StoreKey, fallback: T) -> T {
        let name = self.namespaced(key);

        let raw = match self.backend.get(&name) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return fallback,
            Err(error) => {
                warn!(key = %name, %error, "failed to read state; using fallback");
                return fallback;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                warn!(key = %name, %error, "discarding malformed state");
                fallback
            }
        }
    }

    /// Load the value under `key`, or `T::default()`.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: StoreKey) -> T {
        self.load(key, T::default())
    }

    /// Remove the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend write fails.
    pub fn remove(&mut self, key: StoreKey) -> Result<(), StoreError> {
        let name = self.namespaced(key);

        self.backend.remove(&name)?;

        debug!(key = %name, "removed state");

        Ok(())
    }

    /// The key prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// The wrapped backend, mutably. Writes made here bypass serialization.
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Unwrap the backend.
    pub fn into_inner(self) -> S {
        self.backend
    }
}
