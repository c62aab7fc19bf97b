//! Configuration

use std::{io::ErrorKind, path::PathBuf, time::Duration};

use clap::Args;
use tracing::debug;

use crate::{
    catalog::Catalog,
    checkout::payment::SimulatedGateway,
    fixtures::{DEFAULT_SET, FIXTURES_DIR, FixtureError},
    pricing::ShippingPolicy,
    storage::{
        DEFAULT_KEY_PREFIX, StateStore, Storage, StoreError, file::FileStorage,
        memory::MemoryStorage,
    },
};

/// Storefront settings, read from CLI arguments or the environment.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ShopConfig {
    /// Directory for persisted state; state is kept in memory when unset
    #[arg(long, env = "SHOP_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Prefix applied to every storage key
    #[arg(long, env = "SHOP_KEY_PREFIX", default_value = DEFAULT_KEY_PREFIX)]
    pub key_prefix: String,

    /// Directory fixture sets are read from
    #[arg(long, env = "SHOP_FIXTURES_DIR", default_value = FIXTURES_DIR)]
    pub fixtures_dir: PathBuf,

    /// Fixture set to load the catalog from
    #[arg(short, long, env = "SHOP_FIXTURE_SET", default_value = DEFAULT_SET)]
    pub fixture: String,

    /// Simulated payment gateway delay in milliseconds
    #[arg(long, env = "SHOP_PAYMENT_DELAY_MS", default_value_t = 1300)]
    pub payment_delay_ms: u64,

    /// Subtotals strictly above this amount ship free (major units)
    #[arg(long, env = "SHOP_FREE_SHIPPING_ABOVE", default_value_t = 500)]
    pub free_shipping_above: u32,

    /// Flat shipping fee below the free shipping threshold (major units)
    #[arg(long, env = "SHOP_SHIPPING_FEE", default_value_t = 40)]
    pub shipping_fee: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            fixtures_dir: PathBuf::from(FIXTURES_DIR),
            fixture: DEFAULT_SET.to_string(),
            payment_delay_ms: 1300,
            free_shipping_above: 500,
            shipping_fee: 40,
        }
    }
}

impl ShopConfig {
    /// The configured shipping policy.
    pub fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy::new(self.free_shipping_above, self.shipping_fee)
    }

    /// The simulated payment delay.
    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }

    /// A simulated gateway using the configured delay.
    pub fn gateway(&self) -> SimulatedGateway {
        SimulatedGateway::new(self.payment_delay())
    }

    /// Load the configured fixture set.
    ///
    /// The default set falls back to the copy bundled into the crate when its files are
    /// missing from the fixtures directory.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the fixture set cannot be read or parsed.
    pub fn load_catalog(&self) -> Result<Catalog<'static>, FixtureError> {
        let mut catalog = Catalog::with_base_path(&self.fixtures_dir);

        match catalog.load_products(&self.fixture) {
            Ok(catalog) => {
                catalog.load_users(&self.fixture)?;
            }
            Err(FixtureError::Io(error))
                if error.kind() == ErrorKind::NotFound && self.fixture == DEFAULT_SET =>
            {
                debug!(dir = %self.fixtures_dir.display(), "using bundled fixtures");

                return Catalog::bundled();
            }
            Err(error) => return Err(error),
        }

        Ok(catalog)
    }

    /// Open the configured state store: file-backed if a storage directory is set,
    /// in-memory otherwise.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the storage directory cannot be created.
    pub fn open_store(&self) -> Result<StateStore<Box<dyn Storage>>, StoreError> {
        let backend: Box<dyn Storage> = match &self.storage_dir {
            Some(dir) => Box::new(FileStorage::open(dir)?),
            None => Box::new(MemoryStorage::new()),
        };

        Ok(StateStore::with_prefix(backend, self.key_prefix.clone()))
    }
}
