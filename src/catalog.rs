//! Catalog
//!
//! The read-only product catalog, loaded once from a fixture set.

use std::{fs, path::PathBuf};

use rand::{Rng, seq::SliceRandom};
use rustc_hash::FxHashMap;
use rusty_money::iso::{self, Currency};
use slotmap::SlotMap;
use tracing::debug;

use crate::{
    fixtures::{
        DEFAULT_PRODUCTS_YAML, DEFAULT_USERS_YAML, FIXTURES_DIR, FixtureError,
        products::ProductsFixture, users::UsersFixture,
    },
    products::{Product, ProductKey},
    users::User,
};

/// Catalog
#[derive(Debug)]
pub struct Catalog<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// `SlotMap` storing the products with generated keys
    products: SlotMap<ProductKey, Product<'a>>,

    /// Product keys in catalog order
    order: Vec<ProductKey>,

    /// Product id -> `SlotMap` key
    product_keys: FxHashMap<String, ProductKey>,

    categories: Vec<String>,
    brands: Vec<String>,
    colors: Vec<String>,
    users: Vec<User>,

    /// Currency shared by every product
    currency: Option<&'static Currency>,
}

impl<'a> Catalog<'a> {
    /// Create a new empty catalog with the default base path
    pub fn new() -> Self {
        Self::with_base_path(FIXTURES_DIR)
    }

    /// Create a new empty catalog with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: SlotMap::with_key(),
            order: Vec::new(),
            product_keys: FxHashMap::default(),
            categories: Vec::new(),
            brands: Vec::new(),
            colors: Vec::new(),
            users: Vec::new(),
            currency: None,
        }
    }

    /// Create a new empty catalog priced in the given currency
    pub fn with_currency(currency: &'static Currency) -> Self {
        let mut catalog = Self::new();
        catalog.currency = Some(currency);
        catalog
    }

    /// Load a complete fixture set (products and users with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut catalog = Self::new();

        catalog.load_products(name)?.load_users(name)?;

        Ok(catalog)
    }

    /// Load the fixture set compiled into the crate
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled fixtures fail to parse.
    pub fn bundled() -> Result<Self, FixtureError> {
        let mut catalog = Self::new();

        catalog
            .load_products_yaml(DEFAULT_PRODUCTS_YAML)?
            .load_users_yaml(DEFAULT_USERS_YAML)?;

        Ok(catalog)
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a product id repeats,
    /// or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.load_products_yaml(&contents)
    }

    /// Load products from YAML source
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed, if a product id repeats, or if
    /// there are currency mismatches.
    pub fn load_products_yaml(&mut self, contents: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = serde_norway::from_str(contents)?;

        for product_fixture in fixture.products {
            let product = product_fixture.into_product(&fixture.reviews)?;

            self.insert(product)?;
        }

        self.categories.extend(fixture.categories);
        self.brands.extend(fixture.brands);
        self.colors.extend(fixture.colors);

        debug!(products = self.len(), "loaded catalog products");

        Ok(self)
    }

    /// Load sample users from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_users(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("users").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.load_users_yaml(&contents)
    }

    /// Load sample users from YAML source
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed.
    pub fn load_users_yaml(&mut self, contents: &str) -> Result<&mut Self, FixtureError> {
        let fixture: UsersFixture = serde_norway::from_str(contents)?;

        self.users.extend(fixture.users);

        Ok(self)
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is already present or if the product's currency differs
    /// from the catalog currency.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, FixtureError> {
        if self.product_keys.contains_key(&product.id) {
            return Err(FixtureError::DuplicateProduct(product.id));
        }

        let code = product.price.currency().iso_alpha_code;

        match self.currency {
            Some(existing) if existing.iso_alpha_code != code => {
                return Err(FixtureError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    code.to_string(),
                ));
            }
            Some(_) => {}
            None => {
                let currency = iso::find(code)
                    .ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

                self.currency = Some(currency);
            }
        }

        let id = product.id.clone();
        let key = self.products.insert(product);

        self.order.push(key);
        self.product_keys.insert(id, key);

        Ok(key)
    }

    /// Get a product by its id
    pub fn get(&self, id: &str) -> Option<&Product<'a>> {
        self.product_keys
            .get(id)
            .and_then(|key| self.products.get(*key))
    }

    /// Get a product key by its id
    pub fn product_key(&self, id: &str) -> Option<ProductKey> {
        self.product_keys.get(id).copied()
    }

    /// Get a product by its key
    pub fn product(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Whether a product id resolves
    pub fn contains(&self, id: &str) -> bool {
        self.product_keys.contains_key(id)
    }

    /// Iterate over products in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Product<'a>> {
        self.order.iter().filter_map(|key| self.products.get(*key))
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the catalog has no products
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The catalog currency, once known
    pub fn currency(&self) -> Option<&'static Currency> {
        self.currency
    }

    /// Category names
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Brand names
    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    /// Colour palette
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// Sample users
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Most popular products first, ties kept in catalog order.
    pub fn trending(&self, limit: usize) -> Vec<&Product<'a>> {
        let mut products: Vec<_> = self.iter().collect();

        products.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        products.truncate(limit);

        products
    }

    /// A random sample of up to `limit` products.
    pub fn recommended<R: Rng + ?Sized>(&self, limit: usize, rng: &mut R) -> Vec<&Product<'a>> {
        let products: Vec<_> = self.iter().collect();

        products
            .choose_multiple(rng, limit)
            .copied()
            .collect()
    }

    /// Products in the given category.
    pub fn in_category<'s>(&'s self, category: &'s str) -> impl Iterator<Item = &'s Product<'a>> {
        self.iter()
            .filter(move |product| product.category.eq_ignore_ascii_case(category))
    }

    /// Products of the given brand.
    pub fn by_brand<'s>(&'s self, brand: &'s str) -> impl Iterator<Item = &'s Product<'a>> {
        self.iter()
            .filter(move |product| product.brand.eq_ignore_ascii_case(brand))
    }

    /// Case-insensitive match on title, brand or category.
    pub fn search(&self, query: &str) -> Vec<&Product<'a>> {
        let needle = query.trim().to_lowercase();

        if needle.is_empty() {
            return Vec::new();
        }

        self.iter()
            .filter(|product| {
                [&product.title, &product.brand, &product.category]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

impl Default for Catalog<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rand::{SeedableRng, rngs::StdRng};
    use rusty_money::{
        Money,
        iso::{INR, USD},
    };
    use testresult::TestResult;

    use crate::products::test_support::product;

    use super::*;

    #[test]
    fn bundled_catalog_loads() -> TestResult {
        let catalog = Catalog::bundled()?;

        assert_eq!(catalog.len(), 14);
        assert_eq!(catalog.currency(), Some(INR));
        assert_eq!(catalog.categories().len(), 9);
        assert_eq!(catalog.users().len(), 2);

        let shirt = catalog.get("P001").ok_or("missing P001")?;

        assert_eq!(shirt.price, Money::from_minor(89_900, INR));
        assert_eq!(shirt.reviews.len(), 2);
        assert_eq!(shirt.specs.get("Fit").map(String::as_str), Some("Slim"));

        Ok(())
    }

    #[test]
    fn from_set_reads_fixture_directory() -> TestResult {
        let dir = tempfile::tempdir()?;

        fs::create_dir_all(dir.path().join("products"))?;
        fs::create_dir_all(dir.path().join("users"))?;
        fs::write(
            dir.path().join("products").join("mini.yml"),
            r#"
products:
  - id: X1
    title: Mug
    brand: CafeCasa
    category: Home
    price: "250 INR"
    mrp: "300 INR"
    discount: "16%"
    rating: "4.0"
    created_at: "2025-01-15T10:00:00Z"
"#,
        )?;
        fs::write(dir.path().join("users").join("mini.yml"), "users: []\n")?;

        let mut catalog = Catalog::with_base_path(dir.path());
        catalog.load_products("mini")?.load_users("mini")?;

        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("X1"));
        assert!(catalog.users().is_empty());

        Ok(())
    }

    #[test]
    fn missing_fixture_file_errors() {
        let mut catalog = Catalog::with_base_path("/definitely/not/here");

        assert!(matches!(
            catalog.load_products("default"),
            Err(FixtureError::Io(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() -> TestResult {
        let mut catalog = Catalog::new();
        catalog.insert(product("P001", 899))?;

        let result = catalog.insert(product("P001", 100));

        assert!(matches!(result, Err(FixtureError::DuplicateProduct(id)) if id == "P001"));

        Ok(())
    }

    #[test]
    fn first_product_sets_currency() -> TestResult {
        let mut catalog = Catalog::new();

        assert_eq!(catalog.currency(), None);

        catalog.insert(product("P001", 899))?;

        assert_eq!(catalog.currency(), Some(INR));

        Ok(())
    }

    #[test]
    fn duplicate_id_does_not_set_currency() -> TestResult {
        let mut catalog = Catalog::new();
        catalog.insert(product("P001", 899))?;

        let mut dollar = product("P001", 10);
        dollar.price = Money::from_minor(1_000, USD);

        assert!(matches!(
            catalog.insert(dollar),
            Err(FixtureError::DuplicateProduct(_))
        ));
        assert_eq!(catalog.currency(), Some(INR));

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() -> TestResult {
        let mut catalog = Catalog::new();
        catalog.insert(product("P001", 899))?;

        let mut dollar = product("P002", 10);
        dollar.price = Money::from_minor(1_000, USD);

        assert!(matches!(
            catalog.insert(dollar),
            Err(FixtureError::CurrencyMismatch(_, _))
        ));

        Ok(())
    }

    #[test]
    fn trending_sorts_by_popularity() -> TestResult {
        let catalog = Catalog::bundled()?;

        let ids: Vec<_> = catalog
            .trending(3)
            .iter()
            .map(|product| product.id.as_str())
            .collect();

        assert_eq!(ids, ["P003", "P006", "P008"]);

        Ok(())
    }

    #[test]
    fn recommended_returns_distinct_products() -> TestResult {
        let catalog = Catalog::bundled()?;
        let mut rng = StdRng::seed_from_u64(7);

        let picks = catalog.recommended(8, &mut rng);

        let mut ids: Vec<_> = picks.iter().map(|product| product.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 8);

        Ok(())
    }

    #[test]
    fn category_brand_and_search_filters() -> TestResult {
        let catalog = Catalog::bundled()?;

        assert_eq!(catalog.in_category("electronics").count(), 4);
        assert_eq!(catalog.by_brand("LuxeWear").count(), 2);

        let hits = catalog.search("  bluetooth ");

        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().map(|product| product.id.as_str()), Some("P013"));
        assert!(catalog.search("   ").is_empty());

        Ok(())
    }
}
