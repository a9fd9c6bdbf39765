//! Fixtures
//!
//! YAML fixture sets: `config/{name}.yml` holds the block discount rule and
//! `carts/{name}.yml` holds the cart lines.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    config::{BlockDiscountConfig, ConfigError},
    fixtures::{
        carts::{CartFixture, parse_currency, parse_price},
        config::ConfigFixture,
    },
    products::ProductId,
};

pub mod carts;
pub mod config;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Quantity is negative or too large
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Cart has no lines and no currency
    #[error("Cart fixture has no lines and no currency")]
    NoCurrency,

    /// No configuration loaded
    #[error("No configuration loaded")]
    NoConfig,

    /// No cart loaded
    #[error("No cart loaded")]
    NoCart,

    /// Invalid block discount configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Cart construction error
    #[error("Failed to build cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Loaded block discount rule
    config: Option<BlockDiscountConfig>,

    /// Loaded cart
    cart: Option<Cart<'a>>,

    /// Display names by resolved product
    product_names: FxHashMap<ProductId, String>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            config: None,
            cart: None,
            product_names: FxHashMap::default(),
        }
    }

    /// Load the block discount rule from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the rule is invalid.
    pub fn load_config(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("config").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ConfigFixture = serde_norway::from_str(&contents)?;

        self.config = Some(BlockDiscountConfig::try_from(fixture)?);

        Ok(self)
    }

    /// Load a cart from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a line is invalid.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        let currency = match (&fixture.currency, fixture.lines.first()) {
            (Some(code), _) => parse_currency(code)?,
            (None, Some(line)) => parse_price(&line.price)?.currency(),
            (None, None) => return Err(FixtureError::NoCurrency),
        };

        let mut cart = Cart::new(currency);

        for line in &fixture.lines {
            let product = line.cart_product();

            cart.add_line(product, line.quantity()?, parse_price(&line.price)?)?;

            if let Some(name) = &line.name {
                self.product_names
                    .entry(product.resolve())
                    .or_insert_with(|| name.clone());
            }
        }

        self.cart = Some(cart);

        Ok(self)
    }

    /// Load a complete fixture set (config and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_config(name)?.load_cart(name)?;

        Ok(fixture)
    }

    /// Get the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration has been loaded.
    pub fn config(&self) -> Result<&BlockDiscountConfig, FixtureError> {
        self.config.as_ref().ok_or(FixtureError::NoConfig)
    }

    /// Get the loaded cart
    ///
    /// # Errors
    ///
    /// Returns an error if no cart has been loaded.
    pub fn cart(&self) -> Result<&Cart<'a>, FixtureError> {
        self.cart.as_ref().ok_or(FixtureError::NoCart)
    }

    /// Get the loaded cart, mutably
    ///
    /// # Errors
    ///
    /// Returns an error if no cart has been loaded.
    pub fn cart_mut(&mut self) -> Result<&mut Cart<'a>, FixtureError> {
        self.cart.as_mut().ok_or(FixtureError::NoCart)
    }

    /// Display names by resolved product
    pub fn product_names(&self) -> &FxHashMap<ProductId, String> {
        &self.product_names
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::items::LineItem;

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn fixture_loads_config_and_cart() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "config",
            "shop",
            "block_size: 3\ndiscount: 10.00 GBP\nexcluded_products: [5192]\n",
        )?;

        write_fixture(
            dir.path(),
            "carts",
            "shop",
            "lines:\n  - product: 1\n    name: Mug\n    quantity: 2\n    price: 12.00 GBP\n  - product: 5194\n    parent: 5192\n    name: Gift Card\n    quantity: 1\n    price: 25.00 GBP\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_config("shop")?.load_cart("shop")?;

        let cart = fixture.cart()?;
        let products: Vec<u64> = cart.iter().map(|line| line.product().get()).collect();

        assert_eq!(products, vec![1, 5192]);
        assert_eq!(cart.currency(), GBP);
        assert_eq!(
            cart.iter().next().map(LineItem::unit_price),
            Some(&Money::from_minor(1200, GBP))
        );
        assert_eq!(fixture.config()?.block_size().get(), 3);
        assert_eq!(
            fixture.product_names().get(&ProductId::new(5192)),
            Some(&"Gift Card".to_string())
        );

        Ok(())
    }

    #[test]
    fn empty_cart_needs_a_currency() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(dir.path(), "carts", "empty", "lines: []\n")?;
        write_fixture(dir.path(), "carts", "empty_gbp", "currency: GBP\n")?;

        let mut fixture = Fixture::with_base_path(dir.path());

        assert!(matches!(
            fixture.load_cart("empty"),
            Err(FixtureError::NoCurrency)
        ));

        fixture.load_cart("empty_gbp")?;

        assert!(fixture.cart()?.is_empty());

        Ok(())
    }

    #[test]
    fn negative_quantity_fails_to_load() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "carts",
            "bad",
            "lines:\n  - product: 1\n    quantity: -1\n    price: 1.00 GBP\n",
        )?;

        let result = Fixture::with_base_path(dir.path()).load_cart("bad").map(|_| ());

        assert!(matches!(result, Err(FixtureError::InvalidQuantity(-1))));

        Ok(())
    }

    #[test]
    fn mixed_currencies_fail_to_load() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "carts",
            "mixed",
            "lines:\n  - product: 1\n    quantity: 1\n    price: 1.00 GBP\n  - product: 2\n    quantity: 1\n    price: 1.00 USD\n",
        )?;

        let result = Fixture::with_base_path(dir.path()).load_cart("mixed").map(|_| ());

        assert!(matches!(
            result,
            Err(FixtureError::Cart(CartError::CurrencyMismatch(1, _, _)))
        ));

        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = Fixture::with_base_path("./does-not-exist")
            .load_config("nope")
            .map(|_| ());

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }

    #[test]
    fn accessors_error_before_loading() {
        let mut fixture = Fixture::new();

        assert!(matches!(fixture.config(), Err(FixtureError::NoConfig)));
        assert!(matches!(fixture.cart(), Err(FixtureError::NoCart)));
        assert!(matches!(fixture.cart_mut(), Err(FixtureError::NoCart)));
    }

    #[test]
    fn fixture_default_matches_new() {
        let fixture = Fixture::default();

        assert_eq!(fixture.base_path, PathBuf::from("./fixtures"));
        assert!(fixture.product_names().is_empty());
    }
}
