//! Cart

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    items::{LineItem, LineKey},
    products::CartProduct,
};

/// Errors related to cart construction or totals.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line was given a negative unit price.
    #[error("Line {0} has a negative unit price")]
    NegativeUnitPrice(usize),

    /// A line was not found in the cart.
    #[error("Line {0:?} not found")]
    LineNotFound(LineKey),

    /// The same line key appears more than once in a snapshot.
    #[error("Line {0:?} appears more than once")]
    DuplicateLine(LineKey),

    /// A line total could not be represented.
    #[error("Line {0:?} total overflowed")]
    Overflow(LineKey),
}

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Stamp identifying one state of a cart.
///
/// Versions are issued from a process-wide counter, so no two carts and no two
/// states of one cart share a version, and an allocation computed for one
/// version is never served for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CartVersion(u64);

impl CartVersion {
    /// Create a version from its raw value.
    pub const fn new(version: u64) -> Self {
        Self(version)
    }

    /// Issue a version no other cart state has been given.
    #[must_use]
    pub fn issue() -> Self {
        Self(NEXT_VERSION.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CartVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Cart
#[derive(Debug)]
pub struct Cart<'a> {
    lines: SlotMap<LineKey, LineItem<'a>>,
    order: Vec<LineKey>,
    version: CartVersion,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new, empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: SlotMap::with_key(),
            order: Vec::new(),
            version: CartVersion::issue(),
            currency,
        }
    }

    /// Add a line to the end of the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the price is negative or in a different currency.
    pub fn add_line(
        &mut self,
        product: impl Into<CartProduct>,
        quantity: u32,
        unit_price: Money<'a, Currency>,
    ) -> Result<LineKey, CartError> {
        check_price(self.order.len(), &unit_price, self.currency)?;

        let product = product.into().resolve();

        let key = self
            .lines
            .insert_with_key(|key| LineItem::new(key, product, quantity, unit_price));

        self.order.push(key);
        self.bump();

        Ok(key)
    }

    /// Change the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the line is not in the cart.
    pub fn set_quantity(&mut self, key: LineKey, quantity: u32) -> Result<(), CartError> {
        let line = self
            .lines
            .get_mut(key)
            .ok_or(CartError::LineNotFound(key))?;

        line.set_quantity(quantity);
        self.bump();

        Ok(())
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the line is not in the cart.
    pub fn remove_line(&mut self, key: LineKey) -> Result<LineItem<'a>, CartError> {
        let line = self.lines.remove(key).ok_or(CartError::LineNotFound(key))?;

        self.order.retain(|k| *k != key);
        self.bump();

        Ok(line)
    }

    /// Mark the cart as reloaded, forcing a fresh allocation on the next read.
    pub fn reload(&mut self) {
        self.bump();
    }

    /// Capture the current state of the cart.
    pub fn snapshot(&self) -> CartSnapshot<'a> {
        CartSnapshot {
            version: self.version,
            currency: self.currency,
            lines: self.iter().cloned().collect(),
        }
    }

    /// Get a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::LineNotFound` if the line is not found.
    pub fn get_line(&self, key: LineKey) -> Result<&LineItem<'a>, CartError> {
        self.lines.get(key).ok_or(CartError::LineNotFound(key))
    }

    /// Iterate over the lines in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.order.iter().filter_map(|key| self.lines.get(*key))
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Get the current version of the cart.
    #[must_use]
    pub fn version(&self) -> CartVersion {
        self.version
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Calculate the subtotal of the cart at base prices.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a line total overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        subtotal(self.iter(), self.currency)
    }

    fn bump(&mut self) {
        self.version = CartVersion::issue();
    }
}

/// Immutable capture of a cart at one version.
#[derive(Debug, Clone)]
pub struct CartSnapshot<'a> {
    version: CartVersion,
    currency: &'static Currency,
    lines: Vec<LineItem<'a>>,
}

impl<'a> CartSnapshot<'a> {
    /// Build a snapshot directly from host lines.
    ///
    /// The caller is responsible for giving each distinct cart state its own
    /// version, usually from [`CartVersion::issue`].
    ///
    /// # Errors
    ///
    /// Returns a `CartError` on a currency mismatch, a negative price or a repeated line key.
    pub fn with_lines(
        version: CartVersion,
        lines: impl Into<Vec<LineItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();
        let mut seen = FxHashSet::default();

        for (i, line) in lines.iter().enumerate() {
            check_price(i, line.unit_price(), currency)?;

            if !seen.insert(line.key()) {
                return Err(CartError::DuplicateLine(line.key()));
            }
        }

        Ok(CartSnapshot {
            version,
            currency,
            lines,
        })
    }

    /// Version of the cart this snapshot was taken from
    pub fn version(&self) -> CartVersion {
        self.version
    }

    /// Lines in cart order
    pub fn lines(&self) -> &[LineItem<'a>] {
        &self.lines
    }

    /// Find a line by key.
    pub fn line(&self, key: LineKey) -> Option<&LineItem<'a>> {
        self.lines.iter().find(|line| line.key() == key)
    }

    /// Currency of every line in the snapshot
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Whether the snapshot has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Calculate the subtotal of the snapshot at base prices.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a line total overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        subtotal(self.lines.iter(), self.currency)
    }
}

fn check_price(
    idx: usize,
    price: &Money<'_, Currency>,
    currency: &'static Currency,
) -> Result<(), CartError> {
    let price_currency = price.currency();

    if price_currency != currency {
        return Err(CartError::CurrencyMismatch(
            idx,
            price_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ));
    }

    if *price.amount() < Decimal::ZERO {
        return Err(CartError::NegativeUnitPrice(idx));
    }

    Ok(())
}

fn subtotal<'a, 'l>(
    mut lines: impl Iterator<Item = &'l LineItem<'a>>,
    currency: &'static Currency,
) -> Result<Money<'a, Currency>, CartError>
where
    'a: 'l,
{
    let total = lines.try_fold(Decimal::ZERO, |acc, line| {
        line.checked_total()
            .and_then(|total| acc.checked_add(*total.amount()))
            .ok_or(CartError::Overflow(line.key()))
    })?;

    Ok(Money::from_decimal(total, currency))
}
