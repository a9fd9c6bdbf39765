//! Cart Fixtures

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    products::{CartProduct, ProductId},
};

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart currency code, required only when there are no lines
    #[serde(default)]
    pub currency: Option<String>,

    /// Lines in cart order
    #[serde(default)]
    pub lines: Vec<LineFixture>,
}

/// Cart line fixture
#[derive(Debug, Deserialize)]
pub struct LineFixture {
    /// Product id
    pub product: ProductId,

    /// Parent product id, when the product is a variation
    #[serde(default)]
    pub parent: Option<ProductId>,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Number of units
    pub quantity: i64,

    /// Unit price (e.g., "12.50 GBP")
    pub price: String,
}

impl LineFixture {
    /// The product as reported by the host
    pub fn cart_product(&self) -> CartProduct {
        match self.parent {
            Some(parent) => CartProduct::Variation {
                id: self.product,
                parent,
            },
            None => CartProduct::Simple(self.product),
        }
    }

    /// Quantity as an unsigned count
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidQuantity`] for a negative or oversized quantity.
    pub fn quantity(&self) -> Result<u32, FixtureError> {
        u32::try_from(self.quantity).map_err(|_err| FixtureError::InvalidQuantity(self.quantity))
    }
}

/// Parse price string (e.g., "2.99 GBP") into money
///
/// The amount keeps its full decimal precision.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    Ok(Money::from_decimal(amount, parse_currency(currency_code)?))
}

/// Parse a currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] if the code is not supported.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
