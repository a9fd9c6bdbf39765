//! Items

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

use crate::products::ProductId;

new_key_type! {
    /// Cart line key
    pub struct LineKey;
}

/// A single cart line: some quantity of one product at a unit price.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    key: LineKey,
    product: ProductId,
    quantity: u32,
    unit_price: Money<'a, Currency>,
}

impl<'a> LineItem<'a> {
    /// Creates a new line item.
    ///
    /// `product` must already be resolved to its parent when the line holds a variation.
    pub fn new(
        key: LineKey,
        product: ProductId,
        quantity: u32,
        unit_price: Money<'a, Currency>,
    ) -> Self {
        Self {
            key,
            product,
            quantity,
            unit_price,
        }
    }

    /// Returns the line key
    pub fn key(&self) -> LineKey {
        self.key
    }

    /// Returns the resolved product of the line
    pub fn product(&self) -> ProductId {
        self.product
    }

    /// Returns the number of units on the line
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the base unit price of the line
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the line total at the base unit price, or `None` if it overflows.
    pub fn checked_total(&self) -> Option<Money<'a, Currency>> {
        self.unit_price
            .amount()
            .checked_mul(Decimal::from(self.quantity))
            .map(|total| Money::from_decimal(total, self.unit_price.currency()))
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }
}
