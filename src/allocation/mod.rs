//! Block discount allocation
//!
//! Once the eligible units in a cart reach the block size, every unit that fits
//! into a whole number of blocks is discounted by a fixed amount. The discounted
//! units are handed out greedily in cart order: each eligible line takes as many
//! as it can from the remaining budget, and the line that exhausts the budget is
//! priced at a blended unit price covering its discounted and full-price units.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{Span, debug};

use crate::{
    config::BlockDiscountConfig,
    items::{LineItem, LineKey},
};

pub mod result;

pub use result::{AdjustedPrice, Allocation, LineAdjustment};

/// Errors raised while allocating the discount.
#[derive(Debug, Error, PartialEq)]
pub enum AllocationError {
    /// A line has a negative unit price.
    #[error("Line {0:?} has a negative unit price")]
    NegativeUnitPrice(LineKey),

    /// A line is priced in a different currency from the discount.
    #[error("Line {line:?} is priced in {actual}, but the discount is in {expected}")]
    CurrencyMismatch {
        /// Offending line
        line: LineKey,
        /// Currency of the discount
        expected: &'static str,
        /// Currency of the line
        actual: &'static str,
    },

    /// Price arithmetic on a line could not be represented.
    #[error("Price arithmetic overflowed on line {0:?}")]
    Overflow(LineKey),
}

/// Allocates the block discount across cart lines.
#[derive(Debug, Clone)]
pub struct BlockAllocator {
    config: BlockDiscountConfig,
}

impl BlockAllocator {
    /// Create an allocator for the given rule.
    pub fn new(config: BlockDiscountConfig) -> Self {
        Self { config }
    }

    /// The rule this allocator applies
    pub fn config(&self) -> &BlockDiscountConfig {
        &self.config
    }

    /// Compute the adjusted price of every line.
    ///
    /// Lines are visited in the given order. Every line appears in the result;
    /// excluded lines, empty lines and lines left after the budget runs out are
    /// [`AdjustedPrice::Unchanged`]. The same input always yields the same result.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::NegativeUnitPrice`]: a line has a negative unit price.
    /// - [`AllocationError::CurrencyMismatch`]: a line is not priced in the discount currency.
    /// - [`AllocationError::Overflow`]: a blended price could not be represented.
    #[tracing::instrument(
        name = "block_allocator.compute",
        skip_all,
        fields(
            lines = lines.len(),
            total_eligible = tracing::field::Empty,
            budget = tracing::field::Empty
        )
    )]
    pub fn compute<'a>(&self, lines: &[LineItem<'a>]) -> Result<Allocation<'a>, AllocationError> {
        let mut prices = FxHashMap::default();
        let mut total_eligible = 0u64;

        for line in lines {
            self.validate(line)?;

            prices.insert(line.key(), AdjustedPrice::Unchanged);

            if self.is_eligible(line) {
                total_eligible += u64::from(line.quantity());
            }
        }

        let block_size = u64::from(self.config.block_size().get());
        let budget = (total_eligible / block_size) * block_size;

        let span = Span::current();

        span.record("total_eligible", total_eligible);
        span.record("budget", budget);

        if budget == 0 {
            debug!(total_eligible, block_size, "block threshold not met");

            return Ok(Allocation::new(prices, total_eligible, budget));
        }

        let mut remaining = budget;

        for line in lines
            .iter()
            .filter(|line| self.is_eligible(line) && line.quantity() > 0)
        {
            let adjustment = self.allocate_line(line, remaining)?;

            remaining -= u64::from(adjustment.discounted_units());

            debug!(
                line = ?line.key(),
                quantity = line.quantity(),
                discounted_units = adjustment.discounted_units(),
                unit_price = %adjustment.unit_price(),
                remaining,
                "allocated block discount"
            );

            prices.insert(line.key(), AdjustedPrice::Adjusted(adjustment));

            if remaining == 0 {
                break;
            }
        }

        Ok(Allocation::new(prices, total_eligible, budget))
    }

    fn is_eligible(&self, line: &LineItem<'_>) -> bool {
        !self.config.is_excluded(line.product())
    }

    fn validate(&self, line: &LineItem<'_>) -> Result<(), AllocationError> {
        let price = line.unit_price();

        if *price.amount() < Decimal::ZERO {
            return Err(AllocationError::NegativeUnitPrice(line.key()));
        }

        let expected = self.config.per_unit_discount().currency();

        if price.currency() != expected {
            return Err(AllocationError::CurrencyMismatch {
                line: line.key(),
                expected: expected.iso_alpha_code,
                actual: price.currency().iso_alpha_code,
            });
        }

        Ok(())
    }

    /// Discount up to `remaining` units of `line`.
    ///
    /// `remaining` must be non-zero and `line` must have a non-zero quantity.
    fn allocate_line<'a>(
        &self,
        line: &LineItem<'a>,
        remaining: u64,
    ) -> Result<LineAdjustment<'a>, AllocationError> {
        let overflow = || AllocationError::Overflow(line.key());

        let currency: &'a Currency = line.unit_price().currency();
        let price = *line.unit_price().amount();
        let adjusted = price
            .checked_sub(*self.config.per_unit_discount().amount())
            .ok_or_else(overflow)?;

        let discounted_unit_price = Money::from_decimal(adjusted, currency);
        let quantity = line.quantity();

        if u64::from(quantity) <= remaining {
            return Ok(LineAdjustment::new(
                discounted_unit_price,
                discounted_unit_price,
                quantity,
            ));
        }

        // remaining < quantity, so it fits in a u32
        let discounted = u32::try_from(remaining).map_err(|_err| overflow())?;
        let full_price = quantity - discounted;

        let full_total = price.checked_mul(Decimal::from(full_price));
        let discounted_total = adjusted.checked_mul(Decimal::from(discounted));

        let blended = full_total
            .zip(discounted_total)
            .and_then(|(full, disc)| full.checked_add(disc))
            .and_then(|total| total.checked_div(Decimal::from(quantity)))
            .ok_or_else(overflow)?;

        let blended = self.config.rounding().round(blended);

        Ok(LineAdjustment::new(
            Money::from_decimal(blended, currency),
            discounted_unit_price,
            discounted,
        ))
    }
}
