//! Block discount configuration

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{products::ProductId, rounding::RoundingMode};

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Block size was zero or negative.
    #[error("block size must be at least 1, got {0}")]
    InvalidBlockSize(i64),

    /// Per-unit discount was negative.
    #[error("per-unit discount must not be negative, got {0}")]
    NegativeDiscount(Decimal),
}

/// Static configuration of the block discount rule.
#[derive(Debug, Clone)]
pub struct BlockDiscountConfig {
    excluded: FxHashSet<ProductId>,
    block_size: NonZeroU32,
    per_unit_discount: Money<'static, Currency>,
    rounding: RoundingMode,
}

impl BlockDiscountConfig {
    /// Create a configuration with no exclusions and half-up rounding.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidBlockSize`]: `block_size` is less than 1.
    /// - [`ConfigError::NegativeDiscount`]: `per_unit_discount` is below zero.
    pub fn new(
        block_size: i64,
        per_unit_discount: Money<'static, Currency>,
    ) -> Result<Self, ConfigError> {
        let block_size = u32::try_from(block_size)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(ConfigError::InvalidBlockSize(block_size))?;

        let amount = *per_unit_discount.amount();

        if amount < Decimal::ZERO {
            return Err(ConfigError::NegativeDiscount(amount));
        }

        Ok(Self {
            excluded: FxHashSet::default(),
            block_size,
            per_unit_discount,
            rounding: RoundingMode::default(),
        })
    }

    /// Exclude products from the discount and from the block count.
    #[must_use]
    pub fn with_excluded(mut self, products: impl IntoIterator<Item = ProductId>) -> Self {
        self.excluded.extend(products);
        self
    }

    /// Set the rounding mode used for blended prices.
    #[must_use]
    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    /// Whether `product` is excluded
    pub fn is_excluded(&self, product: ProductId) -> bool {
        self.excluded.contains(&product)
    }

    /// Excluded products
    pub fn excluded(&self) -> &FxHashSet<ProductId> {
        &self.excluded
    }

    /// Units per block
    pub fn block_size(&self) -> NonZeroU32 {
        self.block_size
    }

    /// Amount taken off each discounted unit
    pub fn per_unit_discount(&self) -> &Money<'static, Currency> {
        &self.per_unit_discount
    }

    /// Rounding mode for blended prices
    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn rejects_zero_block_size() {
        let result = BlockDiscountConfig::new(0, Money::from_minor(1000, GBP));

        assert!(matches!(result, Err(ConfigError::InvalidBlockSize(0))));
    }

    #[test]
    fn rejects_negative_block_size() {
        let result = BlockDiscountConfig::new(-3, Money::from_minor(1000, GBP));

        assert!(matches!(result, Err(ConfigError::InvalidBlockSize(-3))));
    }

    #[test]
    fn rejects_block_size_beyond_u32() {
        let result = BlockDiscountConfig::new(i64::MAX, Money::from_minor(1000, GBP));

        assert!(matches!(result, Err(ConfigError::InvalidBlockSize(_))));
    }

    #[test]
    fn rejects_negative_discount() {
        let result = BlockDiscountConfig::new(3, Money::from_minor(-1, GBP));

        assert!(matches!(result, Err(ConfigError::NegativeDiscount(_))));
    }

    #[test]
    fn accepts_zero_discount() -> TestResult {
        let config = BlockDiscountConfig::new(3, Money::from_minor(0, GBP))?;

        assert_eq!(config.per_unit_discount(), &Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn builder_sets_exclusions_and_rounding() -> TestResult {
        let config = BlockDiscountConfig::new(3, Money::from_minor(1000, GBP))?
            .with_excluded([ProductId::new(5192), ProductId::new(5193)])
            .with_rounding(RoundingMode::HalfEven);

        assert_eq!(config.block_size().get(), 3);
        assert!(config.is_excluded(ProductId::new(5192)));
        assert!(config.is_excluded(ProductId::new(5193)));
        assert!(!config.is_excluded(ProductId::new(1)));
        assert_eq!(config.excluded().len(), 2);
        assert_eq!(config.rounding(), RoundingMode::HalfEven);

        Ok(())
    }
}
