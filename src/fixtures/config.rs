//! Configuration Fixtures

use serde::Deserialize;

use crate::{
    config::BlockDiscountConfig,
    fixtures::{FixtureError, carts::parse_price},
    products::ProductId,
    rounding::RoundingMode,
};

/// Block discount rule in YAML
#[derive(Debug, Deserialize)]
pub struct ConfigFixture {
    /// Units per block
    pub block_size: i64,

    /// Amount taken off each discounted unit (e.g., "10.00 GBP")
    pub discount: String,

    /// Products that neither count toward nor receive the discount
    #[serde(default)]
    pub excluded_products: Vec<ProductId>,

    /// Rounding mode for blended prices
    #[serde(default)]
    pub rounding: RoundingMode,
}

impl TryFrom<ConfigFixture> for BlockDiscountConfig {
    type Error = FixtureError;

    fn try_from(fixture: ConfigFixture) -> Result<Self, Self::Error> {
        let discount = parse_price(&fixture.discount)?;

        Ok(BlockDiscountConfig::new(fixture.block_size, discount)?
            .with_excluded(fixture.excluded_products)
            .with_rounding(fixture.rounding))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::config::ConfigError;

    use super::*;

    #[test]
    fn parses_full_config() -> TestResult {
        let fixture: ConfigFixture = serde_norway::from_str(
            "block_size: 3\ndiscount: 10.00 GBP\nexcluded_products: [5192, 5193]\nrounding: half_even\n",
        )?;

        let config = BlockDiscountConfig::try_from(fixture)?;

        assert_eq!(config.block_size().get(), 3);
        assert_eq!(config.per_unit_discount(), &Money::from_minor(1000, GBP));
        assert!(config.is_excluded(ProductId::new(5193)));
        assert_eq!(config.rounding(), RoundingMode::HalfEven);

        Ok(())
    }

    #[test]
    fn exclusions_and_rounding_are_optional() -> TestResult {
        let fixture: ConfigFixture = serde_norway::from_str("block_size: 2\ndiscount: 1 GBP\n")?;

        let config = BlockDiscountConfig::try_from(fixture)?;

        assert!(config.excluded().is_empty());
        assert_eq!(config.rounding(), RoundingMode::HalfUp);

        Ok(())
    }

    #[test]
    fn zero_block_size_is_a_config_error() -> TestResult {
        let fixture: ConfigFixture = serde_norway::from_str("block_size: 0\ndiscount: 1 GBP\n")?;

        let result = BlockDiscountConfig::try_from(fixture);

        assert!(matches!(
            result,
            Err(FixtureError::Config(ConfigError::InvalidBlockSize(0)))
        ));

        Ok(())
    }
}
