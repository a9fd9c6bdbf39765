//! Rounding

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

/// Decimal places kept on a blended unit price.
pub const BLENDED_PRICE_DP: u32 = 4;

/// Midpoint rule applied when a blended unit price is rounded.
///
/// The mode is observable in cart totals, so it is part of the discount configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round midpoints away from zero (`0.00005` becomes `0.0001`).
    #[default]
    HalfUp,

    /// Round midpoints to the nearest even digit (banker's rounding).
    HalfEven,
}

impl RoundingMode {
    /// Round `value` to [`BLENDED_PRICE_DP`] places.
    #[must_use]
    pub fn round(self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(BLENDED_PRICE_DP, self.strategy())
    }

    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}
