//! Allocation results

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};

use crate::items::LineKey;

/// Discount applied to one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineAdjustment<'a> {
    unit_price: Money<'a, Currency>,
    discounted_unit_price: Money<'a, Currency>,
    discounted_units: u32,
}

impl<'a> LineAdjustment<'a> {
    /// Create an adjustment.
    pub fn new(
        unit_price: Money<'a, Currency>,
        discounted_unit_price: Money<'a, Currency>,
        discounted_units: u32,
    ) -> Self {
        Self {
            unit_price,
            discounted_unit_price,
            discounted_units,
        }
    }

    /// Unit price the line sells at.
    ///
    /// For a split line this is the blended price: `unit_price * quantity`
    /// reproduces the mix of discounted and full-price units.
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }

    /// Price of a single discounted unit
    pub fn discounted_unit_price(&self) -> Money<'a, Currency> {
        self.discounted_unit_price
    }

    /// Number of units on the line that received the discount
    pub fn discounted_units(&self) -> u32 {
        self.discounted_units
    }
}

/// Adjusted price of a cart line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustedPrice<'a> {
    /// The line sells at its base unit price.
    Unchanged,

    /// Some or all of the line's units are discounted.
    Adjusted(LineAdjustment<'a>),
}

impl<'a> AdjustedPrice<'a> {
    /// Returns the adjustment, if any.
    pub fn adjustment(&self) -> Option<&LineAdjustment<'a>> {
        match self {
            AdjustedPrice::Unchanged => None,
            AdjustedPrice::Adjusted(adjustment) => Some(adjustment),
        }
    }

    /// Returns the adjusted unit price, if any.
    pub fn unit_price(&self) -> Option<Money<'a, Currency>> {
        self.adjustment().map(LineAdjustment::unit_price)
    }
}

/// Per-line prices for one cart snapshot.
///
/// An allocation is never patched: a changed cart gets a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation<'a> {
    prices: FxHashMap<LineKey, AdjustedPrice<'a>>,
    total_eligible: u64,
    budget: u64,
}

impl<'a> Allocation<'a> {
    pub(crate) fn new(
        prices: FxHashMap<LineKey, AdjustedPrice<'a>>,
        total_eligible: u64,
        budget: u64,
    ) -> Self {
        Self {
            prices,
            total_eligible,
            budget,
        }
    }

    /// Adjusted price for a line, `None` if the line was not part of the snapshot.
    pub fn get(&self, key: LineKey) -> Option<&AdjustedPrice<'a>> {
        self.prices.get(&key)
    }

    /// Adjustment for a line, `None` if the line sells at its base price.
    pub fn adjustment(&self, key: LineKey) -> Option<&LineAdjustment<'a>> {
        self.get(key).and_then(AdjustedPrice::adjustment)
    }

    /// Adjusted unit price for a line, `None` if the line sells at its base price.
    pub fn adjusted_price(&self, key: LineKey) -> Option<Money<'a, Currency>> {
        self.adjustment(key).map(LineAdjustment::unit_price)
    }

    /// Per-unit prices of the discounted units of a line, in unit order.
    ///
    /// Empty when the line was not discounted.
    pub fn unit_breakdown(&self, key: LineKey) -> Vec<Money<'a, Currency>> {
        self.adjustment(key)
            .map(|adjustment| {
                (0..adjustment.discounted_units())
                    .map(|_| adjustment.discounted_unit_price())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total units that received the discount across all lines.
    pub fn discounted_units(&self) -> u64 {
        self.prices
            .values()
            .filter_map(AdjustedPrice::adjustment)
            .map(|adjustment| u64::from(adjustment.discounted_units()))
            .sum()
    }

    /// Units counting toward the block threshold.
    pub fn total_eligible(&self) -> u64 {
        self.total_eligible
    }

    /// Units allowed to receive the discount.
    pub fn budget(&self) -> u64 {
        self.budget
    }

    /// Iterate over every line's adjusted price.
    pub fn iter(&self) -> impl Iterator<Item = (LineKey, &AdjustedPrice<'a>)> {
        self.prices.iter().map(|(key, price)| (*key, price))
    }

    /// Number of lines covered
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether no lines are covered
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use slotmap::SlotMap;

    use super::*;

    fn allocation_with<'a>(entries: &[(LineKey, AdjustedPrice<'a>)]) -> Allocation<'a> {
        let prices = entries.iter().copied().collect();

        Allocation::new(prices, 5, 3)
    }

    #[test]
    fn unchanged_lines_have_no_adjusted_price() {
        let mut keys = SlotMap::<LineKey, ()>::with_key();
        let key = keys.insert(());

        let allocation = allocation_with(&[(key, AdjustedPrice::Unchanged)]);

        assert_eq!(allocation.get(key), Some(&AdjustedPrice::Unchanged));
        assert_eq!(allocation.adjusted_price(key), None);
        assert!(allocation.unit_breakdown(key).is_empty());
    }

    #[test]
    fn unit_breakdown_repeats_discounted_price_per_unit() {
        let mut keys = SlotMap::<LineKey, ()>::with_key();
        let key = keys.insert(());

        let adjustment = LineAdjustment::new(
            Money::from_minor(9400, GBP),
            Money::from_minor(9000, GBP),
            3,
        );

        let allocation = allocation_with(&[(key, AdjustedPrice::Adjusted(adjustment))]);

        assert_eq!(
            allocation.unit_breakdown(key),
            vec![Money::from_minor(9000, GBP); 3]
        );
        assert_eq!(allocation.adjusted_price(key), Some(Money::from_minor(9400, GBP)));
        assert_eq!(allocation.discounted_units(), 3);
    }

    #[test]
    fn missing_lines_are_absent() {
        let allocation = allocation_with(&[]);

        assert!(allocation.is_empty());
        assert_eq!(allocation.get(LineKey::default()), None);
        assert_eq!(allocation.total_eligible(), 5);
        assert_eq!(allocation.budget(), 3);
    }
}
