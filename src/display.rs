//! Price breakdown display
//!
//! Groups a line's units by the price they sell at, for rendering in place of a
//! single unit price when a line was split across price tiers.

use std::fmt::Write;

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::items::LineItem;

/// One row of a price breakdown: `count` units at `price`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRow<'a> {
    /// Unit price for the row
    pub price: Money<'a, Currency>,

    /// Number of units at that price
    pub count: u32,
}

/// Group a line's per-unit prices into breakdown rows.
///
/// Identical prices are merged in the order they first appear. Units of the
/// line not covered by `breakdown` follow as a final row at the line's base
/// price. An empty breakdown yields no rows.
pub fn describe<'a>(
    line: &LineItem<'a>,
    breakdown: &[Money<'a, Currency>],
) -> SmallVec<[PriceRow<'a>; 2]> {
    let mut rows: SmallVec<[PriceRow<'a>; 2]> = SmallVec::new();

    if breakdown.is_empty() {
        return rows;
    }

    for price in breakdown {
        match rows.iter_mut().find(|row| row.price == *price) {
            Some(row) => row.count = row.count.saturating_add(1),
            None => rows.push(PriceRow {
                price: *price,
                count: 1,
            }),
        }
    }

    let covered = u32::try_from(breakdown.len()).unwrap_or(u32::MAX);
    let remaining = line.quantity().saturating_sub(covered);

    if remaining > 0 {
        rows.push(PriceRow {
            price: *line.unit_price(),
            count: remaining,
        });
    }

    rows
}

/// Render breakdown rows as `"{price} x {count}"` lines.
pub fn render_rows(rows: &[PriceRow<'_>]) -> String {
    let mut out = String::new();

    for (idx, row) in rows.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }

        _ = write!(out, "{} x {}", row.price, row.count);
    }

    out
}
