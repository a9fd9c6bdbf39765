//! Receipt

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    allocation::{Allocation, LineAdjustment},
    cart::{CartError, CartSnapshot},
    display::{describe, render_rows},
    items::{LineItem, LineKey},
    products::ProductId,
};

/// Errors that can occur when building or printing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating the cart subtotal.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// A line total could not be represented.
    #[error("Line {0:?} total overflowed")]
    Overflow(LineKey),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Final receipt for a priced cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    /// Lines sold entirely at their base price
    full_price_lines: SmallVec<[LineKey; 10]>,

    /// Discount applied to each discounted line
    adjustments: FxHashMap<LineKey, LineAdjustment<'a>>,

    /// Total at base prices
    subtotal: Money<'a, Currency>,

    /// Total after the block discount
    total: Money<'a, Currency>,

    /// Currency used for all monetary values
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a snapshot and its allocation.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line or cart total cannot be represented.
    pub fn from_allocation(
        snapshot: &CartSnapshot<'a>,
        allocation: &Allocation<'a>,
    ) -> Result<Self, ReceiptError> {
        let mut full_price_lines = SmallVec::new();
        let mut adjustments = FxHashMap::default();
        let mut total = Decimal::ZERO;

        for line in snapshot.lines() {
            let unit_price = if let Some(adjustment) = allocation.adjustment(line.key()) {
                adjustments.insert(line.key(), *adjustment);
                adjustment.unit_price()
            } else {
                full_price_lines.push(line.key());
                *line.unit_price()
            };

            total = unit_price
                .amount()
                .checked_mul(Decimal::from(line.quantity()))
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or(ReceiptError::Overflow(line.key()))?;
        }

        let currency = snapshot.currency();

        Ok(Receipt {
            full_price_lines,
            adjustments,
            subtotal: snapshot.subtotal()?,
            total: Money::from_decimal(total, currency),
            currency,
        })
    }

    /// Total cost at base prices
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Total amount paid for all lines
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Calculate the savings made by the block discount.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// Calculates the savings as a fraction of the subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings = self.savings()?;

        let ratio = savings
            .amount()
            .checked_div(*self.subtotal.amount())
            .unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(ratio))
    }

    /// Lines sold entirely at their base price, in cart order.
    #[must_use]
    pub fn full_price_lines(&self) -> &[LineKey] {
        &self.full_price_lines
    }

    /// Discount applied to a line, if any.
    pub fn adjustment_for(&self, key: LineKey) -> Option<&LineAdjustment<'a>> {
        self.adjustments.get(&key)
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Prints the receipt as a table followed by the totals.
    ///
    /// `names` maps products to display names; unnamed products are shown by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        snapshot: &CartSnapshot<'a>,
        names: &FxHashMap<ProductId, String>,
    ) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "",
            "Item",
            "Qty",
            "Base Price",
            "Unit Price",
            "Breakdown",
            "Savings",
        ]);

        let mut full_price_rows: SmallVec<[usize; 10]> = SmallVec::new();

        for (idx, line) in snapshot.lines().iter().enumerate() {
            if self.adjustment_for(line.key()).is_none() {
                // header is row 0
                full_price_rows.push(idx + 1);
            }

            builder.push_record(self.line_cells(idx, line, names)?);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..7), Alignment::right());

        for row in full_price_rows {
            table.modify(Rows::new(row..=row), color_dark_grey());
        }

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn line_cells(
        &self,
        idx: usize,
        line: &LineItem<'a>,
        names: &FxHashMap<ProductId, String>,
    ) -> Result<[String; 7], ReceiptError> {
        let name = names
            .get(&line.product())
            .cloned()
            .unwrap_or_else(|| format!("Product {}", line.product()));

        let base_price = *line.unit_price();

        let Some(adjustment) = self.adjustment_for(line.key()) else {
            return Ok([
                format!("#{:<3}", idx + 1),
                name,
                line.quantity().to_string(),
                format!("{base_price}"),
                format!("{base_price}"),
                String::new(),
                String::new(),
            ]);
        };

        let breakdown: Vec<_> = (0..adjustment.discounted_units())
            .map(|_| adjustment.discounted_unit_price())
            .collect();

        let line_savings = base_price
            .amount()
            .checked_sub(*adjustment.unit_price().amount())
            .and_then(|per_unit| per_unit.checked_mul(Decimal::from(line.quantity())))
            .ok_or(ReceiptError::Overflow(line.key()))?;

        Ok([
            format!("#{:<3}", idx + 1),
            name,
            line.quantity().to_string(),
            format!("{base_price}"),
            format!("{}", adjustment.unit_price()),
            render_rows(&describe(line, &breakdown)),
            format!("{}", Money::from_decimal(line_savings, self.currency)),
        ])
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let savings = self.savings()?;
        let savings_points = percent_points(self.savings_percent()?);

        let rows = [
            ("Subtotal:", format!("{}", self.subtotal)),
            ("Total:", format!("{}", self.total)),
            ("Savings:", format!("({savings_points:.2}%) {savings}")),
        ];

        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, " {label:>9}  {value:>value_width$}").map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

fn percent_points(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.25), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

/// ANSI dark grey (full-price line).
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
