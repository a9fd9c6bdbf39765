//! Integration tests for the fixture sets shipped in `fixtures/`.
//!
//! `sample`: blocks of 3, £10 off, gift cards (5192, 5193) excluded.
//!
//! - Hoodie x2 @ £50 -> £40 (both units discounted)
//! - Jacket x5 @ £80 -> 4 discounted at £70, 1 at £80, blended £72
//! - Gift Card x1 @ £25 -> excluded
//! - Beanie x1 @ £15 -> eligible (through parent 210) but past the budget
//!
//! 8 eligible units, so 6 are discounted.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::GBP};
use testresult::TestResult;

use blockprice::prelude::*;

#[test]
fn sample_set_prices_as_expected() -> TestResult {
    let fixture = Fixture::from_set("sample")?;

    let snapshot = fixture.cart()?.snapshot();
    let mut session = PricingSession::new(fixture.config()?.clone());
    let lookup = session.lookup(&snapshot)?;

    let prices: Vec<i64> = snapshot
        .lines()
        .iter()
        .map(|line| lookup.price_for(line.key()).map(|m| m.to_minor_units()))
        .collect::<Result<_, _>>()?;

    assert_eq!(prices, vec![4000, 7200, 2500, 1500]);
    assert_eq!(lookup.allocation().total_eligible(), 8);
    assert_eq!(lookup.allocation().discounted_units(), 6);

    let receipt = Receipt::from_allocation(&snapshot, lookup.allocation())?;

    assert_eq!(receipt.subtotal(), Money::from_minor(54_000, GBP));
    assert_eq!(receipt.total(), Money::from_minor(48_000, GBP));
    assert_eq!(receipt.full_price_lines().len(), 2);

    Ok(())
}

#[test]
fn steps_set_rounds_blended_price_half_even() -> TestResult {
    let fixture = Fixture::from_set("steps")?;

    let snapshot = fixture.cart()?.snapshot();
    let allocation = BlockAllocator::new(fixture.config()?.clone()).compute(snapshot.lines())?;

    let prices: Vec<Option<Decimal>> = snapshot
        .lines()
        .iter()
        .map(|line| allocation.adjusted_price(line.key()).map(|m| *m.amount()))
        .collect();

    // Pens: 5 of 6 discounted, (3.00 + 0.50 * 5) / 6 = 0.91666...
    assert_eq!(
        prices,
        vec![Some(Decimal::new(950, 2)), Some(Decimal::new(9167, 4))]
    );

    Ok(())
}

#[test]
fn sample_receipt_renders() -> TestResult {
    let fixture = Fixture::from_set("sample")?;

    let snapshot = fixture.cart()?.snapshot();
    let allocation = BlockAllocator::new(fixture.config()?.clone()).compute(snapshot.lines())?;
    let receipt = Receipt::from_allocation(&snapshot, &allocation)?;

    let mut out = Vec::new();
    receipt.write_to(&mut out, &snapshot, fixture.product_names())?;

    let rendered = String::from_utf8(out)?;

    for name in ["Hoodie", "Jacket", "Gift Card", "Beanie (Red)", "Total:"] {
        assert!(rendered.contains(name), "missing {name}: {rendered}");
    }

    Ok(())
}
