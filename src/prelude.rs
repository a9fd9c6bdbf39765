//! Blockprice prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocation::{AdjustedPrice, Allocation, AllocationError, BlockAllocator, LineAdjustment},
    cart::{Cart, CartError, CartSnapshot, CartVersion},
    config::{BlockDiscountConfig, ConfigError},
    display::{PriceRow, describe, render_rows},
    fixtures::{Fixture, FixtureError},
    items::{LineItem, LineKey},
    lookup::{LookupError, PriceLookup, PricingSession},
    products::{CartProduct, ProductId},
    receipt::{Receipt, ReceiptError},
    rounding::RoundingMode,
};
