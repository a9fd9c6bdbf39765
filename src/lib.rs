//! Blockprice
//!
//! Blockprice reprices cart lines under a "buy in blocks" rule: once the eligible
//! units in a cart reach the block size, a fixed per-unit discount applies to
//! every unit that fits into whole blocks, and the remainder stays at full price.

pub mod allocation;
pub mod cart;
pub mod config;
pub mod display;
pub mod fixtures;
pub mod items;
pub mod lookup;
pub mod prelude;
pub mod products;
pub mod receipt;
pub mod rounding;
pub mod utils;
