//! Price lookup
//!
//! [`PricingSession`] memoizes the allocation for the last cart version it saw
//! and recomputes only when a snapshot with a different version arrives.
//! [`PriceLookup`] is the read path the host calls when it needs a line's price.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{Span, debug};

use crate::{
    allocation::{Allocation, AllocationError, BlockAllocator},
    cart::{CartSnapshot, CartVersion},
    config::BlockDiscountConfig,
    display::{PriceRow, describe},
    items::LineKey,
};

/// Errors raised by the price lookup.
#[derive(Debug, Error, PartialEq)]
pub enum LookupError {
    /// The line is not part of the snapshot.
    #[error("Line {0:?} not found")]
    LineNotFound(LineKey),
}

/// Allocation memo for one cart.
#[derive(Debug)]
pub struct PricingSession<'a> {
    allocator: BlockAllocator,
    computed: Option<(CartVersion, Allocation<'a>)>,
}

impl<'a> PricingSession<'a> {
    /// Create a session with nothing computed yet.
    pub fn new(config: BlockDiscountConfig) -> Self {
        Self {
            allocator: BlockAllocator::new(config),
            computed: None,
        }
    }

    /// Return the allocation for `snapshot`, computing it if the version changed.
    ///
    /// A failed computation clears the memo, so no earlier result is served afterwards.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocationError`] if the snapshot cannot be allocated.
    #[tracing::instrument(
        name = "pricing_session.refresh",
        skip_all,
        fields(version = %snapshot.version(), recomputed = tracing::field::Empty)
    )]
    pub fn refresh(
        &mut self,
        snapshot: &CartSnapshot<'a>,
    ) -> Result<&Allocation<'a>, AllocationError> {
        let version = snapshot.version();

        match self.computed.take() {
            Some((computed_version, allocation)) if computed_version == version => {
                Span::current().record("recomputed", false);
                debug!("allocation up to date");

                Ok(&self.computed.insert((version, allocation)).1)
            }
            _ => {
                Span::current().record("recomputed", true);

                let allocation = self.allocator.compute(snapshot.lines())?;

                debug!(
                    discounted_units = allocation.discounted_units(),
                    "allocation recomputed"
                );

                Ok(&self.computed.insert((version, allocation)).1)
            }
        }
    }

    /// Read prices for `snapshot`, refreshing the allocation first.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocationError`] if the snapshot cannot be allocated.
    pub fn lookup<'s>(
        &'s mut self,
        snapshot: &'s CartSnapshot<'a>,
    ) -> Result<PriceLookup<'s, 'a>, AllocationError> {
        let allocation = self.refresh(snapshot)?;

        Ok(PriceLookup {
            snapshot,
            allocation,
        })
    }

    /// Version of the memoized allocation, if any.
    pub fn computed_version(&self) -> Option<CartVersion> {
        self.computed.as_ref().map(|(version, _)| *version)
    }

    /// Drop the memoized allocation.
    pub fn invalidate(&mut self) {
        self.computed = None;
    }

    /// The allocator used by this session
    pub fn allocator(&self) -> &BlockAllocator {
        &self.allocator
    }
}

/// Effective prices for one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PriceLookup<'s, 'a> {
    snapshot: &'s CartSnapshot<'a>,
    allocation: &'s Allocation<'a>,
}

impl<'s, 'a> PriceLookup<'s, 'a> {
    /// Price a unit of `key` sells at: the adjusted price if there is one,
    /// otherwise the line's base unit price.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::LineNotFound`] if the line is not in the snapshot.
    pub fn price_for(&self, key: LineKey) -> Result<Money<'a, Currency>, LookupError> {
        let line = self
            .snapshot
            .line(key)
            .ok_or(LookupError::LineNotFound(key))?;

        Ok(self
            .allocation
            .adjusted_price(key)
            .unwrap_or(*line.unit_price()))
    }

    /// Breakdown rows for `key`, empty if the line sells at its base price.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::LineNotFound`] if the line is not in the snapshot.
    pub fn describe(&self, key: LineKey) -> Result<SmallVec<[PriceRow<'a>; 2]>, LookupError> {
        let line = self
            .snapshot
            .line(key)
            .ok_or(LookupError::LineNotFound(key))?;

        Ok(describe(line, &self.allocation.unit_breakdown(key)))
    }

    /// The allocation backing this lookup
    pub fn allocation(&self) -> &'s Allocation<'a> {
        self.allocation
    }

    /// The snapshot backing this lookup
    pub fn snapshot(&self) -> &'s CartSnapshot<'a> {
        self.snapshot
    }
}
