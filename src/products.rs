//! Products

use std::fmt;

use serde::{Deserialize, Serialize};

/// Product identifier as assigned by the host storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Create a product id from its raw value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product as the host reports it on a cart line.
///
/// Variations are priced and excluded through their parent product, so a cart
/// line only ever carries the resolved id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartProduct {
    /// A standalone product.
    Simple(ProductId),

    /// A variation of a parent product.
    Variation {
        /// The variation's own id
        id: ProductId,

        /// The parent product the variation belongs to
        parent: ProductId,
    },
}

impl CartProduct {
    /// Returns the id used for exclusion and block counting.
    pub fn resolve(self) -> ProductId {
        match self {
            CartProduct::Simple(id) => id,
            CartProduct::Variation { parent, .. } => parent,
        }
    }
}

impl From<ProductId> for CartProduct {
    fn from(id: ProductId) -> Self {
        CartProduct::Simple(id)
    }
}
