//! Integer price type
//!
//! Prices are unsigned integers in the market's smallest tick. The core never
//! touches floating point: replicated nodes must agree bit for bit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Limit price of an order or execution price of a trade.
///
/// `Price::ZERO` doubles as "no price" in market data snapshots; it is never
/// a valid limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Price {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
