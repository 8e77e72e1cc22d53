//! Types library for the deterministic matching core
//!
//! This library provides the data model shared by the order book and the
//! layers that feed it. Every type here is a pure value: no clocks, no
//! randomness, so that replaying the same submissions always reproduces
//! the same identifiers and the same book.
//!
//! # Modules
//! - `ids`: Identifiers (OrderId, TradeId, PartyId, MarketId) and content hashing
//! - `numeric`: Integer price type
//! - `order`: Order, side and time-in-force types
//! - `trade`: Trades, confirmations and market data snapshots
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;
pub mod errors;

pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::trade::*;
    pub use crate::errors::*;
}
