//! Matching logic module
//!
//! Crossing predicates, fill allocation inside a price level, and trade
//! construction.

pub mod allocation;
pub mod crossing;
pub mod executor;

pub use allocation::pro_rata_share;
pub use crossing::can_match;
pub use executor::{MatchError, TradeExecutor};
