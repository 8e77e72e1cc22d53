//! Order book infrastructure module
//!
//! Contains the order arena, price levels, the generic book side and the
//! per-market order book.

pub mod arena;
pub mod order_book;
pub mod price_level;
pub mod side;

pub use arena::{OrderArena, OrderEntry, OrderHandle};
pub use order_book::OrderBook;
pub use price_level::{PriceLevel, Uncrossed};
pub use side::{Asks, Bids, FillOrKill, OrderBookSide, Placement, SideOrdering};
