//! Matching Engine Service
//!
//! Deterministic limit order matching for a replicated exchange. Orders at
//! the same price are served oldest timestamp first; orders sharing a price
//! and a timestamp split an incoming fill pro rata (or FIFO in price-time
//! mode).
//!
//! **Key Invariants:**
//! - Same command sequence → same trades, ids and book state
//! - Trades execute at the passive order's price
//! - `0 <= remaining <= size` for every order at all times
//! - Conservation of quantity
//!
//! The core is synchronous and single-threaded per book. `service` wraps a
//! book in a tokio task for callers that want one sequential actor per
//! market.

pub mod book;
pub mod config;
pub mod engine;
pub mod events;
pub mod matching;
pub mod service;
pub mod validation;

pub use book::OrderBook;
pub use config::{Allocation, MatchingConfig, ServiceConfig};
pub use engine::MatchingEngine;
pub use events::BookEvent;
pub use service::{MarketHandle, MarketService};
