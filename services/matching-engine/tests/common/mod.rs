//! Shared builders for integration tests

#![allow(dead_code)]

use matching_engine::{MatchingConfig, OrderBook};
use types::ids::{MarketId, PartyId};
use types::numeric::Price;
use types::order::{Order, Side, TimeInForce};

pub const MARKET: &str = "BTC/USDT";

pub fn book(config: MatchingConfig) -> OrderBook {
    OrderBook::new(MarketId::new(MARKET), config)
}

pub fn limit(party: &str, side: Side, price: u64, size: u64, timestamp: u64) -> Order {
    order(party, side, price, size, TimeInForce::GTC, timestamp)
}

pub fn ioc(party: &str, side: Side, price: u64, size: u64, timestamp: u64) -> Order {
    order(party, side, price, size, TimeInForce::IOC, timestamp)
}

pub fn order(party: &str, side: Side, price: u64, size: u64, tif: TimeInForce, timestamp: u64) -> Order {
    Order::new(
        MarketId::new(MARKET),
        PartyId::new(party),
        side,
        Price::from_u64(price),
        size,
        tif,
        timestamp,
    )
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
