//! Matching engine core
//!
//! Registry of per-market order books. Markets are only ever added through
//! `create_market`; submissions to an unknown market are rejected. Books are
//! kept in a `BTreeMap` so that every walk over markets (id lookup, expiry,
//! state hash) runs in market id order on every replica.

use std::collections::BTreeMap;

use tracing::{info, warn};
use types::errors::{EngineError, OrderError};
use types::ids::{content_hash, to_hex, MarketId, OrderId};
use types::order::{Order, OrderAmendment};
use types::trade::{MarketData, MarketDepth, OrderConfirmation};

use crate::book::OrderBook;
use crate::config::MatchingConfig;

/// Main matching engine
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    /// Order books per market
    books: BTreeMap<MarketId, OrderBook>,
    /// Configuration applied to newly created books
    config: MatchingConfig,
}

impl MatchingEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            books: BTreeMap::new(),
            config,
        }
    }

    /// Create the book for `market` if it does not exist yet
    ///
    /// Returns `true` if a book was created.
    pub fn create_market(&mut self, market: MarketId) -> bool {
        if self.books.contains_key(&market) {
            return false;
        }
        info!(market = %market, "Market created");
        let book = OrderBook::new(market.clone(), self.config.clone());
        self.books.insert(market, book);
        true
    }

    pub fn has_market(&self, market: &MarketId) -> bool {
        self.books.contains_key(market)
    }

    /// Registered markets in id order
    pub fn markets(&self) -> impl Iterator<Item = &MarketId> {
        self.books.keys()
    }

    /// Route a submission to its market's book
    pub fn submit_order(&mut self, order: Order) -> Result<OrderConfirmation, OrderError> {
        match self.books.get_mut(&order.market) {
            Some(book) => book.submit_order(order),
            None => {
                warn!(market = %order.market, "Order for unknown market");
                Err(OrderError::InvalidMarketId {
                    expected: "a registered market".to_string(),
                    received: order.market.to_string(),
                })
            }
        }
    }

    /// Remove a resting order from whichever book holds it
    ///
    /// Returns `None` if no book knows the id.
    pub fn delete_order(&mut self, order_id: &OrderId) -> Option<Order> {
        self.books
            .values_mut()
            .find_map(|book| book.cancel_order(order_id).ok())
    }

    /// Remove a resting order from a known market
    pub fn cancel_order(&mut self, market: &MarketId, order_id: &OrderId) -> Result<Order, EngineError> {
        Ok(self.book_mut(market)?.cancel_order(order_id)?)
    }

    pub fn amend_order(&mut self, market: &MarketId, amendment: &OrderAmendment) -> Result<Order, EngineError> {
        Ok(self.book_mut(market)?.amend_order(amendment)?)
    }

    pub fn get_market_data(&self, market: &MarketId) -> Option<MarketData> {
        self.books.get(market).map(OrderBook::market_data)
    }

    pub fn depth(&self, market: &MarketId, levels: usize) -> Option<MarketDepth> {
        self.books.get(market).map(|book| book.depth(levels))
    }

    pub fn book(&self, market: &MarketId) -> Option<&OrderBook> {
        self.books.get(market)
    }

    /// Expire GTT orders in every market, in market id order
    pub fn remove_expired_orders(&mut self, now: u64) -> Vec<Order> {
        self.books
            .values_mut()
            .flat_map(|book| book.remove_expired_orders(now))
            .collect()
    }

    /// Hash over every book's state hash, in market id order
    pub fn state_hash(&self) -> String {
        let books: Vec<(&MarketId, String)> = self
            .books
            .iter()
            .map(|(market, book)| (market, book.state_hash()))
            .collect();
        to_hex(&content_hash(&books))
    }

    fn book_mut(&mut self, market: &MarketId) -> Result<&mut OrderBook, EngineError> {
        self.books.get_mut(market).ok_or_else(|| EngineError::MarketNotFound {
            market: market.to_string(),
        })
    }
}
