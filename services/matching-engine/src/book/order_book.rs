//! Order book for a single market
//!
//! Owns both sides, the order arena, the id index and the per-book
//! sequence counters. Every mutation goes through `submit_order`,
//! `cancel_order`, `amend_order` or `remove_expired_orders`; each either
//! applies fully or returns an error without touching the book.

use std::collections::{btree_map, BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info, warn};
use types::errors::OrderError;
use types::ids::{content_hash, to_hex, MarketId, OrderId};
use types::numeric::Price;
use types::order::{CancelReason, Order, OrderAmendment, OrderStatus, Side};
use types::trade::{MarketData, MarketDepth, OrderConfirmation};

use super::arena::{OrderArena, OrderEntry, OrderHandle};
use super::price_level::PriceLevel;
use super::side::{Asks, Bids, OrderBookSide};
use crate::config::MatchingConfig;
use crate::matching::crossing::is_crossed;
use crate::matching::TradeExecutor;
use crate::validation::{check_capacity, validate_amendment, validate_order};

/// Canonical view of the book used for the state hash
#[derive(Serialize)]
struct BookState<'a> {
    market: &'a MarketId,
    last_traded_price: Price,
    bids: Vec<LevelState>,
    asks: Vec<LevelState>,
}

#[derive(Serialize)]
struct LevelState {
    price: Price,
    volume: u64,
    /// (id, remaining, timestamp) in queue order
    orders: Vec<(OrderId, u64, u64)>,
}

/// Limit order book for one market
#[derive(Debug, Clone)]
pub struct OrderBook {
    market: MarketId,
    config: MatchingConfig,
    bids: OrderBookSide<Bids>,
    asks: OrderBookSide<Asks>,
    arena: OrderArena,
    orders_by_id: HashMap<OrderId, OrderHandle>,
    /// GTT expiry time -> orders, in admission order
    expiries: BTreeMap<u64, Vec<OrderId>>,
    executor: TradeExecutor,
    /// Admission counter; discriminates order ids and orders arrivals
    submissions: u64,
    latest_timestamp: u64,
    last_traded_price: Price,
}

impl OrderBook {
    pub fn new(market: MarketId, config: MatchingConfig) -> Self {
        info!(
            market = %market,
            allocation = ?config.allocation,
            "Order book created"
        );
        Self {
            market,
            config,
            bids: OrderBookSide::new(),
            asks: OrderBookSide::new(),
            arena: OrderArena::new(),
            orders_by_id: HashMap::new(),
            expiries: BTreeMap::new(),
            executor: TradeExecutor::default(),
            submissions: 0,
            latest_timestamp: 0,
            last_traded_price: Price::ZERO,
        }
    }

    pub fn market(&self) -> &MarketId {
        &self.market
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Admit an order: match it against the opposite side, then rest any
    /// persistent remainder
    ///
    /// The confirmation carries the order with its assigned id and final
    /// status. An IOC remainder is reported as `Canceled(Unfilled)`; a FOK
    /// order that cannot fill completely trades nothing and is reported as
    /// `Canceled(FillOrKill)`. Matching stops at a resting order of the
    /// same party: trades made so far stand, the remainder is dropped and
    /// the order is reported as `Canceled(SelfTrade)`.
    pub fn submit_order(&mut self, mut order: Order) -> Result<OrderConfirmation, OrderError> {
        let own_volume = match order.side {
            Side::BUY => self.bids.total_volume(),
            Side::SELL => self.asks.total_volume(),
        };
        let admitted = validate_order(&order, &self.market, self.latest_timestamp)
            .and_then(|()| check_capacity(&order, own_volume));
        if let Err(err) = admitted {
            warn!(market = %self.market, party = %order.party, error = %err, "Order rejected");
            return Err(err);
        }

        self.latest_timestamp = order.timestamp;
        self.submissions += 1;
        let arrival = self.submissions;
        order.assign_id(arrival);
        order.status = OrderStatus::Active;

        let allocation = self.config.allocation;
        let placement = match order.side {
            Side::BUY => self.bids.add_order(
                &mut order,
                arrival,
                &mut self.asks,
                &mut self.arena,
                &mut self.executor,
                allocation,
            ),
            Side::SELL => self.asks.add_order(
                &mut order,
                arrival,
                &mut self.bids,
                &mut self.arena,
                &mut self.executor,
                allocation,
            ),
        };

        for filled in &placement.uncrossed.filled {
            self.unindex(filled);
        }
        if let Some(price) = placement.uncrossed.last_price() {
            self.last_traded_price = price;
        }

        if placement.killed {
            order.cancel(CancelReason::FillOrKill);
        } else if placement.uncrossed.self_trade {
            warn!(
                market = %self.market,
                order_id = %order.id,
                party = %order.party,
                filled = order.filled(),
                "Self trade prevented, order stopped"
            );
            order.cancel(CancelReason::SelfTrade);
        } else if let Some(handle) = placement.resting {
            self.orders_by_id.insert(order.id, handle);
            if let Some(expires_at) = order.time_in_force.expires_at() {
                self.expiries.entry(expires_at).or_default().push(order.id);
            }
        } else if order.remaining > 0 {
            order.cancel(CancelReason::Unfilled);
        }

        let top = self.market_data();
        debug_assert!(
            !is_crossed(top.best_bid, top.best_offer),
            "book left crossed after matching"
        );

        let trades = placement.uncrossed.trades;
        debug!(
            market = %self.market,
            order_id = %order.id,
            side = ?order.side,
            price = %order.price,
            trades = trades.len(),
            remaining = order.remaining,
            status = ?order.status,
            "Order admitted"
        );
        if self.config.log_trades {
            for trade in &trades {
                debug!(
                    market = %self.market,
                    trade_id = %trade.id,
                    sequence = trade.sequence,
                    price = %trade.price,
                    size = trade.size,
                    "Trade executed"
                );
            }
        }

        Ok(OrderConfirmation {
            order,
            trades,
            passive_orders_affected: placement.uncrossed.passive_affected,
        })
    }

    /// Detach a resting order from the book
    ///
    /// Unknown ids, including orders already filled or removed, are
    /// rejected with `InvalidOrderId` and leave the book unchanged.
    pub fn remove_order(&mut self, order_id: &OrderId) -> Result<Order, OrderError> {
        let handle = self
            .orders_by_id
            .get(order_id)
            .copied()
            .ok_or_else(|| OrderError::InvalidOrderId {
                order_id: order_id.to_string(),
            })?;

        let order = self.detach(handle);
        self.unindex(&order);
        Ok(order)
    }

    /// Remove a resting order on its owner's request
    pub fn cancel_order(&mut self, order_id: &OrderId) -> Result<Order, OrderError> {
        let mut order = self.remove_order(order_id)?;
        order.cancel(CancelReason::UserRequested);
        debug!(market = %self.market, order_id = %order.id, remaining = order.remaining, "Order canceled");
        Ok(order)
    }

    /// Reduce a resting order's remaining without losing queue priority
    pub fn amend_order(&mut self, amendment: &OrderAmendment) -> Result<Order, OrderError> {
        let handle = self
            .orders_by_id
            .get(&amendment.order_id)
            .copied()
            .ok_or_else(|| OrderError::InvalidOrderId {
                order_id: amendment.order_id.to_string(),
            })?;
        let side = {
            let resting = &self.resting(handle).order;
            validate_amendment(amendment, resting, self.latest_timestamp)?;
            resting.side
        };

        self.latest_timestamp = amendment.timestamp;
        let amended = match side {
            Side::BUY => self.bids.reduce_order(handle, amendment.remaining, &mut self.arena),
            Side::SELL => self.asks.reduce_order(handle, amendment.remaining, &mut self.arena),
        };
        debug!(market = %self.market, order_id = %amended.id, remaining = amended.remaining, "Order amended");
        Ok(amended)
    }

    /// Remove every GTT order whose expiry is at or before `now`
    ///
    /// Orders come back in expiry order, then admission order.
    pub fn remove_expired_orders(&mut self, now: u64) -> Vec<Order> {
        let mut expired = Vec::new();
        while let Some(entry) = self.expiries.first_entry() {
            if *entry.key() > now {
                break;
            }
            for order_id in entry.remove() {
                let handle = self
                    .orders_by_id
                    .remove(&order_id)
                    .unwrap_or_else(|| panic!("expiry index out of sync with orders in {}", self.market));
                let mut order = self.detach(handle);
                order.expire();
                expired.push(order);
            }
        }

        if !expired.is_empty() {
            debug!(market = %self.market, now, expired = expired.len(), "Expired orders removed");
        }
        expired
    }

    pub fn market_data(&self) -> MarketData {
        MarketData {
            best_bid: self.bids.best_price().unwrap_or(Price::ZERO),
            best_offer: self.asks.best_price().unwrap_or(Price::ZERO),
            last_traded_price: self.last_traded_price,
        }
    }

    /// Top `levels` price levels per side
    pub fn depth(&self, levels: usize) -> MarketDepth {
        MarketDepth {
            market: Some(self.market.clone()),
            bids: self.bids.depth(levels),
            asks: self.asks.depth(levels),
        }
    }

    /// Hex SHA-256 over both sides, in priority order, and the last traded
    /// price. Equal on every replica that applied the same commands.
    pub fn state_hash(&self) -> String {
        let state = BookState {
            market: &self.market,
            last_traded_price: self.last_traded_price,
            bids: self.bids.levels().map(|level| self.level_state(level)).collect(),
            asks: self.asks.levels().map(|level| self.level_state(level)).collect(),
        };
        to_hex(&content_hash(&state))
    }

    /// A resting order by id
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders_by_id
            .get(order_id)
            .and_then(|handle| self.arena.get(*handle))
            .map(|entry| &entry.order)
    }

    pub fn bids(&self) -> &OrderBookSide<Bids> {
        &self.bids
    }

    pub fn asks(&self) -> &OrderBookSide<Asks> {
        &self.asks
    }

    pub fn last_traded_price(&self) -> Price {
        self.last_traded_price
    }

    pub fn latest_timestamp(&self) -> u64 {
        self.latest_timestamp
    }

    /// Number of resting orders
    pub fn order_count(&self) -> usize {
        self.orders_by_id.len()
    }

    /// Number of resting GTT orders waiting for expiry
    pub fn pending_expiries(&self) -> usize {
        self.expiries.values().map(Vec::len).sum()
    }

    /// Resting orders at one price, in queue order
    pub fn orders_at(&self, side: Side, price: Price) -> Vec<&Order> {
        let level = match side {
            Side::BUY => self.bids.level(price),
            Side::SELL => self.asks.level(price),
        };
        level
            .map(|level| level.entries(&self.arena).map(|entry| &entry.order).collect())
            .unwrap_or_default()
    }

    fn resting(&self, handle: OrderHandle) -> &OrderEntry {
        self.arena
            .get(handle)
            .unwrap_or_else(|| panic!("order index out of sync with arena in {}", self.market))
    }

    fn detach(&mut self, handle: OrderHandle) -> Order {
        let side = self.resting(handle).order.side;
        match side {
            Side::BUY => self.bids.remove_order(handle, &mut self.arena),
            Side::SELL => self.asks.remove_order(handle, &mut self.arena),
        }
    }

    /// Drop a departed order from the id index and the expiry index
    fn unindex(&mut self, order: &Order) {
        self.orders_by_id.remove(&order.id);
        if let Some(expires_at) = order.time_in_force.expires_at() {
            if let btree_map::Entry::Occupied(mut entry) = self.expiries.entry(expires_at) {
                entry.get_mut().retain(|id| *id != order.id);
                if entry.get().is_empty() {
                    entry.remove();
                }
            }
        }
    }

    fn level_state(&self, level: &PriceLevel) -> LevelState {
        LevelState {
            price: level.price(),
            volume: level.volume(),
            orders: level
                .entries(&self.arena)
                .map(|entry| (entry.order.id, entry.order.remaining, entry.order.timestamp))
                .collect(),
        }
    }
}
