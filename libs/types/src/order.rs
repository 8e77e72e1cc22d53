//! Order types
//!
//! An `Order` is the immutable input the ordering layer hands to the book,
//! plus the two fields the book owns once it is admitted: `remaining` and
//! `status`.

use crate::ids::{MarketId, OrderId, PartyId};
use crate::numeric::Price;
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }

    /// Whether an order on this side with limit `limit` may trade against
    /// resting liquidity at `resting`.
    ///
    /// This is the only place the buy/sell price comparison is written down.
    pub fn crosses(&self, limit: Price, resting: Price) -> bool {
        match self {
            Side::BUY => limit >= resting,
            Side::SELL => limit <= resting,
        }
    }
}

/// Time-in-force policy for orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TimeInForce {
    /// Good-Till-Cancel: rests until filled or explicitly canceled
    GTC,
    /// Good-Till-Time: rests until filled, canceled, or the logical time
    /// passed to `remove_expired_orders` reaches the expiry
    GTT(u64),
    /// Immediate-Or-Cancel: match immediately, discard the remainder
    IOC,
    /// Fill-Or-Kill: match the whole size immediately or trade nothing
    FOK,
}

impl TimeInForce {
    /// Persistent orders rest on the book when not fully filled
    pub fn is_persistent(&self) -> bool {
        matches!(self, TimeInForce::GTC | TimeInForce::GTT(_))
    }

    pub fn expires_at(&self) -> Option<u64> {
        match self {
            TimeInForce::GTT(at) => Some(*at),
            _ => None,
        }
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason")]
pub enum OrderStatus {
    /// Not yet admitted by a book
    #[serde(rename = "PENDING")]
    Pending,

    /// Resting on the book (possibly partially filled)
    #[serde(rename = "ACTIVE")]
    Active,

    /// Completely matched (terminal)
    #[serde(rename = "FILLED")]
    Filled,

    /// Removed before being filled (terminal)
    #[serde(rename = "CANCELED")]
    Canceled(CancelReason),

    /// GTT deadline reached (terminal)
    #[serde(rename = "EXPIRED")]
    Expired,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Canceled(_) | OrderStatus::Expired
        )
    }
}

/// Why an order left the book without filling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelReason {
    UserRequested,
    /// Non-persistent remainder discarded after matching
    Unfilled,
    /// FOK order could not be filled completely
    FillOrKill,
    /// Matching reached a resting order of the same party
    SelfTrade,
}

/// Fields hashed into an order id. Field order is part of the id format.
#[derive(Serialize)]
struct OrderContent<'a> {
    market: &'a MarketId,
    party: &'a PartyId,
    side: Side,
    price: Price,
    size: u64,
    remaining: u64,
    timestamp: u64,
    time_in_force: TimeInForce,
    sequence: u64,
}

/// Limit order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub market: MarketId,
    pub party: PartyId,
    pub side: Side,
    pub price: Price,
    pub size: u64,
    pub remaining: u64,
    /// Logical arrival time, non-decreasing per market
    pub timestamp: u64,
    pub time_in_force: TimeInForce,
    pub status: OrderStatus,
}

impl Order {
    /// Create a new pending order with `remaining == size`
    pub fn new(
        market: MarketId,
        party: PartyId,
        side: Side,
        price: Price,
        size: u64,
        time_in_force: TimeInForce,
        timestamp: u64,
    ) -> Self {
        Self {
            id: OrderId::UNASSIGNED,
            market,
            party,
            side,
            price,
            size,
            remaining: size,
            timestamp,
            time_in_force,
            status: OrderStatus::Pending,
        }
    }

    /// Derive and store the content id; `sequence` is the book's submission
    /// counter and keeps identical submissions apart.
    pub fn assign_id(&mut self, sequence: u64) -> OrderId {
        let content = OrderContent {
            market: &self.market,
            party: &self.party,
            side: self.side,
            price: self.price,
            size: self.size,
            remaining: self.remaining,
            timestamp: self.timestamp,
            time_in_force: self.time_in_force,
            sequence,
        };
        self.id = OrderId::from_content(&content);
        self.id
    }

    /// Check quantity invariant: 0 <= remaining <= size
    pub fn check_invariant(&self) -> bool {
        self.remaining <= self.size
    }

    pub fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    pub fn filled(&self) -> u64 {
        self.size - self.remaining
    }

    pub fn is_persistent(&self) -> bool {
        self.time_in_force.is_persistent()
    }

    /// Apply a fill of `size` units
    ///
    /// # Panics
    /// Panics if the fill would exceed the remaining quantity
    pub fn fill(&mut self, size: u64) {
        assert!(size <= self.remaining, "Fill would exceed order remaining");
        self.remaining -= size;
        if self.remaining == 0 {
            self.status = OrderStatus::Filled;
        }
    }

    /// Cancel the order
    ///
    /// # Panics
    /// Panics if order is already in terminal state
    pub fn cancel(&mut self, reason: CancelReason) {
        assert!(!self.status.is_terminal(), "Cannot cancel terminal order");
        self.status = OrderStatus::Canceled(reason);
    }

    /// Mark a GTT order as expired
    pub fn expire(&mut self) {
        assert!(!self.status.is_terminal(), "Cannot expire terminal order");
        self.status = OrderStatus::Expired;
    }
}

/// In-place reduction of a resting order's remaining size
///
/// Amending keeps the order's queue position, so only reductions are
/// accepted; anything else must go through cancel and resubmit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAmendment {
    pub order_id: OrderId,
    pub party: PartyId,
    pub remaining: u64,
    pub timestamp: u64,
}
