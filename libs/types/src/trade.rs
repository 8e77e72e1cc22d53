//! Trade, confirmation and market data types

use crate::ids::{MarketId, OrderId, PartyId, TradeId};
use crate::numeric::Price;
use crate::order::{Order, Side};
use serde::{Deserialize, Serialize};

/// Fields hashed into a trade id. Field order is part of the id format.
#[derive(Serialize)]
struct TradeContent<'a> {
    market: &'a MarketId,
    sequence: u64,
    price: Price,
    size: u64,
    buy_order: OrderId,
    sell_order: OrderId,
    aggressor: Side,
    timestamp: u64,
}

/// Execution between an aggressor and one passive order
///
/// Trades are produced by a single submission and handed back to the
/// caller; the book never stores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    /// Per-market trade sequence
    pub sequence: u64,
    pub market: MarketId,
    /// Always the passive order's price
    pub price: Price,
    pub size: u64,
    pub buyer: PartyId,
    pub seller: PartyId,
    pub buy_order: OrderId,
    pub sell_order: OrderId,
    pub aggressor: Side,
    pub timestamp: u64,
}

impl Trade {
    /// Execute `size` units between `aggressor` and `passive`.
    ///
    /// The trade prints at the passive price. Buyer and seller are resolved
    /// from each order's side, and both orders' `remaining` are reduced.
    ///
    /// # Panics
    /// Panics if `size` is zero, exceeds either order's remaining quantity,
    /// or the two orders are on the same side.
    pub fn new(sequence: u64, aggressor: &mut Order, passive: &mut Order, size: u64) -> Self {
        assert_ne!(aggressor.side, passive.side, "Trade requires opposite sides");
        assert!(
            size > 0 && size <= aggressor.remaining && size <= passive.remaining,
            "Trade size exceeds remaining"
        );
        aggressor.fill(size);
        passive.fill(size);

        let (buy, sell) = match aggressor.side {
            Side::BUY => (&*aggressor, &*passive),
            Side::SELL => (&*passive, &*aggressor),
        };

        let content = TradeContent {
            market: &passive.market,
            sequence,
            price: passive.price,
            size,
            buy_order: buy.id,
            sell_order: sell.id,
            aggressor: aggressor.side,
            timestamp: aggressor.timestamp,
        };

        Self {
            id: TradeId::from_content(&content),
            sequence,
            market: passive.market.clone(),
            price: passive.price,
            size,
            buyer: buy.party.clone(),
            seller: sell.party.clone(),
            buy_order: buy.id,
            sell_order: sell.id,
            aggressor: aggressor.side,
            timestamp: aggressor.timestamp,
        }
    }

    /// Notional value (price × size), widened so it cannot overflow
    pub fn notional(&self) -> u128 {
        u128::from(self.price.as_u64()) * u128::from(self.size)
    }
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// The submitted order with its assigned id, final remaining and status
    pub order: Order,
    /// Trades in execution order
    pub trades: Vec<Trade>,
    /// Passive orders as they stood after each fill, in trade order
    pub passive_orders_affected: Vec<Order>,
}

impl OrderConfirmation {
    pub fn order_id(&self) -> OrderId {
        self.order.id
    }

    pub fn traded_volume(&self) -> u64 {
        self.trades.iter().map(|t| t.size).sum()
    }
}

/// Top of book and last trade; zero means "none"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketData {
    pub best_bid: Price,
    pub best_offer: Price,
    pub last_traded_price: Price,
}

/// Aggregated volume at one price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Price,
    pub volume: u64,
    pub orders: usize,
}

/// Top-N levels per side, best first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDepth {
    pub market: Option<MarketId>,
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}
