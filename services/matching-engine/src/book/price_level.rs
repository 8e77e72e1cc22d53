//! Price level implementation
//!
//! A price level contains all resting orders at one price on one side.
//! Orders are queued by arrival. Orders sharing an arrival timestamp form a
//! bucket: buckets are served strictly oldest first, and inside a bucket the
//! incoming fill is shared pro rata (or FIFO in price-time mode).

use std::collections::{BTreeMap, VecDeque};

use types::numeric::Price;
use types::order::{Order, Side};
use types::trade::Trade;

use super::arena::{OrderArena, OrderEntry, OrderHandle};
use crate::config::Allocation;
use crate::matching::allocation::tentative_size;
use crate::matching::{MatchError, TradeExecutor};

/// Output of matching an aggressor against resting liquidity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uncrossed {
    /// Trades in execution order
    pub trades: Vec<Trade>,
    /// Passive orders as they stood after each fill
    pub passive_affected: Vec<Order>,
    /// Passive orders that were filled and removed from the book
    pub filled: Vec<Order>,
    /// Matching stopped at an order of the aggressor's own party
    pub self_trade: bool,
}

impl Uncrossed {
    pub fn last_price(&self) -> Option<Price> {
        self.trades.last().map(|t| t.price)
    }
}

/// Sharing state of the timestamp bucket currently being matched
#[derive(Debug, Clone, Copy)]
struct Bucket {
    timestamp: u64,
    /// Aggressor remaining when the bucket was entered
    to_share: u64,
    /// Bucket volume when it was entered
    total: u64,
}

/// All resting orders at a single price
#[derive(Debug, Clone)]
pub struct PriceLevel {
    side: Side,
    price: Price,
    /// Sum of remaining over live orders
    volume: u64,
    volume_by_timestamp: BTreeMap<u64, u64>,
    /// Arrival-ordered handles; may contain stale handles of removed orders
    queue: VecDeque<OrderHandle>,
    orders: usize,
}

impl PriceLevel {
    pub fn new(side: Side, price: Price) -> Self {
        Self {
            side,
            price,
            volume: 0,
            volume_by_timestamp: BTreeMap::new(),
            queue: VecDeque::new(),
            orders: 0,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Aggregate resting volume
    pub fn volume(&self) -> u64 {
        self.volume
    }

    /// Resting volume of orders that arrived at `timestamp`
    pub fn volume_at(&self, timestamp: u64) -> u64 {
        self.volume_by_timestamp.get(&timestamp).copied().unwrap_or(0)
    }

    /// `(timestamp, volume)` per bucket, oldest first
    pub fn bucket_volumes(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.volume_by_timestamp.iter().map(|(t, v)| (*t, *v))
    }

    pub fn order_count(&self) -> usize {
        self.orders
    }

    pub fn is_empty(&self) -> bool {
        self.volume == 0
    }

    /// Live entries in queue order
    pub fn entries<'a>(&'a self, arena: &'a OrderArena) -> impl Iterator<Item = &'a OrderEntry> + 'a {
        self.queue.iter().filter_map(move |handle| arena.get(*handle))
    }

    /// Append a resting order at the back of the queue
    ///
    /// # Panics
    /// Panics if the order does not belong at this level or has nothing
    /// left to rest.
    pub(crate) fn add_order(&mut self, handle: OrderHandle, order: &Order) {
        assert!(
            order.side == self.side && order.price == self.price,
            "order added to the wrong price level"
        );
        assert!(order.remaining > 0, "cannot rest an order with zero remaining");

        // Admission bounds each side's volume, so these cannot overflow
        self.volume = self
            .volume
            .checked_add(order.remaining)
            .unwrap_or_else(|| panic!("level volume overflow at {}", self.price));
        *self.volume_by_timestamp.entry(order.timestamp).or_insert(0) += order.remaining;
        self.queue.push_back(handle);
        self.orders += 1;
    }

    /// Detach a resting order from the level and from the arena
    ///
    /// # Panics
    /// Panics if the handle is stale or the order is recorded at another
    /// price.
    pub(crate) fn remove_order(&mut self, handle: OrderHandle, arena: &mut OrderArena) -> Order {
        let entry = arena
            .remove(handle)
            .unwrap_or_else(|| panic!("stale handle removed from level {}", self.price));
        let order = entry.order;
        assert!(
            order.side == self.side && order.price == self.price,
            "order removed from the wrong price level"
        );

        self.take(order.timestamp, order.remaining);
        self.orders -= 1;
        self.purge_stale(arena);
        order
    }

    /// Shrink a resting order in place, keeping its queue position
    pub(crate) fn reduce_order(&mut self, handle: OrderHandle, remaining: u64, arena: &mut OrderArena) -> Order {
        let entry = arena
            .get_mut(handle)
            .unwrap_or_else(|| panic!("stale handle amended at level {}", self.price));
        let order = &mut entry.order;
        assert!(
            remaining > 0 && remaining <= order.remaining,
            "amend must reduce remaining"
        );

        let delta = order.remaining - remaining;
        order.remaining = remaining;
        let snapshot = order.clone();
        self.take(snapshot.timestamp, delta);
        snapshot
    }

    /// Match `aggressor` against this level
    ///
    /// Walks the queue from the front. Each new timestamp bucket resets the
    /// volume to share to the aggressor's current remaining; every passive
    /// order in the bucket gets its tentative size clamped to both orders'
    /// remaining. Filled passives leave the arena immediately and their
    /// handles are swept once the walk ends. Reaching an order of the
    /// aggressor's own party stops the walk and sets `out.self_trade`.
    ///
    /// Returns whether the aggressor was fully filled at this level.
    pub(crate) fn uncross(
        &mut self,
        aggressor: &mut Order,
        arena: &mut OrderArena,
        executor: &mut TradeExecutor,
        allocation: Allocation,
        out: &mut Uncrossed,
    ) -> bool {
        let mut bucket: Option<Bucket> = None;

        for i in 0..self.queue.len() {
            if aggressor.remaining == 0 {
                break;
            }
            let handle = self.queue[i];
            let Some(entry) = arena.get_mut(handle) else {
                continue;
            };
            let passive = &mut entry.order;
            let timestamp = passive.timestamp;

            let current = match bucket {
                Some(b) if b.timestamp == timestamp => b,
                _ => {
                    let b = Bucket {
                        timestamp,
                        to_share: aggressor.remaining,
                        total: self.volume_at(timestamp),
                    };
                    bucket = Some(b);
                    b
                }
            };

            let size = tentative_size(allocation, passive.remaining, current.total, current.to_share)
                .min(aggressor.remaining)
                .min(passive.remaining);

            let trade = match executor.execute(aggressor, passive, size) {
                Ok(trade) => trade,
                Err(MatchError::SelfTrade) => {
                    out.self_trade = true;
                    break;
                }
            };
            out.passive_affected.push(passive.clone());
            out.trades.push(trade);

            let filled = passive.is_filled().then(|| passive.clone());
            self.take(timestamp, size);

            if let Some(order) = filled {
                arena.remove(handle);
                self.orders -= 1;
                out.filled.push(order);
            }
        }

        self.purge_stale(arena);
        aggressor.remaining == 0
    }

    fn take(&mut self, timestamp: u64, size: u64) {
        assert!(size <= self.volume, "level volume underflow at {}", self.price);
        self.volume -= size;

        let bucket = self
            .volume_by_timestamp
            .get_mut(&timestamp)
            .unwrap_or_else(|| panic!("no bucket for timestamp {} at {}", timestamp, self.price));
        assert!(size <= *bucket, "bucket volume underflow at {}", self.price);
        *bucket -= size;
        if *bucket == 0 {
            self.volume_by_timestamp.remove(&timestamp);
        }
    }

    /// Drop stale handles at both ends, and compact once they dominate
    ///
    /// Handles of orders filled in the middle of a pro-rata bucket stay in
    /// the queue as stale entries until then.
    fn purge_stale(&mut self, arena: &OrderArena) {
        while self.queue.front().is_some_and(|h| !arena.contains(*h)) {
            self.queue.pop_front();
        }
        while self.queue.back().is_some_and(|h| !arena.contains(*h)) {
            self.queue.pop_back();
        }
        if self.queue.len() > 2 * self.orders + 32 {
            self.queue.retain(|h| arena.contains(*h));
        }
    }
}
