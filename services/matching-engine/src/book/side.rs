//! One side of an order book
//!
//! Levels are kept in a `BTreeMap` for deterministic iteration. The map key
//! is chosen per side by `SideOrdering` so that the best price is always the
//! first entry: bids are keyed by `Reverse<Price>`, asks by `Price`.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use types::numeric::Price;
use types::order::{Order, Side, TimeInForce};
use types::trade::DepthLevel;

use super::arena::{OrderArena, OrderEntry, OrderHandle};
use super::price_level::{PriceLevel, Uncrossed};
use crate::config::Allocation;
use crate::matching::crossing::incoming_can_match;
use crate::matching::TradeExecutor;

/// Ordering direction of a book side
pub trait SideOrdering: Copy + Default + fmt::Debug {
    const SIDE: Side;
    /// Level key; ascending key order is best-to-worst price order
    type Key: Ord + Copy + fmt::Debug;

    fn key(price: Price) -> Self::Key;
}

/// Buy side: highest price first
#[derive(Debug, Clone, Copy, Default)]
pub struct Bids;

impl SideOrdering for Bids {
    const SIDE: Side = Side::BUY;
    type Key = Reverse<Price>;

    fn key(price: Price) -> Self::Key {
        Reverse(price)
    }
}

/// Sell side: lowest price first
#[derive(Debug, Clone, Copy, Default)]
pub struct Asks;

impl SideOrdering for Asks {
    const SIDE: Side = Side::SELL;
    type Key = Price;

    fn key(price: Price) -> Self::Key {
        price
    }
}

/// Result of admitting an order on a side
#[derive(Debug, Default)]
pub struct Placement {
    pub uncrossed: Uncrossed,
    /// Handle of the remainder if it now rests on the book
    pub resting: Option<OrderHandle>,
    /// FOK order rejected because the crossing volume was insufficient
    pub killed: bool,
}

/// Outcome of the fill-or-kill pre-check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOrKill {
    Fillable,
    Insufficient,
    /// An order of the aggressor's party would be reached first
    SelfTrade,
}

/// Price levels of one side of one market
#[derive(Debug, Clone, Default)]
pub struct OrderBookSide<S: SideOrdering> {
    levels: BTreeMap<S::Key, PriceLevel>,
    /// Sum of level volumes
    volume: u64,
    _side: PhantomData<S>,
}

impl<S: SideOrdering> OrderBookSide<S> {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
            volume: 0,
            _side: PhantomData,
        }
    }

    pub fn side(&self) -> Side {
        S::SIDE
    }

    /// Admit an order belonging to this side
    ///
    /// The opposite side is uncrossed first. A persistent order with
    /// remaining volume then rests here; a non-persistent remainder is left
    /// for the caller to discard.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn add_order<O: SideOrdering>(
        &mut self,
        order: &mut Order,
        arrival: u64,
        opposite: &mut OrderBookSide<O>,
        arena: &mut OrderArena,
        executor: &mut TradeExecutor,
        allocation: Allocation,
    ) -> Placement {
        assert_eq!(order.side, S::SIDE, "order routed to the wrong side");
        assert_eq!(O::SIDE, S::SIDE.opposite(), "sides must be opposite");

        if order.time_in_force == TimeInForce::FOK {
            match opposite.fill_or_kill(order, arena, allocation) {
                FillOrKill::Fillable => {}
                FillOrKill::Insufficient => {
                    return Placement {
                        killed: true,
                        ..Placement::default()
                    };
                }
                FillOrKill::SelfTrade => {
                    let mut placement = Placement::default();
                    placement.uncrossed.self_trade = true;
                    return placement;
                }
            }
        }

        let uncrossed = opposite.uncross(order, arena, executor, allocation);

        let resting = (order.is_persistent() && order.remaining > 0 && !uncrossed.self_trade)
            .then(|| self.rest(order, arrival, arena));

        Placement {
            uncrossed,
            resting,
            killed: false,
        }
    }

    /// Put `order` on the book at its own price
    pub(crate) fn rest(&mut self, order: &Order, arrival: u64, arena: &mut OrderArena) -> OrderHandle {
        let handle = arena.insert(OrderEntry {
            order: order.clone(),
            arrival,
        });
        self.levels
            .entry(S::key(order.price))
            .or_insert_with(|| PriceLevel::new(S::SIDE, order.price))
            .add_order(handle, order);
        self.volume = self
            .volume
            .checked_add(order.remaining)
            .unwrap_or_else(|| panic!("{:?} side volume overflow", S::SIDE));
        handle
    }

    /// Match an aggressor from the opposite side against this side
    ///
    /// Levels are walked best to worst while they cross the aggressor's
    /// limit. Emptied levels are deleted as they are passed. Matching stops
    /// at the first order of the aggressor's own party.
    pub(crate) fn uncross(
        &mut self,
        aggressor: &mut Order,
        arena: &mut OrderArena,
        executor: &mut TradeExecutor,
        allocation: Allocation,
    ) -> Uncrossed {
        let mut out = Uncrossed::default();

        while aggressor.remaining > 0 {
            let Some(mut best) = self.levels.first_entry() else {
                break;
            };
            if !incoming_can_match(aggressor.side, aggressor.price, best.get().price()) {
                break;
            }

            let traded = out.trades.len();
            let filled = best.get_mut().uncross(aggressor, arena, executor, allocation, &mut out);
            let size: u64 = out.trades[traded..].iter().map(|t| t.size).sum();
            self.volume -= size;
            if best.get().is_empty() {
                best.remove();
            }
            if filled || out.self_trade {
                break;
            }
        }

        out
    }

    /// Detach a resting order, deleting its level if emptied
    ///
    /// # Panics
    /// Panics if the handle is stale or no level exists at the order's price.
    pub(crate) fn remove_order(&mut self, handle: OrderHandle, arena: &mut OrderArena) -> Order {
        let price = arena
            .get(handle)
            .map(|entry| entry.order.price)
            .unwrap_or_else(|| panic!("stale handle removed from {:?} side", S::SIDE));
        let key = S::key(price);
        let level = self
            .levels
            .get_mut(&key)
            .unwrap_or_else(|| panic!("no {:?} level at {}", S::SIDE, price));

        let order = level.remove_order(handle, arena);
        self.volume -= order.remaining;
        if level.is_empty() {
            self.levels.remove(&key);
        }
        order
    }

    /// Reduce a resting order's remaining in place
    pub(crate) fn reduce_order(&mut self, handle: OrderHandle, remaining: u64, arena: &mut OrderArena) -> Order {
        let (price, before) = arena
            .get(handle)
            .map(|entry| (entry.order.price, entry.order.remaining))
            .unwrap_or_else(|| panic!("stale handle amended on {:?} side", S::SIDE));
        let order = self
            .levels
            .get_mut(&S::key(price))
            .unwrap_or_else(|| panic!("no {:?} level at {}", S::SIDE, price))
            .reduce_order(handle, remaining, arena);
        self.volume -= before - order.remaining;
        order
    }

    /// Whether `aggressor` could be filled in full against this side
    ///
    /// Orders are visited in matching order until enough volume is found.
    /// In pro-rata mode the scan runs to the end of the last timestamp
    /// bucket it enters, since every order in that bucket may take a share.
    pub fn fill_or_kill(&self, aggressor: &Order, arena: &OrderArena, allocation: Allocation) -> FillOrKill {
        let needed = aggressor.remaining;
        let mut total: u64 = 0;

        for level in self.levels.values() {
            if !incoming_can_match(aggressor.side, aggressor.price, level.price()) {
                break;
            }
            let mut last_bucket = None;
            for entry in level.entries(arena) {
                let order = &entry.order;
                if total >= needed
                    && (allocation == Allocation::PriceTime || last_bucket != Some(order.timestamp))
                {
                    return FillOrKill::Fillable;
                }
                if order.party == aggressor.party {
                    return FillOrKill::SelfTrade;
                }
                total = total.saturating_add(order.remaining);
                last_bucket = Some(order.timestamp);
            }
            if total >= needed {
                return FillOrKill::Fillable;
            }
        }

        FillOrKill::Insufficient
    }

    pub fn best_price(&self) -> Option<Price> {
        self.levels.values().next().map(PriceLevel::price)
    }

    pub fn best_price_and_volume(&self) -> Option<(Price, u64)> {
        self.levels
            .values()
            .next()
            .map(|level| (level.price(), level.volume()))
    }

    /// Levels from best to worst
    pub fn levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.levels.values()
    }

    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&S::key(price))
    }

    pub fn volume_at(&self, price: Price) -> u64 {
        self.level(price).map_or(0, PriceLevel::volume)
    }

    /// Top `depth` levels, best first
    pub fn depth(&self, depth: usize) -> Vec<DepthLevel> {
        self.levels
            .values()
            .take(depth)
            .map(|level| DepthLevel {
                price: level.price(),
                volume: level.volume(),
                orders: level.order_count(),
            })
            .collect()
    }

    pub fn total_volume(&self) -> u64 {
        self.volume
    }

    pub fn order_count(&self) -> usize {
        self.levels.values().map(PriceLevel::order_count).sum()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
