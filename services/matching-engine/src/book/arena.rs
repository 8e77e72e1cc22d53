//! Order storage owned by one book
//!
//! Resting orders live in a slot arena. Price levels keep `OrderHandle`s
//! instead of references; a handle carries the slot generation, so once an
//! order is removed every copy of its handle goes stale and is simply
//! skipped.

use types::order::Order;

/// Stable reference to a resting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderHandle {
    index: usize,
    generation: u64,
}

/// A resting order plus its placement metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEntry {
    pub order: Order,
    /// Admission sequence of the order within its book; orders in a level
    /// queue are sorted by it
    pub arrival: u64,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u64,
    entry: Option<OrderEntry>,
}

/// Slot arena with generational handles and a LIFO free list
#[derive(Debug, Clone, Default)]
pub struct OrderArena {
    slots: Vec<Slot>,
    free: Vec<usize>,
    len: usize,
}

impl OrderArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: OrderEntry) -> OrderHandle {
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.entry = Some(entry);
                OrderHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                OrderHandle {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    pub fn get(&self, handle: OrderHandle) -> Option<&OrderEntry> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    pub fn get_mut(&mut self, handle: OrderHandle) -> Option<&mut OrderEntry> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    pub fn contains(&self, handle: OrderHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Remove the entry and invalidate every copy of `handle`
    pub fn remove(&mut self, handle: OrderHandle) -> Option<OrderEntry> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation += 1;
        self.free.push(handle.index);
        self.len -= 1;
        Some(entry)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
