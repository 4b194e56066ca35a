//! Book state: side-keyed price level maps plus the order id index.
//!
//! Bids and asks are ordered maps from price to a FIFO level, so the best
//! price on each side is the edge key. The id index maps every resting order
//! to its arena slot and the level that holds it; together they give O(1)
//! cancellation from any position in any queue.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::arena::{Arena, ArenaIndex, NULL_INDEX};
use crate::order::Side;
use crate::price_level::PriceLevel;

/// Where a resting order lives: its arena slot and the level holding it.
#[derive(Clone, Copy, Debug)]
pub struct OrderInfo {
    /// Arena slot of the order node; also its position in the level queue
    pub index: ArenaIndex,
    /// Side whose map holds the level
    pub side: Side,
    /// Working price keying the level
    pub price: u64,
}

/// Resting-order state: two ordered side maps and the id index.
///
/// Every id in the index refers to a node linked into exactly one level
/// reachable through `bids` or `asks`, and a level exists only while it has
/// at least one order.
#[derive(Default)]
pub struct BookState {
    bids: BTreeMap<u64, PriceLevel>,
    asks: BTreeMap<u64, PriceLevel>,
    index: FxHashMap<u64, OrderInfo>,
}

impl BookState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the id index for the expected number of live orders
    pub fn with_capacity(orders: usize) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: FxHashMap::with_capacity_and_hasher(orders, Default::default()),
        }
    }

    /// Best bid price (highest), if any
    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.last_key_value().map(|(price, _)| *price)
    }

    /// Best ask price (lowest), if any
    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.first_key_value().map(|(price, _)| *price)
    }

    /// Best price on the given side
    #[inline]
    pub fn best_price(&self, side: Side) -> Option<u64> {
        match side {
            Side::Buy => self.best_bid(),
            Side::Sell => self.best_ask(),
        }
    }

    /// Head order of the best level on a side, if the side is non-empty
    #[inline]
    pub fn head_of_best(&self, side: Side) -> Option<ArenaIndex> {
        let level = match side {
            Side::Buy => self.bids.last_key_value().map(|(_, level)| level),
            Side::Sell => self.asks.first_key_value().map(|(_, level)| level),
        };
        level
            .map(|level| level.peek_head())
            .filter(|&index| index != NULL_INDEX)
    }

    /// The level at `price` on `side`, if present
    #[inline]
    pub fn level(&self, side: Side, price: u64) -> Option<&PriceLevel> {
        match side {
            Side::Buy => self.bids.get(&price),
            Side::Sell => self.asks.get(&price),
        }
    }

    /// True if `id` is resting in the book
    #[inline]
    pub fn contains(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    /// Location of a resting order
    #[inline]
    pub fn get(&self, id: u64) -> Option<&OrderInfo> {
        self.index.get(&id)
    }

    /// Insert an already-populated node at the tail of its side/price level,
    /// creating the level if absent, and register it in the id index.
    ///
    /// The caller has already rejected duplicate ids.
    pub fn insert(&mut self, arena: &mut Arena, index: ArenaIndex) {
        let node = arena.get(index);
        let (id, side, price) = (node.order_id, node.side, node.price);
        debug_assert!(!self.index.contains_key(&id), "duplicate id reached insert");

        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        levels
            .entry(price)
            .or_insert_with(PriceLevel::new)
            .push_back(arena, index);

        self.index.insert(id, OrderInfo { index, side, price });
    }

    /// Unlink an order from its level (erasing the level if it empties) and
    /// drop it from the id index. Returns where it lived, or `None` for an
    /// unknown id. The arena slot is not released; the caller owns that.
    pub fn remove(&mut self, arena: &mut Arena, id: u64) -> Option<OrderInfo> {
        let info = self.index.remove(&id)?;

        let levels = match info.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = levels.get_mut(&info.price) {
            let now_empty = level.remove(arena, info.index);
            if now_empty {
                levels.remove(&info.price);
            }
        }

        Some(info)
    }

    /// Number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// Number of bid levels
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of ask levels
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// True if no orders rest on either side
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterate over every resting order's id and location
    pub fn iter_ids(&self) -> impl Iterator<Item = (u64, &OrderInfo)> + '_ {
        self.index.iter().map(|(id, info)| (*id, info))
    }
}
