//! Depth aggregation: per-side price to (quantity, order count) mappings.
//!
//! The tracker is mutated only through incremental deltas emitted by the
//! matching paths, never rebuilt from the book, so top-of-book queries and
//! snapshots are O(1) and O(levels) respectively. Fill-or-kill admission
//! walks these aggregates instead of per-order queues.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::order::Side;

/// Delta kind applied to one price level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelAction {
    /// A new order joined the level: count +1, quantity +qty
    Add,
    /// An order left the level: count -1, quantity -qty (its remainder)
    Remove,
    /// An order was partially consumed in place: quantity -qty only
    Match,
}

/// Aggregate state of one price level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DepthLevel {
    /// Level price
    pub price: u64,
    /// Sum of remaining quantities across the level's orders
    pub quantity: u64,
    /// Number of orders at the level
    pub count: u32,
}

/// Point-in-time copy of the aggregated book.
///
/// Bids are ordered best-first (descending), asks best-first (ascending).
/// Levels with no orders do not appear.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DepthSnapshot {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

impl DepthSnapshot {
    /// Best (highest) bid level, if any
    pub fn best_bid(&self) -> Option<&DepthLevel> {
        self.bids.first()
    }

    /// Best (lowest) ask level, if any
    pub fn best_ask(&self) -> Option<&DepthLevel> {
        self.asks.first()
    }
}

/// Incrementally maintained depth-of-book for both sides.
#[derive(Clone, Debug, Default)]
pub struct DepthTracker {
    bids: BTreeMap<u64, DepthLevel>,
    asks: BTreeMap<u64, DepthLevel>,
}

impl DepthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one delta to the level at `price`.
    ///
    /// A non-Add action against an absent level is a no-op: the matcher's
    /// fill path can clear a level before a trailing delta arrives for it,
    /// and that delta must not resurrect the entry.
    pub fn apply(&mut self, price: u64, qty: u32, side: Side, action: LevelAction) {
        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };

        if action != LevelAction::Add && !levels.contains_key(&price) {
            return;
        }

        let emptied = {
            let level = levels.entry(price).or_insert(DepthLevel {
                price,
                quantity: 0,
                count: 0,
            });

            match action {
                LevelAction::Add => {
                    level.count += 1;
                    level.quantity += u64::from(qty);
                }
                LevelAction::Remove => {
                    debug_assert!(level.count > 0, "remove from empty level");
                    debug_assert!(level.quantity >= u64::from(qty), "level quantity underflow");
                    level.count -= 1;
                    level.quantity -= u64::from(qty);
                }
                LevelAction::Match => {
                    debug_assert!(level.quantity >= u64::from(qty), "level quantity underflow");
                    level.quantity -= u64::from(qty);
                }
            }

            level.count == 0
        };

        if emptied {
            levels.remove(&price);
        }
    }

    /// Aggregate state at one price, if the level exists
    pub fn level(&self, side: Side, price: u64) -> Option<&DepthLevel> {
        match side {
            Side::Buy => self.bids.get(&price),
            Side::Sell => self.asks.get(&price),
        }
    }

    /// Number of non-empty levels on a side
    pub fn level_count(&self, side: Side) -> usize {
        match side {
            Side::Buy => self.bids.len(),
            Side::Sell => self.asks.len(),
        }
    }

    /// Can an inbound order of `side`/`price`/`qty` be filled completely
    /// against the opposite side right now?
    ///
    /// Walks opposite levels in price priority, summing aggregate quantity
    /// at admissible prices until the target is reached or the limit is
    /// crossed. O(levels touched), independent of per-level order counts.
    pub fn can_fill(&self, side: Side, price: u64, qty: u32) -> bool {
        let mut need = u64::from(qty);
        match side {
            Side::Buy => {
                for (ask_price, level) in &self.asks {
                    if *ask_price > price {
                        break;
                    }
                    need = need.saturating_sub(level.quantity);
                    if need == 0 {
                        return true;
                    }
                }
            }
            Side::Sell => {
                for (bid_price, level) in self.bids.iter().rev() {
                    if *bid_price < price {
                        break;
                    }
                    need = need.saturating_sub(level.quantity);
                    if need == 0 {
                        return true;
                    }
                }
            }
        }
        need == 0
    }

    /// By-value copy of both sides, best-first.
    pub fn snapshot(&self) -> DepthSnapshot {
        DepthSnapshot {
            bids: self.bids.values().rev().copied().collect(),
            asks: self.asks.values().copied().collect(),
        }
    }
}
