//! Price level: a FIFO queue of resting orders at a single price.
//!
//! The queue is a doubly linked list threaded through the `prev`/`next`
//! fields of arena-resident order nodes. Arrival order is preserved, and a
//! stored arena index stays a valid position across insertions and erasures
//! of unrelated orders, which is what the id index relies on.

use crate::arena::{Arena, ArenaIndex, NULL_INDEX};

/// FIFO queue of orders at one price (price-time priority within a level).
#[derive(Clone, Copy, Debug, Default)]
pub struct PriceLevel {
    /// Oldest order, first to match
    head: ArenaIndex,
    /// Newest order, last to match
    tail: ArenaIndex,
    /// Number of queued orders
    len: u32,
}

impl PriceLevel {
    /// Create a new empty level
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: NULL_INDEX,
            tail: NULL_INDEX,
            len: 0,
        }
    }

    /// True if there are no orders at this level
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of orders queued at this level
    #[inline]
    pub const fn len(&self) -> u32 {
        self.len
    }

    /// Index of the head order, or `NULL_INDEX` if empty
    #[inline]
    pub const fn peek_head(&self) -> ArenaIndex {
        self.head
    }

    /// Append an order at the tail (loses time priority to earlier arrivals).
    ///
    /// O(1).
    #[inline]
    pub fn push_back(&mut self, arena: &mut Arena, index: ArenaIndex) {
        if self.tail == NULL_INDEX {
            debug_assert!(self.head == NULL_INDEX);
            self.head = index;
            self.tail = index;
            let node = arena.get_mut(index);
            node.prev = NULL_INDEX;
            node.next = NULL_INDEX;
        } else {
            arena.get_mut(self.tail).next = index;
            let node = arena.get_mut(index);
            node.prev = self.tail;
            node.next = NULL_INDEX;
            self.tail = index;
        }

        self.len += 1;
    }

    /// Detach and return the head order, or `None` if empty.
    ///
    /// The node is not released back to the arena; the caller owns that.
    /// O(1).
    #[inline]
    pub fn pop_front(&mut self, arena: &mut Arena) -> Option<ArenaIndex> {
        if self.head == NULL_INDEX {
            return None;
        }

        let index = self.head;
        let next_idx = arena.get(index).next;

        if next_idx == NULL_INDEX {
            self.head = NULL_INDEX;
            self.tail = NULL_INDEX;
        } else {
            self.head = next_idx;
            arena.get_mut(next_idx).prev = NULL_INDEX;
        }

        self.len -= 1;

        let node = arena.get_mut(index);
        node.prev = NULL_INDEX;
        node.next = NULL_INDEX;

        Some(index)
    }

    /// Detach an order from any position (cancel path).
    ///
    /// Returns `true` if the level is now empty. The node is not released
    /// back to the arena; the caller owns that. O(1).
    #[inline]
    pub fn remove(&mut self, arena: &mut Arena, index: ArenaIndex) -> bool {
        let node = arena.get(index);
        let prev_idx = node.prev;
        let next_idx = node.next;

        if prev_idx == NULL_INDEX && next_idx == NULL_INDEX {
            // Only order at this level
            debug_assert!(self.head == index && self.tail == index);
            self.head = NULL_INDEX;
            self.tail = NULL_INDEX;
        } else if prev_idx == NULL_INDEX {
            debug_assert!(self.head == index);
            self.head = next_idx;
            arena.get_mut(next_idx).prev = NULL_INDEX;
        } else if next_idx == NULL_INDEX {
            debug_assert!(self.tail == index);
            self.tail = prev_idx;
            arena.get_mut(prev_idx).next = NULL_INDEX;
        } else {
            arena.get_mut(prev_idx).next = next_idx;
            arena.get_mut(next_idx).prev = prev_idx;
        }

        self.len -= 1;

        let node = arena.get_mut(index);
        node.prev = NULL_INDEX;
        node.next = NULL_INDEX;

        self.len == 0
    }

    /// Iterate arena indices from head to tail in arrival order.
    pub fn iter<'a>(&self, arena: &'a Arena) -> LevelIter<'a> {
        LevelIter {
            arena,
            current: self.head,
        }
    }
}

/// Head-to-tail iterator over the orders queued at a level.
pub struct LevelIter<'a> {
    arena: &'a Arena,
    current: ArenaIndex,
}

impl Iterator for LevelIter<'_> {
    type Item = ArenaIndex;

    fn next(&mut self) -> Option<ArenaIndex> {
        if self.current == NULL_INDEX {
            return None;
        }
        let index = self.current;
        self.current = self.arena.get(index).next;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderType, Side};

    fn queue_orders(arena: &mut Arena, level: &mut PriceLevel, count: u32) -> Vec<ArenaIndex> {
        let mut indices = Vec::new();
        for i in 0..count {
            let idx = arena.alloc().unwrap();
            *arena.get_mut(idx) =
                crate::arena::OrderNode::new(i as u64, Side::Buy, OrderType::GoodTillCancel, 1_000_000, 100);
            level.push_back(arena, idx);
            indices.push(idx);
        }
        indices
    }

    #[test]
    fn test_empty_level() {
        let level = PriceLevel::new();
        assert!(level.is_empty());
        assert_eq!(level.len(), 0);
        assert_eq!(level.peek_head(), NULL_INDEX);
    }

    #[test]
    fn test_push_preserves_arrival_order() {
        let mut arena = Arena::new(10);
        let mut level = PriceLevel::new();
        let indices = queue_orders(&mut arena, &mut level, 3);

        assert_eq!(level.len(), 3);
        assert_eq!(level.peek_head(), indices[0]);

        // Verify linkage
        assert_eq!(arena.get(indices[0]).next, indices[1]);
        assert_eq!(arena.get(indices[1]).prev, indices[0]);
        assert_eq!(arena.get(indices[1]).next, indices[2]);
        assert_eq!(arena.get(indices[2]).prev, indices[1]);

        let walked: Vec<_> = level.iter(&arena).collect();
        assert_eq!(walked, indices);
    }

    #[test]
    fn test_pop_front() {
        let mut arena = Arena::new(10);
        let mut level = PriceLevel::new();
        let indices = queue_orders(&mut arena, &mut level, 3);

        assert_eq!(level.pop_front(&mut arena), Some(indices[0]));
        assert_eq!(level.len(), 2);
        assert_eq!(level.peek_head(), indices[1]);
        assert_eq!(arena.get(indices[1]).prev, NULL_INDEX);

        assert_eq!(level.pop_front(&mut arena), Some(indices[1]));
        assert_eq!(level.pop_front(&mut arena), Some(indices[2]));
        assert!(level.is_empty());

        assert!(level.pop_front(&mut arena).is_none());
    }

    #[test]
    fn test_remove_only_order() {
        let mut arena = Arena::new(10);
        let mut level = PriceLevel::new();
        let indices = queue_orders(&mut arena, &mut level, 1);

        assert!(level.remove(&mut arena, indices[0]));
        assert!(level.is_empty());
        assert_eq!(level.peek_head(), NULL_INDEX);
    }

    #[test]
    fn test_remove_head() {
        let mut arena = Arena::new(10);
        let mut level = PriceLevel::new();
        let indices = queue_orders(&mut arena, &mut level, 3);

        assert!(!level.remove(&mut arena, indices[0]));
        assert_eq!(level.len(), 2);
        assert_eq!(level.peek_head(), indices[1]);
        assert_eq!(arena.get(indices[1]).prev, NULL_INDEX);
    }

    #[test]
    fn test_remove_tail() {
        let mut arena = Arena::new(10);
        let mut level = PriceLevel::new();
        let indices = queue_orders(&mut arena, &mut level, 3);

        assert!(!level.remove(&mut arena, indices[2]));
        assert_eq!(level.len(), 2);
        assert_eq!(arena.get(indices[1]).next, NULL_INDEX);
    }

    #[test]
    fn test_remove_middle_keeps_neighbours_linked() {
        let mut arena = Arena::new(10);
        let mut level = PriceLevel::new();
        let indices = queue_orders(&mut arena, &mut level, 3);

        assert!(!level.remove(&mut arena, indices[1]));
        assert_eq!(level.len(), 2);
        assert_eq!(arena.get(indices[0]).next, indices[2]);
        assert_eq!(arena.get(indices[2]).prev, indices[0]);

        // Positions of unrelated orders stay valid after the erase
        let walked: Vec<_> = level.iter(&arena).collect();
        assert_eq!(walked, vec![indices[0], indices[2]]);
    }
}
