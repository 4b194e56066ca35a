//! Facade over the matching core.
//!
//! One non-reentrant mutex serialises every public mutation together with
//! the pruner's end-of-day sweep. Construction starts the pruner thread;
//! dropping the book signals shutdown and joins it before any owned state
//! is torn down. Snapshots are by-value so readers never inspect depth
//! while holding the lock.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use chrono::NaiveTime;

use crate::depth::DepthSnapshot;
use crate::matching::Matcher;
use crate::order::{OrderRequest, OrderView, Side, Trade};
use crate::pruner::{self, Shutdown};

/// A single-instrument central limit order book.
pub struct OrderBook {
    core: Arc<Mutex<Matcher>>,
    shutdown: Arc<Shutdown>,
    pruner: Option<JoinHandle<()>>,
}

impl OrderBook {
    /// Create a book with the given order-pool capacity; good-for-day
    /// orders are swept at 16:00 local time.
    pub fn new(capacity: u32) -> Self {
        Self::with_close_time(capacity, pruner::default_close())
    }

    /// Create a book whose trading day closes at `close` local time.
    pub fn with_close_time(capacity: u32, close: NaiveTime) -> Self {
        let core = Arc::new(Mutex::new(Matcher::new(capacity)));
        let shutdown = Arc::new(Shutdown::new());

        let pruner = {
            let core = Arc::clone(&core);
            let shutdown = Arc::clone(&shutdown);
            thread::Builder::new()
                .name("gfd-pruner".into())
                .spawn(move || pruner::run(core, shutdown, close))
                .expect("failed to spawn pruner thread")
        };

        Self {
            core,
            shutdown,
            pruner: Some(pruner),
        }
    }

    /// Admit an order and return the trades it produced.
    ///
    /// Duplicate ids, zero quantities and inadmissible conditional orders
    /// return an empty list and leave the book untouched.
    pub fn add_order(&self, request: OrderRequest) -> Vec<Trade> {
        self.core.lock().unwrap().add(request)
    }

    /// Cancel a resting order; unknown ids are a no-op.
    pub fn cancel_order(&self, id: u64) {
        self.core.lock().unwrap().cancel(id);
    }

    /// Cancel-then-add under one lock acquisition: the replacement carries
    /// the same id and the resting order's lifetime policy, and joins the
    /// tail of its new level. Unknown ids return an empty list.
    pub fn modify_order(&self, id: u64, side: Side, price: u64, qty: u32) -> Vec<Trade> {
        self.core.lock().unwrap().modify(id, side, price, qty)
    }

    /// Number of resting orders
    pub fn size(&self) -> usize {
        self.core.lock().unwrap().size()
    }

    /// Consistent point-in-time copy of the aggregated depth
    pub fn snapshot(&self) -> DepthSnapshot {
        self.core.lock().unwrap().snapshot()
    }

    /// Read-only copy of a resting order's fields
    pub fn get_order(&self, id: u64) -> Option<OrderView> {
        self.core.lock().unwrap().get_order(id)
    }

    /// Pre-fault the order pool's pages
    pub fn warm_up(&self) {
        self.core.lock().unwrap().warm_up();
    }
}

impl Drop for OrderBook {
    fn drop(&mut self) {
        self.shutdown.trigger();
        if let Some(handle) = self.pruner.take() {
            let _ = handle.join();
        }
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new(1_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_facade_add_cancel() {
        let book = OrderBook::new(1000);

        let trades = book.add_order(OrderRequest::gtc(1, Side::Buy, 1_000_000, 100));
        assert!(trades.is_empty());
        assert_eq!(book.size(), 1);

        book.cancel_order(1);
        assert_eq!(book.size(), 0);
    }

    #[test]
    fn test_facade_modify() {
        let book = OrderBook::new(1000);

        book.add_order(OrderRequest::gtc(1, Side::Buy, 990_000, 100));
        book.add_order(OrderRequest::gtc(2, Side::Sell, 1_000_000, 100));

        let trades = book.modify_order(1, Side::Buy, 1_000_000, 100);
        assert_eq!(trades.len(), 1);
        assert_eq!(book.size(), 0);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let book = OrderBook::new(1000);
        book.add_order(OrderRequest::gtc(1, Side::Sell, 1_000_000, 300));

        let snap = book.snapshot();
        book.cancel_order(1);

        assert_eq!(snap.asks.len(), 1);
        assert_eq!(snap.asks[0].quantity, 300);
        assert!(book.snapshot().asks.is_empty());
    }

    #[test]
    fn test_drop_joins_pruner_promptly() {
        let start = Instant::now();
        {
            let book = OrderBook::new(100);
            book.add_order(OrderRequest::gfd(1, Side::Buy, 1_000_000, 100));
        }
        // The pruner's deadline is hours away; drop must not wait for it
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
