//! Behaviour of the good-for-day sweep around the configured close of day.

use std::time::{Duration, Instant};

use chrono::Local;

use matchbook::{OrderBook, OrderRequest, Side, PRICE_SCALE};

/// Wait until `predicate` holds, or fail after `timeout`.
fn wait_for(timeout: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    predicate()
}

#[test]
fn test_day_orders_swept_at_close() {
    // A close a moment from now stands in for 16:00
    let close = (Local::now() + chrono::Duration::milliseconds(500)).time();
    let book = OrderBook::with_close_time(1000, close);

    book.add_order(OrderRequest::gfd(1, Side::Buy, 100 * PRICE_SCALE, 100));
    book.add_order(OrderRequest::gtc(2, Side::Buy, 99 * PRICE_SCALE, 100));
    book.add_order(OrderRequest::gfd(3, Side::Sell, 110 * PRICE_SCALE, 100));
    assert_eq!(book.size(), 3);

    assert!(
        wait_for(Duration::from_secs(15), || book.size() == 1),
        "good-for-day orders were not swept"
    );

    assert!(book.get_order(1).is_none());
    assert!(book.get_order(3).is_none());
    let survivor = book.get_order(2).expect("good-till-cancel order was swept");
    assert_eq!(survivor.remaining_qty, 100);

    // Depth reflects the sweep through the standard cancel path
    let snap = book.snapshot();
    assert_eq!(snap.bids.len(), 1);
    assert_eq!(snap.bids[0].price, 99 * PRICE_SCALE);
    assert!(snap.asks.is_empty());
}

#[test]
fn test_shutdown_wins_over_distant_deadline() {
    // Deadline far away: teardown must not wait for it
    let close = (Local::now() + chrono::Duration::hours(6)).time();
    let start = Instant::now();
    {
        let book = OrderBook::with_close_time(1000, close);
        book.add_order(OrderRequest::gfd(1, Side::Buy, 100 * PRICE_SCALE, 100));
    }
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_orders_added_after_sweep_survive_until_next_close() {
    let close = (Local::now() + chrono::Duration::milliseconds(300)).time();
    let book = OrderBook::with_close_time(1000, close);

    book.add_order(OrderRequest::gfd(1, Side::Buy, 100 * PRICE_SCALE, 100));
    assert!(
        wait_for(Duration::from_secs(15), || book.size() == 0),
        "good-for-day order was not swept"
    );

    // The next deadline is a day away; a fresh day order rests undisturbed
    book.add_order(OrderRequest::gfd(4, Side::Buy, 100 * PRICE_SCALE, 100));
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(book.size(), 1);
}
