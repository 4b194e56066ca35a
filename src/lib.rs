//! # Matchbook
//!
//! A deterministic, single-instrument central limit order book.
//!
//! ## Design Principles
//!
//! - **Price-time priority**: better prices match first; within a price,
//!   earlier arrivals match first
//! - **One writer**: a single mutex serialises all mutations, including the
//!   background end-of-day sweep
//! - **O(1) hot path**: arena-allocated orders, intrusive FIFO queues,
//!   incremental depth aggregation
//! - **Total over valid input**: rejected admissions and unknown ids return
//!   empty trade lists, never errors
//!
//! ## Architecture
//!
//! ```text
//! [Caller] --> [OrderBook facade (mutex)] --> [Matcher]
//!                      ^                        |-- Arena (order pool)
//!                      |                        |-- BookState (levels + id index)
//!               [GFD pruner thread]             '-- DepthTracker (aggregates)
//! ```

pub mod arena;
pub mod book;
pub mod depth;
pub mod engine;
pub mod matching;
pub mod order;
pub mod price_level;
pub mod pruner;

// Re-exports for convenience
pub use arena::{Arena, ArenaIndex, OrderNode, NULL_INDEX};
pub use book::{BookState, OrderInfo};
pub use depth::{DepthLevel, DepthSnapshot, DepthTracker, LevelAction};
pub use engine::OrderBook;
pub use matching::Matcher;
pub use order::{
    OrderRequest, OrderType, OrderView, Side, Trade, TradeSide, MARKET_BUY_PRICE,
    MARKET_SELL_PRICE, PRICE_SCALE,
};
pub use price_level::PriceLevel;
pub use pruner::default_close;
