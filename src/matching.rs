//! Matching core: admission checks, crossing, cancellation, modification.
//!
//! The cross loop always pairs the heads of the two best levels, so trades
//! come out in strict price-time priority. Conditional lifetimes are decided
//! at admission: fill-and-kill must be able to cross at all, fill-or-kill
//! must be fully fillable against the aggregated depth, and market orders
//! are normalised to the side sentinel before entering the limit path.

use tracing::{trace, warn};

use crate::arena::{Arena, OrderNode};
use crate::book::BookState;
use crate::depth::{DepthSnapshot, DepthTracker, LevelAction};
use crate::order::{
    OrderRequest, OrderType, OrderView, Side, Trade, TradeSide, MARKET_BUY_PRICE,
    MARKET_SELL_PRICE,
};

/// Rewrite a market order as a limit order that crosses the whole opposite
/// side. The residual of a partially filled market order rests, so it must
/// not keep the Market type.
fn market_normalize(request: &mut OrderRequest) {
    request.price = match request.side {
        Side::Buy => MARKET_BUY_PRICE,
        Side::Sell => MARKET_SELL_PRICE,
    };
    request.order_type = OrderType::GoodTillCancel;
}

/// The matching core: order pool, resting book and aggregated depth.
///
/// All methods assume external serialisation; the facade holds the mutex.
pub struct Matcher {
    arena: Arena,
    book: BookState,
    depth: DepthTracker,
}

impl Matcher {
    /// Create a matcher with a fixed order-pool capacity
    pub fn new(capacity: u32) -> Self {
        Self {
            arena: Arena::new(capacity),
            book: BookState::with_capacity(capacity as usize),
            depth: DepthTracker::new(),
        }
    }

    /// Admit an inbound order, cross it while prices overlap, and return the
    /// trades it produced.
    ///
    /// Duplicate ids, zero quantities and inadmissible conditional orders
    /// are rejected with an empty trade list and no book mutation.
    pub fn add(&mut self, request: OrderRequest) -> Vec<Trade> {
        if request.qty == 0 {
            trace!(id = request.id, "rejected: zero quantity");
            return Vec::new();
        }
        if self.book.contains(request.id) {
            trace!(id = request.id, "rejected: duplicate order id");
            return Vec::new();
        }

        let mut request = request;
        match request.order_type {
            OrderType::FillAndKill => {
                if !self.can_cross(request.side, request.price) {
                    trace!(id = request.id, "rejected: fill-and-kill cannot cross");
                    return Vec::new();
                }
            }
            OrderType::FillOrKill => {
                if !self.depth.can_fill(request.side, request.price, request.qty) {
                    trace!(id = request.id, "rejected: fill-or-kill not fully fillable");
                    return Vec::new();
                }
            }
            OrderType::Market => market_normalize(&mut request),
            OrderType::GoodTillCancel | OrderType::GoodForDay => {}
        }

        let Some(index) = self.arena.alloc() else {
            warn!(id = request.id, "order pool exhausted, rejecting");
            return Vec::new();
        };
        *self.arena.get_mut(index) = OrderNode::new(
            request.id,
            request.side,
            request.order_type,
            request.price,
            request.qty,
        );
        self.book.insert(&mut self.arena, index);
        self.depth
            .apply(request.price, request.qty, request.side, LevelAction::Add);
        trace!(
            id = request.id,
            side = ?request.side,
            price = request.price,
            qty = request.qty,
            "order admitted"
        );

        let trades = self.match_orders(request.id);
        self.trim_fill_and_kill();
        trades
    }

    /// Remove a resting order and release it. Unknown ids are a no-op.
    pub fn cancel(&mut self, id: u64) {
        let Some(info) = self.book.remove(&mut self.arena, id) else {
            return;
        };
        let remaining = self.arena.get(info.index).remaining_qty;
        self.depth
            .apply(info.price, remaining, info.side, LevelAction::Remove);
        self.arena.free(info.index);
        trace!(id, "order cancelled");
    }

    /// Replace a resting order with a new one carrying the same id and its
    /// inherited lifetime policy. The replacement joins the tail of its new
    /// level: time priority is deliberately reset.
    pub fn modify(&mut self, id: u64, side: Side, price: u64, qty: u32) -> Vec<Trade> {
        let Some(info) = self.book.get(id) else {
            return Vec::new();
        };
        let inherited = self.arena.get(info.index).order_type;
        self.cancel(id);
        self.add(OrderRequest {
            id,
            side,
            order_type: inherited,
            price,
            qty,
        })
    }

    /// Cancel every resting good-for-day order through the standard cancel
    /// path. Returns how many were swept.
    pub fn sweep_day_orders(&mut self) -> usize {
        let arena = &self.arena;
        let expired: Vec<u64> = self
            .book
            .iter_ids()
            .filter(|(_, info)| arena.get(info.index).order_type == OrderType::GoodForDay)
            .map(|(id, _)| id)
            .collect();
        for &id in &expired {
            self.cancel(id);
        }
        expired.len()
    }

    /// Read-only copy of a resting order's fields
    pub fn get_order(&self, id: u64) -> Option<OrderView> {
        let info = self.book.get(id)?;
        let node = self.arena.get(info.index);
        Some(OrderView {
            id: node.order_id,
            side: node.side,
            order_type: node.order_type,
            price: node.price,
            original_qty: node.original_qty,
            remaining_qty: node.remaining_qty,
        })
    }

    /// Number of resting orders
    #[inline]
    pub fn size(&self) -> usize {
        self.book.order_count()
    }

    /// By-value copy of the aggregated depth
    pub fn snapshot(&self) -> DepthSnapshot {
        self.depth.snapshot()
    }

    /// Best bid price, if any
    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.book.best_bid()
    }

    /// Best ask price, if any
    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.book.best_ask()
    }

    /// Pre-fault the order pool's pages
    pub fn warm_up(&mut self) {
        self.arena.warm_up();
    }

    /// Can an order of `side` at `price` cross the opposite best right now?
    fn can_cross(&self, side: Side, price: u64) -> bool {
        match side {
            Side::Buy => self.book.best_ask().is_some_and(|ask| ask <= price),
            Side::Sell => self.book.best_bid().is_some_and(|bid| bid >= price),
        }
    }

    /// Cross the heads of the best levels while bid and ask overlap.
    ///
    /// Within a level the head (oldest arrival) always matches first. The
    /// book never rests crossed, so every trade involves the order admitted
    /// by the current call; the trade price follows its resting counterparty.
    /// A counterparty priced at its market sentinel falls back to the
    /// aggressor's price (degenerate, normalised residue only).
    fn match_orders(&mut self, aggressor: u64) -> Vec<Trade> {
        let mut trades = Vec::new();

        loop {
            let (Some(bid_price), Some(ask_price)) = (self.book.best_bid(), self.book.best_ask())
            else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            let bid_idx = self.book.head_of_best(Side::Buy).expect("bid side has a head");
            let ask_idx = self.book.head_of_best(Side::Sell).expect("ask side has a head");

            let bid = *self.arena.get(bid_idx);
            let ask = *self.arena.get(ask_idx);

            let qty = bid.remaining_qty.min(ask.remaining_qty);
            let price = if bid.order_id == aggressor {
                // Inbound buy lifted the resting ask
                if ask.price == MARKET_SELL_PRICE {
                    bid.price
                } else {
                    ask.price
                }
            } else {
                // Inbound sell hit the resting bid
                if bid.price == MARKET_BUY_PRICE {
                    ask.price
                } else {
                    bid.price
                }
            };

            trades.push(Trade {
                buy: TradeSide {
                    id: bid.order_id,
                    price: bid.price,
                },
                sell: TradeSide {
                    id: ask.order_id,
                    price: ask.price,
                },
                price,
                qty,
            });
            trace!(
                buy = bid.order_id,
                sell = ask.order_id,
                price,
                qty,
                "trade executed"
            );

            self.arena.get_mut(bid_idx).fill(qty);
            self.depth.apply(bid_price, qty, Side::Buy, LevelAction::Match);
            if self.arena.get(bid_idx).is_filled() {
                self.remove_filled(bid.order_id);
            }

            self.arena.get_mut(ask_idx).fill(qty);
            self.depth.apply(ask_price, qty, Side::Sell, LevelAction::Match);
            if self.arena.get(ask_idx).is_filled() {
                self.remove_filled(ask.order_id);
            }
        }

        trades
    }

    /// Drop a fully filled order.
    ///
    /// The Match delta already drained its quantity, so the Remove here
    /// carries the zero remainder: it only decrements the level's count and
    /// erases the level when that reaches zero.
    fn remove_filled(&mut self, id: u64) {
        if let Some(info) = self.book.remove(&mut self.arena, id) {
            self.depth.apply(info.price, 0, info.side, LevelAction::Remove);
            self.arena.free(info.index);
        }
    }

    /// Kill fill-and-kill residue left at the top of either side.
    ///
    /// Only the heads of the two best levels are inspected; an inbound
    /// fill-and-kill that rested deeper than top-of-book is left alone.
    fn trim_fill_and_kill(&mut self) {
        for side in [Side::Buy, Side::Sell] {
            if let Some(index) = self.book.head_of_best(side) {
                let node = self.arena.get(index);
                if node.order_type == OrderType::FillAndKill {
                    let id = node.order_id;
                    self.cancel(id);
                }
            }
        }
    }
}
