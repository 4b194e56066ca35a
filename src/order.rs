//! Order vocabulary: sides, lifetime policies, inbound requests and trades.
//!
//! Prices are fixed-point integers with four decimal places. Market orders
//! carry no meaningful limit price; their working price is normalised to the
//! side sentinel before they enter the matching path.

use serde::Serialize;

/// Fixed-point price scale: 4 decimal places ($100.50 -> 1_005_000).
pub const PRICE_SCALE: u64 = 10_000;

/// Working price a market buy normalises to (crosses any ask).
pub const MARKET_BUY_PRICE: u64 = u64::MAX;

/// Working price a market sell normalises to (crosses any bid).
pub const MARKET_SELL_PRICE: u64 = 0;

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order lifetime policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum OrderType {
    /// Rests in the book until cancelled or fully executed (default)
    #[default]
    GoodTillCancel = 0,
    /// Rests like GTC but is swept at the end of the trading day
    GoodForDay = 1,
    /// Admitted only if it can cross immediately; residual is killed
    FillAndKill = 2,
    /// Admitted only if the full quantity is fillable at once
    FillOrKill = 3,
    /// No limit price; normalised to the side sentinel on admission
    Market = 4,
}

/// An inbound order handed to the book.
#[derive(Clone, Copy, Debug)]
pub struct OrderRequest {
    /// Caller-assigned unique order ID
    pub id: u64,
    /// Order side
    pub side: Side,
    /// Lifetime policy
    pub order_type: OrderType,
    /// Fixed-point limit price (ignored for Market orders)
    pub price: u64,
    /// Order quantity
    pub qty: u32,
}

impl OrderRequest {
    /// Create a good-till-cancel limit order (most common case)
    #[inline]
    pub const fn gtc(id: u64, side: Side, price: u64, qty: u32) -> Self {
        Self {
            id,
            side,
            order_type: OrderType::GoodTillCancel,
            price,
            qty,
        }
    }

    /// Create a good-for-day limit order
    #[inline]
    pub const fn gfd(id: u64, side: Side, price: u64, qty: u32) -> Self {
        Self {
            id,
            side,
            order_type: OrderType::GoodForDay,
            price,
            qty,
        }
    }

    /// Create a fill-and-kill (immediate-or-cancel) order
    #[inline]
    pub const fn fak(id: u64, side: Side, price: u64, qty: u32) -> Self {
        Self {
            id,
            side,
            order_type: OrderType::FillAndKill,
            price,
            qty,
        }
    }

    /// Create a fill-or-kill order
    #[inline]
    pub const fn fok(id: u64, side: Side, price: u64, qty: u32) -> Self {
        Self {
            id,
            side,
            order_type: OrderType::FillOrKill,
            price,
            qty,
        }
    }

    /// Create a market order; the price field is ignored on admission
    #[inline]
    pub const fn market(id: u64, side: Side, qty: u32) -> Self {
        Self {
            id,
            side,
            order_type: OrderType::Market,
            price: 0,
            qty,
        }
    }
}

/// One side of an executed trade: the order's id and its working price at
/// the time of the cross (normalised if the order arrived as Market).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TradeSide {
    pub id: u64,
    pub price: u64,
}

/// A single execution between a buy and a sell order.
///
/// The trade price follows the resting (passive) side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Trade {
    /// Buy-side order id and working price
    pub buy: TradeSide,
    /// Sell-side order id and working price
    pub sell: TradeSide,
    /// Price the trade executed at
    pub price: u64,
    /// Executed quantity
    pub qty: u32,
}

/// Read-only copy of a resting order's fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderView {
    pub id: u64,
    pub side: Side,
    pub order_type: OrderType,
    pub price: u64,
    pub original_qty: u32,
    pub remaining_qty: u32,
}

impl OrderView {
    /// True once the order has no quantity left to fill
    #[inline]
    pub const fn is_filled(&self) -> bool {
        self.remaining_qty == 0
    }
}
