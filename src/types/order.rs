//! Order types for the tickbook engine.
//!
//! ## Amounts
//!
//! `amount0` is the base-asset quantity and `amount1` the quote-asset
//! quantity, both in raw token units (256-bit). The order's price is kept
//! as the caller's `price_base` so that partial fills can recompute
//! `amount1` from the remaining `amount0` without drift.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::types::Address;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Ask (sell base) or Bid (buy base)
///
/// Represented as u8 in router frames:
/// - Bid = 0
/// - Ask = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order - wants to purchase the base asset
    #[default]
    Bid,
    /// Sell order - wants to sell the base asset
    Ask,
}

impl Side {
    pub fn from_is_ask(is_ask: bool) -> Self {
        if is_ask {
            Side::Ask
        } else {
            Side::Bid
        }
    }

    #[inline]
    pub fn is_ask(self) -> bool {
        matches!(self, Side::Ask)
    }

    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Bid => 0,
            Side::Ask => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Bid),
            1 => Some(Side::Ask),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }

    /// True if `price` is strictly better than `other` for a resting order
    /// on this side (lower for asks, higher for bids).
    #[inline]
    pub fn is_better(self, price: u64, other: u64) -> bool {
        match self {
            Side::Ask => price < other,
            Side::Bid => price > other,
        }
    }

    /// True if `price` is strictly worse than `other` on this side.
    #[inline]
    pub fn is_worse(self, price: u64, other: u64) -> bool {
        self.is_better(other, price)
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A limit order owned by the order store.
///
/// ## Example
///
/// ```
/// use tickbook::types::{Address, Order, Side};
///
/// let order = Order::new(1, Address::from_low_u64(7), Side::Bid, 100, 10u64.into(), 10u64.into());
/// assert!(order.active);
/// assert!(!order.is_ask());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Per-market id, strictly increasing, never reused
    pub id: u32,

    /// Account that placed the order
    pub owner: Address,

    pub side: Side,

    /// Limit price in base units (multiply by the price tick for the quote ratio)
    pub price_base: u64,

    /// Remaining base-asset quantity
    pub amount0: U256,

    /// Remaining quote-asset quantity at `price_base`
    pub amount1: U256,

    /// True from creation until fully filled or canceled
    pub active: bool,
}

impl Order {
    pub fn new(
        id: u32,
        owner: Address,
        side: Side,
        price_base: u64,
        amount0: U256,
        amount1: U256,
    ) -> Self {
        Self {
            id,
            owner,
            side,
            price_base,
            amount0,
            amount1,
            active: true,
        }
    }

    #[inline]
    pub fn is_ask(&self) -> bool {
        self.side.is_ask()
    }

    /// Check if the order has nothing left to trade
    pub fn is_filled(&self) -> bool {
        self.amount0.is_zero()
    }

    /// Read-only projection used by the query surface
    pub fn view(&self) -> OrderView {
        OrderView {
            id: self.id,
            owner: self.owner,
            amount0: self.amount0,
            amount1: self.amount1,
        }
    }
}

/// `{id, owner, amount0, amount1}` as returned by best-bid/best-ask queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderView {
    pub id: u32,
    pub owner: Address,
    pub amount0: U256,
    pub amount1: U256,
}

/// Parallel sequences returned by `get_limit_orders`.
///
/// Asks come first in priority order, then bids in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LimitOrders {
    pub ids: Vec<u32>,
    pub owners: Vec<Address>,
    pub amount0s: Vec<U256>,
    pub amount1s: Vec<U256>,
    pub is_asks: Vec<bool>,
}

impl LimitOrders {
    pub fn push(&mut self, order: &Order) {
        self.ids.push(order.id);
        self.owners.push(order.owner);
        self.amount0s.push(order.amount0);
        self.amount1s.push(order.amount1);
        self.is_asks.push(order.is_ask());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
