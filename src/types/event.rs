//! Events emitted by a market for settlement and indexing collaborators.
//!
//! Every committed mutation appends its events to the market's buffer in the
//! order they happened; hosts drain them with
//! [`Market::take_events`](crate::engine::Market::take_events).

use primitive_types::U256;
use serde::Serialize;

use crate::types::Address;

/// A single fill between a resting order and an incoming order.
///
/// ## Price Discovery
///
/// The fill always executes at the resting order's price. `amount1` is the
/// quote amount released by the resting order for this fill.
///
/// ## Example
///
/// ```
/// use tickbook::types::{Address, Swap};
///
/// let swap = Swap::new(3u64.into(), 300u64.into(), 1, Address::from_low_u64(1), 2, Address::from_low_u64(2));
/// assert_eq!(swap.ask_id, 1);
/// assert_eq!(swap.bid_id, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Swap {
    /// Base quantity exchanged
    pub amount0: U256,

    /// Quote quantity exchanged
    pub amount1: U256,

    pub ask_id: u32,
    pub ask_owner: Address,
    pub bid_id: u32,
    pub bid_owner: Address,
}

impl Swap {
    pub fn new(
        amount0: U256,
        amount1: U256,
        ask_id: u32,
        ask_owner: Address,
        bid_id: u32,
        bid_owner: Address,
    ) -> Self {
        Self {
            amount0,
            amount1,
            ask_id,
            ask_owner,
            bid_id,
            bid_owner,
        }
    }
}

/// Events a market emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum Event {
    /// A limit order was accepted. Amounts are the full requested size,
    /// before any immediate fill.
    LimitOrderCreated {
        id: u32,
        owner: Address,
        amount0: U256,
        amount1: U256,
        is_ask: bool,
    },

    /// `id` was replaced by `new_id` with the new amounts.
    LimitOrderUpdated {
        id: u32,
        new_id: u32,
        owner: Address,
        new_amount0: U256,
        new_amount1: U256,
        is_ask: bool,
    },

    /// A resting order was canceled. Amounts are what was left unfilled.
    LimitOrderCanceled {
        id: u32,
        owner: Address,
        amount0: U256,
        amount1: U256,
        is_ask: bool,
    },

    /// A market order was accepted. Amounts are the requested worst-case size.
    MarketOrderCreated {
        id: u32,
        owner: Address,
        amount0: U256,
        amount1: U256,
        is_ask: bool,
    },

    Swap(Swap),
}

impl Event {
    /// The swap carried by this event, if any
    pub fn as_swap(&self) -> Option<&Swap> {
        match self {
            Event::Swap(swap) => Some(swap),
            _ => None,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
