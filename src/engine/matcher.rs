//! Fill planning.
//!
//! Matching is split in two: [`plan`] walks the opposite side and works out
//! every fill without touching the book, then the market settles the plan
//! with its ledger and commits it. A plan that cannot be settled, or that
//! would leave the book crossed, is dropped and the book is unchanged.
//!
//! ## Price Discovery
//!
//! Fills execute at the resting order's price. The quote amount of a fill is
//! the decrease of the resting order's `amount1`, so over the life of a
//! resting order its fills sum exactly to the quote amount it was created
//! with.

use primitive_types::U256;

use crate::error::{BookError, Result};
use crate::orderbook::{BookIndex, OrderStore};
use crate::types::{Address, Side, Ticks};

/// One planned fill against a resting order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub resting_id: u32,
    pub resting_owner: Address,

    /// Base quantity exchanged
    pub amount0: U256,

    /// Quote quantity exchanged, at the resting price
    pub amount1: U256,

    /// Resting order's amounts after the fill
    pub remaining0: U256,
    pub remaining1: U256,

    /// The resting order leaves the book after this fill
    pub closes: bool,

    /// Base tokens returned to a closing ask whose leftover is too small to
    /// be worth any quote
    pub dust0: U256,
}

/// Outcome of walking the opposite side for an incoming order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchPlan {
    pub fills: Vec<Fill>,

    /// Sum of `amount0` over fills
    pub filled0: U256,

    /// Sum of `amount1` over fills
    pub filled1: U256,

    /// Incoming quantity left after the walk
    pub remaining0: U256,

    /// Price of the first opposite order left untouched, if any
    pub stop_price: Option<u64>,
}

impl MatchPlan {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }
}

/// True if an incoming order on `taker` side with price bound `limit`
/// accepts a resting order at `resting_price`.
#[inline]
pub fn crosses(taker: Side, limit: u64, resting_price: u64) -> bool {
    match taker {
        Side::Bid => resting_price <= limit,
        Side::Ask => resting_price >= limit,
    }
}

/// Plan the fills of an incoming order of `amount0` on `taker` side.
///
/// `limit` is the limit price for limit orders and the worst acceptable
/// price for market orders; both cross the same way.
pub fn plan(
    store: &OrderStore,
    index: &BookIndex,
    ticks: &Ticks,
    taker: Side,
    limit: u64,
    amount0: U256,
) -> Result<MatchPlan> {
    let mut plan = MatchPlan {
        remaining0: amount0,
        ..MatchPlan::default()
    };

    for resting in index.iter(taker.opposite(), store) {
        if plan.remaining0.is_zero() || !crosses(taker, limit, resting.price_base) {
            plan.stop_price = Some(resting.price_base);
            break;
        }

        let fill0 = plan.remaining0.min(resting.amount0);
        let mut remaining0 = resting.amount0 - fill0;
        let mut remaining1 = if remaining0.is_zero() {
            U256::zero()
        } else {
            ticks
                .quote_for(remaining0, resting.price_base)
                .ok_or(BookError::InvalidQuantity {
                    amount0_base: 0,
                    price_base: resting.price_base,
                })?
        };

        // a leftover that is worth no quote cannot stay on the book
        let mut dust0 = U256::zero();
        if !remaining0.is_zero() && remaining1.is_zero() {
            if resting.side == Side::Ask {
                dust0 = remaining0;
            }
            remaining0 = U256::zero();
            remaining1 = U256::zero();
        }

        let fill1 = resting.amount1.saturating_sub(remaining1);

        plan.fills.push(Fill {
            resting_id: resting.id,
            resting_owner: resting.owner,
            amount0: fill0,
            amount1: fill1,
            remaining0,
            remaining1,
            closes: remaining0.is_zero(),
            dust0,
        });
        plan.filled0 = plan.filled0.saturating_add(fill0);
        plan.filled1 = plan.filled1.saturating_add(fill1);
        plan.remaining0 = plan.remaining0 - fill0;
    }

    Ok(plan)
}

// ============================================================================
// Unit Tests
// ============================================================================
