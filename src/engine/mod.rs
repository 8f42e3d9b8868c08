//! Matching engine.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: same operations in the same order give the same book,
//!    events and state root
//! 2. **Integer Math**: 256-bit fixed point, truncating division
//! 3. **Synchronous Execution**: every mutation completes before the next
//! 4. **Price-Time Priority**: best price first, then arrival
//!
//! ## Matching Rules
//!
//! - **Bids** match against asks (lowest price first)
//! - **Asks** match against bids (highest price first)
//! - Fills execute at the **resting** order's price
//! - Limit order remainders rest, market order remainders are dropped
//!
//! ## Example
//!
//! ```
//! use tickbook::engine::{Market, MarketInfo, OrderStatus};
//! use tickbook::orderbook::NO_HINT;
//! use tickbook::settlement::RecordingLedger;
//! use tickbook::types::{Address, Ticks};
//!
//! let info = MarketInfo {
//!     id: 0,
//!     base_token: Address::from_low_u64(0xb),
//!     quote_token: Address::from_low_u64(0xc),
//!     ticks: Ticks::from_exponents(0, 0, 0).unwrap(),
//! };
//! let mut market = Market::new(info, RecordingLedger::new());
//!
//! // resting ask: 5 @ 100
//! market.create_limit_order(5, 100, true, Address::from_low_u64(1), NO_HINT).unwrap();
//!
//! // market buy of 3, worst price 100
//! let exec = market.create_market_order(3, 100, false, Address::from_low_u64(2)).unwrap();
//! assert_eq!(exec.status, OrderStatus::Filled);
//! assert_eq!(exec.swaps.len(), 1);
//! assert_eq!(market.get_best_ask().unwrap().amount0, 2u64.into());
//! ```

pub mod market;
pub mod matcher;
pub mod snapshot;

pub use market::{Execution, Market, MarketInfo, OrderStatus};
pub use matcher::{Fill, MatchPlan};
pub use snapshot::SnapshotError;
