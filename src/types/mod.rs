//! Core data types for tickbook
//!
//! ## Types
//!
//! - [`Order`]: A limit order owned by the order store
//! - [`Side`]: Ask or Bid
//! - [`Address`]: 20-byte account/token address
//! - [`Ticks`]: Market quantization constants
//! - [`Event`], [`Swap`]: Emitted events
//! - [`BatchReceipt`], [`ElementOutcome`]: Router frame results
//!
//! ## Amounts
//!
//! Caller inputs are `u64` base units; stored token quantities are 256-bit
//! ([`primitive_types::U256`]).

mod address;
mod event;
mod order;
mod receipt;
pub mod ticks;
pub mod units;

pub use address::Address;
pub use event::{Event, Swap};
pub use order::{LimitOrders, Order, OrderView, Side};
pub use receipt::{BatchReceipt, ElementOutcome, ElementStatus};
pub use ticks::Ticks;
pub use primitive_types::U256;
