//! # tickbook
//!
//! Price-time priority limit order books over 256-bit token amounts.
//!
//! ## Architecture
//!
//! - **Types**: orders, events, tick quantization, unit conversion
//! - **OrderBook**: slab-backed order store and a hint-assisted sorted index
//! - **Engine**: plan-then-commit matching, the per-market surface and its
//!   state root
//! - **Settlement**: the [`Ledger`](settlement::Ledger) a market pays and
//!   collects through
//! - **Router**: market registry and compact calldata frames
//!
//! ## Design Principles
//!
//! 1. **Determinism**: the same operations produce the same book, events and
//!    state root
//! 2. **No Floating Point**: amounts are `U256`, quantized by power-of-ten
//!    ticks with truncating division
//! 3. **Atomic Mutations**: a rejected operation changes nothing
//! 4. **Synchronous Execution**: one market is mutated by one caller at a
//!    time; separate markets are independent

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, Side, Event, Ticks, units
pub mod types;

/// Order store and book index
pub mod orderbook;

/// Matching engine and market surface
pub mod engine;

/// Ledger interface
pub mod settlement;

/// Market registry and calldata frames
pub mod router;

/// JSON exchange configuration
pub mod config;

/// Error types
pub mod error;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use engine::{Execution, Market, MarketInfo, OrderStatus};
pub use error::{BookError, ConfigError, RouterError, SettlementError};
pub use orderbook::NO_HINT;
pub use router::Exchange;
pub use settlement::{InMemoryLedger, Ledger, RecordingLedger};
pub use types::{Address, BatchReceipt, ElementOutcome, ElementStatus, Event, Order, Side, Swap, Ticks, U256};
