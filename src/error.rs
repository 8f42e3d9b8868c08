//! Error taxonomy for the order book engine.
//!
//! Every caller-facing error is a deterministic function of the book state
//! and the request. A stale hint is not an error: the index recovers by
//! scanning and the caller never sees it.

use primitive_types::U256;
use thiserror::Error;

use crate::engine::SnapshotError;
use crate::types::units::UnitsError;
use crate::types::Address;

/// Errors returned by market operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    /// Zero size, zero price, zero quote amount, or 256-bit overflow.
    #[error("invalid quantity: amount0_base={amount0_base}, price_base={price_base}")]
    InvalidQuantity { amount0_base: u64, price_base: u64 },

    /// The order id was never allocated, or the order is no longer active.
    #[error("unknown order: {0}")]
    UnknownOrder(u32),

    /// The caller does not own the order it tried to cancel.
    #[error("order {id} is not owned by {caller}")]
    NotOwner { id: u32, caller: Address },

    /// A mutation would have left best bid >= best ask. Nothing was committed.
    #[error("crossed book: bid {bid_price} >= ask {ask_price}")]
    CrossedBookInvariantViolation { bid_price: u64, ask_price: u64 },

    /// The market has handed out every `u32` order id.
    #[error("order ids exhausted")]
    IdsExhausted,

    /// A batch input slice is shorter than the declared size.
    #[error("batch size {size} exceeds input length {len}")]
    BatchLengthMismatch { size: usize, len: usize },

    #[error("settlement failed: {0}")]
    Settlement(#[from] SettlementError),
}

/// Errors raised by a [`Ledger`](crate::settlement::Ledger) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("insufficient balance of {token} for {account}: required {required}, available {available}")]
    InsufficientBalance {
        token: Address,
        account: Address,
        required: U256,
        available: U256,
    },
}

/// Errors from decoding or dispatching router calldata.
///
/// Every variant is raised before any market is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouterError {
    #[error("calldata is not hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("empty calldata")]
    EmptyFrame,

    #[error("unknown command byte {0:#04x}")]
    UnknownCommand(u8),

    #[error("unknown market {0}")]
    UnknownMarket(u8),

    #[error("calldata truncated at byte {offset}, {needed} more bytes needed")]
    Truncated { offset: usize, needed: usize },

    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),

    #[error("side flag at byte {offset} must be 0 or 1, got {value}")]
    InvalidSide { offset: usize, value: u8 },

    #[error("market {0} already exists")]
    DuplicateMarket(u8),

    #[error("batch of {0} elements exceeds the 255 a frame can carry")]
    BatchTooLarge(usize),

    #[error(transparent)]
    Book(#[from] BookError),

    #[error("snapshot failed: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Errors from loading an exchange configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid amount in config: {0}")]
    Units(#[from] UnitsError),

    #[error("invalid tick exponents for market {0}")]
    InvalidTicks(u8),

    #[error("deposit names unknown market {0}")]
    UnknownMarket(u8),

    #[error(transparent)]
    Router(#[from] RouterError),
}

/// Convenience alias for market operations.
pub type Result<T> = std::result::Result<T, BookError>;
