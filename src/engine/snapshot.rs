//! Deterministic state root of a market.
//!
//! The book is encoded as one SSZ header followed by one SSZ record per
//! resting order, asks then bids, each side in priority order, and the
//! concatenation is hashed with SHA-256. Two markets that received the same
//! operations produce the same root.

use primitive_types::U256;
use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;
use thiserror::Error;

use crate::types::Order;

/// Failure to encode a snapshot record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot encoding failed: {0}")]
    Encoding(String),
}

/// Market-wide fields covered by the state root.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct MarketHeader {
    pub market_id: u8,
    pub next_order_id: u32,
    pub base_token: [u8; 32],
    pub quote_token: [u8; 32],
    pub size_tick: [u8; 32],
    pub price_tick: [u8; 32],
    pub price_multiplier: [u8; 32],
}

/// One resting order as covered by the state root.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct OrderRecord {
    pub id: u32,
    pub owner: [u8; 32],
    pub is_ask: bool,
    pub price_base: u64,
    pub amount0: [u8; 32],
    pub amount1: [u8; 32],
}

impl From<&Order> for OrderRecord {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            owner: order.owner.to_word(),
            is_ask: order.is_ask(),
            price_base: order.price_base,
            amount0: word(order.amount0),
            amount1: word(order.amount1),
        }
    }
}

/// Big-endian 32-byte encoding of a 256-bit value.
pub fn word(value: U256) -> [u8; 32] {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    buf
}

fn encode<T: SimpleSerialize>(value: &T, hasher: &mut Sha256) -> std::result::Result<(), SnapshotError> {
    let bytes = ssz_rs::serialize(value).map_err(|e| SnapshotError::Encoding(format!("{e:?}")))?;
    hasher.update(&bytes);
    Ok(())
}

/// Hash a header and its records in the given order.
pub fn state_root<'a, I>(header: &MarketHeader, orders: I) -> std::result::Result<[u8; 32], SnapshotError>
where
    I: IntoIterator<Item = &'a Order>,
{
    let mut hasher = Sha256::new();
    encode(header, &mut hasher)?;
    for order in orders {
        encode(&OrderRecord::from(order), &mut hasher)?;
    }

    let mut root = [0u8; 32];
    root.copy_from_slice(&hasher.finalize());
    Ok(root)
}

// ============================================================================
// Unit Tests
// ============================================================================
