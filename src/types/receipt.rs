//! Receipt for one router frame.
//!
//! A frame applies a batch of operations to one market. The receipt keeps
//! one [`ElementOutcome`] per element, in frame order, the totals over them
//! and the market's state root afterwards.

use std::fmt;

use primitive_types::U256;
use serde::Serialize;

/// What became of one element of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementStatus {
    Filled,
    PartiallyFilled,
    Resting,
    Unfilled,
    Canceled,
    Rejected,
}

/// Result of one batch element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementOutcome {
    /// Id assigned to the incoming order, or the id canceled. `None` when
    /// rejected.
    pub id: Option<u32>,
    pub status: ElementStatus,

    /// Base matched
    pub filled0: U256,

    /// Quote matched
    pub filled1: U256,

    pub swaps: u64,

    /// Rejection reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ElementOutcome {
    pub fn new(id: u32, status: ElementStatus, filled0: U256, filled1: U256, swaps: u64) -> Self {
        Self {
            id: Some(id),
            status,
            filled0,
            filled1,
            swaps,
            error: None,
        }
    }

    pub fn canceled(id: u32) -> Self {
        Self::new(id, ElementStatus::Canceled, U256::zero(), U256::zero(), 0)
    }

    pub fn rejected(reason: impl fmt::Display) -> Self {
        Self {
            id: None,
            status: ElementStatus::Rejected,
            filled0: U256::zero(),
            filled1: U256::zero(),
            swaps: 0,
            error: Some(reason.to_string()),
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status != ElementStatus::Rejected
    }
}

/// Execution receipt for a router frame.
///
/// ## State Root
///
/// The 32-byte state root is the SHA-256 hash of the market's SSZ snapshot
/// after the frame, see [`crate::engine::snapshot`]. Two hosts that applied
/// the same frames in the same order hold identical roots.
///
/// ## Example
///
/// ```
/// use tickbook::types::{BatchReceipt, ElementOutcome, ElementStatus, U256};
///
/// let outcomes = vec![
///     ElementOutcome::new(1, ElementStatus::Resting, U256::zero(), U256::zero(), 0),
///     ElementOutcome::rejected("invalid quantity"),
/// ];
/// let receipt = BatchReceipt::new(1, outcomes, [0u8; 32]);
/// assert_eq!(receipt.succeeded, 1);
/// assert_eq!(receipt.failed(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchReceipt {
    /// Market the frame was applied to
    pub market_id: u8,

    /// Number of batch elements in the frame
    pub operations: u64,

    /// Elements that committed
    pub succeeded: u64,

    /// Swap events produced by the frame
    pub swaps: u64,

    /// One entry per element, in frame order
    pub outcomes: Vec<ElementOutcome>,

    /// Market state root after execution (SHA-256, 32 bytes)
    #[serde(serialize_with = "serialize_root")]
    pub state_root: [u8; 32],
}

fn serialize_root<S: serde::Serializer>(root: &[u8; 32], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(root))
}

impl BatchReceipt {
    pub fn new(market_id: u8, outcomes: Vec<ElementOutcome>, state_root: [u8; 32]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_ok()).count() as u64;
        let swaps = outcomes.iter().map(|o| o.swaps).sum();
        Self {
            market_id,
            operations: outcomes.len() as u64,
            succeeded,
            swaps,
            outcomes,
            state_root,
        }
    }

    /// Elements that were rejected
    pub fn failed(&self) -> u64 {
        self.operations.saturating_sub(self.succeeded)
    }

    /// Ids assigned or canceled by the successful elements, in frame order
    pub fn ids(&self) -> Vec<u32> {
        self.outcomes.iter().filter_map(|o| o.id).collect()
    }

    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }

    /// Check if this receipt represents an empty frame
    pub fn is_empty(&self) -> bool {
        self.operations == 0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
