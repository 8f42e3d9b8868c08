//! Settlement interface: the engine's only route to token balances.
//!
//! A market never holds balances. It calls its [`Ledger`] synchronously,
//! inside the mutating operation:
//!
//! - **create**: the taker is debited once for everything it pays, fills and
//!   resting reserve together, before the book is touched
//! - **fill**: the resting order's owner is credited with what it receives,
//!   the taker is credited with what it bought
//! - **cancel**: the remaining reserve is credited back to the owner
//!
//! Ask reserves are base tokens (`amount0`), bid reserves are quote tokens
//! (`amount1`).
//!
//! Two implementations ship with the crate: [`InMemoryLedger`], a shared
//! balance table a host can hand to several markets, and [`RecordingLedger`],
//! which accepts everything and records each call for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use primitive_types::U256;

use crate::error::SettlementError;
use crate::types::Address;

/// Balance callbacks a market requires from its host.
pub trait Ledger {
    /// Add `amount` of `token` to `account`.
    fn credit(&mut self, token: Address, account: Address, amount: U256, market_id: u8);

    /// Take `amount` of `token` from `account`, or fail without side effects.
    fn debit(
        &mut self,
        token: Address,
        account: Address,
        amount: U256,
        market_id: u8,
    ) -> Result<(), SettlementError>;
}

impl<L: Ledger + ?Sized> Ledger for &mut L {
    fn credit(&mut self, token: Address, account: Address, amount: U256, market_id: u8) {
        (**self).credit(token, account, amount, market_id)
    }

    fn debit(
        &mut self,
        token: Address,
        account: Address,
        amount: U256,
        market_id: u8,
    ) -> Result<(), SettlementError> {
        (**self).debit(token, account, amount, market_id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// InMemoryLedger
// ============================================================================

/// Shared `(token, account) -> balance` table.
///
/// Clones share the same table, so one ledger can back every market of an
/// exchange.
///
/// ```
/// use tickbook::settlement::{InMemoryLedger, Ledger};
/// use tickbook::types::Address;
///
/// let token = Address::from_low_u64(1);
/// let alice = Address::from_low_u64(2);
///
/// let mut ledger = InMemoryLedger::new();
/// ledger.deposit(token, alice, 100u64.into());
/// assert!(ledger.debit(token, alice, 150u64.into(), 0).is_err());
/// assert!(ledger.debit(token, alice, 60u64.into(), 0).is_ok());
/// assert_eq!(ledger.balance(token, alice), 40u64.into());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: Arc<Mutex<HashMap<(Address, Address), U256>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fund an account outside of any market.
    pub fn deposit(&self, token: Address, account: Address, amount: U256) {
        let mut balances = lock(&self.balances);
        let entry = balances.entry((token, account)).or_insert_with(U256::zero);
        *entry = entry.saturating_add(amount);
    }

    pub fn balance(&self, token: Address, account: Address) -> U256 {
        lock(&self.balances)
            .get(&(token, account))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of all balances of `token`.
    pub fn total_supply(&self, token: Address) -> U256 {
        lock(&self.balances)
            .iter()
            .filter(|((t, _), _)| *t == token)
            .fold(U256::zero(), |acc, (_, v)| acc.saturating_add(*v))
    }
}

impl Ledger for InMemoryLedger {
    fn credit(&mut self, token: Address, account: Address, amount: U256, _market_id: u8) {
        self.deposit(token, account, amount);
    }

    fn debit(
        &mut self,
        token: Address,
        account: Address,
        amount: U256,
        market_id: u8,
    ) -> Result<(), SettlementError> {
        let mut balances = lock(&self.balances);
        let available = balances.get(&(token, account)).copied().unwrap_or_default();
        match available.checked_sub(amount) {
            Some(rest) => {
                balances.insert((token, account), rest);
                Ok(())
            }
            None => {
                tracing::warn!(%token, %account, %amount, %available, market_id, "debit rejected");
                Err(SettlementError::InsufficientBalance {
                    token,
                    account,
                    required: amount,
                    available,
                })
            }
        }
    }
}

// ============================================================================
// RecordingLedger
// ============================================================================

/// Direction of a recorded ledger call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Credit,
    Debit,
}

/// One recorded ledger call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCall {
    pub kind: CallKind,
    pub token: Address,
    pub account: Address,
    pub amount: U256,
    pub market_id: u8,
}

/// Ledger that never rejects and remembers every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingLedger {
    calls: Arc<Mutex<Vec<LedgerCall>>>,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        lock(&self.calls).clone()
    }

    pub fn clear(&self) {
        lock(&self.calls).clear();
    }

    fn total(&self, kind: CallKind, token: Address, account: Address) -> U256 {
        lock(&self.calls)
            .iter()
            .filter(|c| c.kind == kind && c.token == token && c.account == account)
            .fold(U256::zero(), |acc, c| acc.saturating_add(c.amount))
    }

    /// Total credited to `account` in `token`
    pub fn credited(&self, token: Address, account: Address) -> U256 {
        self.total(CallKind::Credit, token, account)
    }

    /// Total debited from `account` in `token`
    pub fn debited(&self, token: Address, account: Address) -> U256 {
        self.total(CallKind::Debit, token, account)
    }

    fn record(&self, kind: CallKind, token: Address, account: Address, amount: U256, market_id: u8) {
        lock(&self.calls).push(LedgerCall {
            kind,
            token,
            account,
            amount,
            market_id,
        });
    }
}

impl Ledger for RecordingLedger {
    fn credit(&mut self, token: Address, account: Address, amount: U256, market_id: u8) {
        self.record(CallKind::Credit, token, account, amount, market_id);
    }

    fn debit(
        &mut self,
        token: Address,
        account: Address,
        amount: U256,
        market_id: u8,
    ) -> Result<(), SettlementError> {
        self.record(CallKind::Debit, token, account, amount, market_id);
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
