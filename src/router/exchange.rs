//! Market registry and frame dispatch.
//!
//! An [`Exchange`] creates markets and routes decoded calldata frames to
//! them. All markets of an exchange share one ledger handle.

use std::collections::BTreeMap;

use crate::engine::{Execution, Market, MarketInfo, OrderStatus};
use crate::error::RouterError;
use crate::router::frame::{Command, Frame};
use crate::settlement::Ledger;
use crate::types::{Address, BatchReceipt, ElementOutcome, ElementStatus};

/// Markets keyed by id.
#[derive(Debug)]
pub struct Exchange<L: Ledger + Clone> {
    ledger: L,
    markets: BTreeMap<u8, Market<L>>,
}

impl<L: Ledger + Clone> Exchange<L> {
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            markets: BTreeMap::new(),
        }
    }

    /// Register a market. Ids are unique for the lifetime of the exchange.
    pub fn create_market(&mut self, info: MarketInfo) -> Result<&mut Market<L>, RouterError> {
        if self.markets.contains_key(&info.id) {
            return Err(RouterError::DuplicateMarket(info.id));
        }
        tracing::info!(
            market = info.id,
            base = %info.base_token,
            quote = %info.quote_token,
            size_tick = %info.ticks.size_tick(),
            price_tick = %info.ticks.price_tick(),
            "market created"
        );
        let market = Market::new(info, self.ledger.clone());
        Ok(self.markets.entry(info.id).or_insert(market))
    }

    pub fn market(&self, id: u8) -> Option<&Market<L>> {
        self.markets.get(&id)
    }

    pub fn market_mut(&mut self, id: u8) -> Option<&mut Market<L>> {
        self.markets.get_mut(&id)
    }

    /// Markets in id order
    pub fn markets(&self) -> impl Iterator<Item = &Market<L>> {
        self.markets.values()
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Decode hex calldata from `sender` and apply it.
    pub fn execute(&mut self, sender: Address, calldata: &str) -> Result<BatchReceipt, RouterError> {
        let frame = Frame::from_hex(calldata)?;
        self.execute_frame(sender, &frame)
    }

    /// Apply a decoded frame. Elements run in order; a failing element is
    /// recorded as rejected and the rest still run.
    pub fn execute_frame(&mut self, sender: Address, frame: &Frame) -> Result<BatchReceipt, RouterError> {
        let market = self
            .markets
            .get_mut(&frame.market_id)
            .ok_or(RouterError::UnknownMarket(frame.market_id))?;

        let size = frame.command.len();
        let outcomes: Vec<ElementOutcome> = match &frame.command {
            Command::CreateLimitBatch(orders) => {
                let amount0_bases: Vec<u64> = orders.iter().map(|o| o.amount0_base).collect();
                let price_bases: Vec<u64> = orders.iter().map(|o| o.price_base).collect();
                let is_asks: Vec<bool> = orders.iter().map(|o| o.is_ask).collect();
                let hints: Vec<u32> = orders.iter().map(|o| o.hint).collect();
                market
                    .create_limit_order_batch(size, &amount0_bases, &price_bases, &is_asks, &hints, sender)?
                    .iter()
                    .map(|r| outcome(r, executed))
                    .collect()
            }
            Command::UpdateLimitBatch(orders) => {
                let ids: Vec<u32> = orders.iter().map(|o| o.id).collect();
                let amount0_bases: Vec<u64> = orders.iter().map(|o| o.amount0_base).collect();
                let price_bases: Vec<u64> = orders.iter().map(|o| o.price_base).collect();
                let hints: Vec<u32> = orders.iter().map(|o| o.hint).collect();
                market
                    .update_limit_order_batch(size, &ids, &amount0_bases, &price_bases, &hints, sender)?
                    .iter()
                    .map(|r| outcome(r, executed))
                    .collect()
            }
            Command::CancelLimitBatch(ids) => market
                .cancel_limit_order_batch(size, ids, sender)?
                .iter()
                .map(|r| outcome(r, |order| ElementOutcome::canceled(order.id)))
                .collect(),
            Command::MarketOrder(o) => {
                let result = market.create_market_order(o.amount0_base, o.price_base, o.is_ask, sender);
                vec![outcome(&result, executed)]
            }
        };

        let receipt = BatchReceipt::new(frame.market_id, outcomes, market.state_root()?);
        tracing::debug!(
            market = frame.market_id,
            %sender,
            command = frame.command.code(),
            operations = receipt.operations,
            failed = receipt.failed(),
            swaps = receipt.swaps,
            "frame executed"
        );
        Ok(receipt)
    }
}

impl From<OrderStatus> for ElementStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Filled => ElementStatus::Filled,
            OrderStatus::PartiallyFilled => ElementStatus::PartiallyFilled,
            OrderStatus::Resting => ElementStatus::Resting,
            OrderStatus::Unfilled => ElementStatus::Unfilled,
        }
    }
}

fn executed(exec: &Execution) -> ElementOutcome {
    ElementOutcome::new(exec.id, exec.status.into(), exec.filled0, exec.filled1, exec.swaps.len() as u64)
}

/// Outcome of one element, logging a rejection.
fn outcome<T, E, F>(result: &Result<T, E>, accepted: F) -> ElementOutcome
where
    E: std::fmt::Display,
    F: FnOnce(&T) -> ElementOutcome,
{
    match result {
        Ok(value) => accepted(value),
        Err(err) => {
            tracing::debug!(%err, "batch element rejected");
            ElementOutcome::rejected(err)
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::frame::{LimitRequest, MarketRequest};
    use crate::settlement::RecordingLedger;
    use crate::types::{Ticks, U256};

    fn info(id: u8) -> MarketInfo {
        MarketInfo {
            id,
            base_token: Address::from_low_u64(0xb),
            quote_token: Address::from_low_u64(0xc),
            ticks: Ticks::from_exponents(0, 0, 0).unwrap(),
        }
    }

    fn exchange() -> Exchange<RecordingLedger> {
        let mut exchange = Exchange::new(RecordingLedger::new());
        exchange.create_market(info(0)).unwrap();
        exchange
    }

    #[test]
    fn test_duplicate_market() {
        let mut ex = exchange();
        assert!(matches!(ex.create_market(info(0)), Err(RouterError::DuplicateMarket(0))));
        assert!(ex.create_market(info(1)).is_ok());
        assert_eq!(ex.markets().map(|m| m.id()).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_unknown_market() {
        let mut ex = exchange();
        let frame = Frame::new(9, Command::CancelLimitBatch(vec![]));
        assert_eq!(
            ex.execute_frame(Address::ZERO, &frame),
            Err(RouterError::UnknownMarket(9))
        );
    }

    #[test]
    fn test_execute_counts_successes_and_swaps() {
        let mut ex = exchange();
        let alice = Address::from_low_u64(1);
        let bob = Address::from_low_u64(2);

        let asks = Frame::new(
            0,
            Command::CreateLimitBatch(vec![
                LimitRequest { amount0_base: 2, price_base: 100, is_ask: true, hint: 0 },
                LimitRequest { amount0_base: 0, price_base: 100, is_ask: true, hint: 0 },
                LimitRequest { amount0_base: 2, price_base: 101, is_ask: true, hint: 0 },
            ]),
        );
        let receipt = ex.execute(alice, &asks.to_hex().unwrap()).unwrap();
        assert_eq!(receipt.operations, 3);
        assert_eq!(receipt.succeeded, 2);
        assert_eq!(receipt.swaps, 0);
        assert_eq!(receipt.ids(), vec![1, 2]);
        assert_eq!(receipt.outcomes[0].status, ElementStatus::Resting);
        assert_eq!(receipt.outcomes[1].status, ElementStatus::Rejected);
        assert!(receipt.outcomes[1].error.as_deref().unwrap().contains("invalid quantity"));

        let buy = Frame::new(
            0,
            Command::MarketOrder(MarketRequest { amount0_base: 3, price_base: 101, is_ask: false }),
        );
        let receipt = ex.execute_frame(bob, &buy).unwrap();
        assert_eq!(receipt.succeeded, 1);
        assert_eq!(receipt.swaps, 2);
        let bought = &receipt.outcomes[0];
        assert_eq!(bought.id, Some(3));
        assert_eq!(bought.status, ElementStatus::Filled);
        assert_eq!(bought.filled0, U256::from(3u64));
        assert_eq!(bought.filled1, U256::from(2 * 100 + 101u64));
        assert_eq!(receipt.state_root, ex.market(0).unwrap().state_root().unwrap());
    }
}
