//! One market: order store, book index, matching and settlement.
//!
//! Every mutation runs to completion before returning. It is planned
//! against the current book, the taker is debited, and only then are the
//! fills, the resting remainder and the events committed. A rejected
//! operation leaves the book, the ledger and the event buffer untouched.

use std::mem;

use primitive_types::U256;

use crate::engine::matcher::{self, Fill, MatchPlan};
use crate::engine::snapshot::{self, MarketHeader, SnapshotError};
use crate::error::{BookError, Result};
use crate::orderbook::{BookIndex, OrderStore, Placement};
use crate::settlement::Ledger;
use crate::types::{Address, Event, LimitOrders, Order, OrderView, Side, Swap, Ticks};

/// Fixed parameters of a market, set at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketInfo {
    pub id: u8,
    pub base_token: Address,
    pub quote_token: Address,
    pub ticks: Ticks,
}

/// Where an incoming order ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Nothing left: fully matched, or the leftover was too small to rest
    Filled,

    /// Some quantity matched. A limit order rests with the rest, a market
    /// order drops it.
    PartiallyFilled,

    /// Nothing matched, the whole limit order rests
    Resting,

    /// Nothing matched, the market order is dropped
    Unfilled,
}

/// Result of an accepted create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Id assigned to the incoming order
    pub id: u32,
    pub status: OrderStatus,

    /// Base quantity matched
    pub filled0: U256,

    /// Quote quantity matched
    pub filled1: U256,

    /// Base quantity left on the book under `id`
    pub resting0: U256,

    pub swaps: Vec<Swap>,

    /// How the remainder was linked, if it rests
    pub placement: Option<Placement>,
}

impl Execution {
    #[inline]
    pub fn is_resting(&self) -> bool {
        !self.resting0.is_zero()
    }
}

/// A single limit order book.
///
/// ```
/// use tickbook::engine::{Market, MarketInfo, OrderStatus};
/// use tickbook::orderbook::NO_HINT;
/// use tickbook::settlement::RecordingLedger;
/// use tickbook::types::{Address, Ticks};
///
/// let info = MarketInfo {
///     id: 0,
///     base_token: Address::from_low_u64(0xb),
///     quote_token: Address::from_low_u64(0xc),
///     ticks: Ticks::from_exponents(0, 0, 0).unwrap(),
/// };
/// let mut market = Market::new(info, RecordingLedger::new());
/// let alice = Address::from_low_u64(1);
///
/// let ask = market.create_limit_order(5, 100, true, alice, NO_HINT).unwrap();
/// assert_eq!(ask.status, OrderStatus::Resting);
/// assert_eq!(market.get_best_ask().unwrap().id, ask.id);
/// ```
#[derive(Debug)]
pub struct Market<L: Ledger> {
    info: MarketInfo,
    store: OrderStore,
    index: BookIndex,
    ledger: L,
    events: Vec<Event>,
}

impl<L: Ledger> Market<L> {
    pub fn new(info: MarketInfo, ledger: L) -> Self {
        Self::with_capacity(info, ledger, 0)
    }

    /// Create a market with room for `capacity` resting orders.
    pub fn with_capacity(info: MarketInfo, ledger: L, capacity: usize) -> Self {
        Self {
            info,
            store: OrderStore::with_capacity(capacity),
            index: BookIndex::new(),
            ledger,
            events: Vec::new(),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Submit a limit order. Crossing quantity fills at resting prices, the
    /// remainder rests. `hint` is the id expected to precede it, or
    /// [`NO_HINT`](crate::orderbook::NO_HINT).
    pub fn create_limit_order(
        &mut self,
        amount0_base: u64,
        price_base: u64,
        is_ask: bool,
        owner: Address,
        hint: u32,
    ) -> Result<Execution> {
        self.place_limit(owner, Side::from_is_ask(is_ask), amount0_base, price_base, hint, None)
    }

    /// Submit a market order. `price_base` is the worst price the taker
    /// accepts; anything unfilled within it is dropped.
    pub fn create_market_order(
        &mut self,
        amount0_base: u64,
        price_base: u64,
        is_ask: bool,
        owner: Address,
    ) -> Result<Execution> {
        let side = Side::from_is_ask(is_ask);
        let (amount0, amount1) = self.info.ticks.quantize(amount0_base, price_base)?;

        let plan = matcher::plan(&self.store, &self.index, &self.info.ticks, side, price_base, amount0)?;
        self.ensure_id_available()?;
        let owed = match side {
            Side::Ask => plan.filled0,
            Side::Bid => plan.filled1,
        };
        self.debit(side, owner, owed)?;

        let id = self.store.reserve_id()?;
        self.events.push(Event::MarketOrderCreated {
            id,
            owner,
            amount0,
            amount1,
            is_ask,
        });
        let swaps = self.commit_fills(side, id, owner, &plan.fills)?;

        let status = if plan.is_empty() {
            OrderStatus::Unfilled
        } else if plan.remaining0.is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        tracing::debug!(
            market = self.info.id,
            id,
            %owner,
            ?side,
            price_base,
            fills = swaps.len(),
            dropped = %plan.remaining0,
            "market order executed"
        );

        Ok(Execution {
            id,
            status,
            filled0: plan.filled0,
            filled1: plan.filled1,
            resting0: U256::zero(),
            swaps,
            placement: None,
        })
    }

    /// Cancel a resting order and refund its reserve. Returns the order as it
    /// was when canceled.
    pub fn cancel_limit_order(&mut self, id: u32, owner: Address) -> Result<Order> {
        let order = self.store.get(id)?;
        if order.owner != owner {
            return Err(BookError::NotOwner { id, caller: owner });
        }
        let side = order.side;

        self.index.remove(side, id, &mut self.store)?;
        let order = self.store.deactivate(id)?;
        let (token, reserve) = self.reserve_of(&order);
        self.credit(token, owner, reserve);

        self.events.push(Event::LimitOrderCanceled {
            id,
            owner,
            amount0: order.amount0,
            amount1: order.amount1,
            is_ask: order.is_ask(),
        });
        tracing::info!(market = self.info.id, id, %owner, "limit order canceled");
        Ok(order)
    }

    /// Replace a resting order with a new one on the same side.
    ///
    /// The old order loses its time priority and the replacement gets a fresh
    /// id. The new quantities are validated before anything changes, and an
    /// order the caller does not own is reported as unknown.
    pub fn update_limit_order(
        &mut self,
        id: u32,
        new_amount0_base: u64,
        new_price_base: u64,
        hint: u32,
        owner: Address,
    ) -> Result<Execution> {
        let old = self.store.get(id)?;
        if old.owner != owner {
            return Err(BookError::UnknownOrder(id));
        }
        let old = old.clone();
        self.place_limit(owner, old.side, new_amount0_base, new_price_base, hint, Some(old))
    }

    /// Apply `size` creates in order. Each element succeeds or fails on its
    /// own; earlier elements are not rolled back.
    pub fn create_limit_order_batch(
        &mut self,
        size: usize,
        amount0_bases: &[u64],
        price_bases: &[u64],
        is_asks: &[bool],
        hints: &[u32],
        owner: Address,
    ) -> Result<Vec<Result<Execution>>> {
        check_batch(size, &[amount0_bases.len(), price_bases.len(), is_asks.len(), hints.len()])?;
        Ok((0..size)
            .map(|i| self.create_limit_order(amount0_bases[i], price_bases[i], is_asks[i], owner, hints[i]))
            .collect())
    }

    /// Apply `size` updates in order.
    pub fn update_limit_order_batch(
        &mut self,
        size: usize,
        ids: &[u32],
        new_amount0_bases: &[u64],
        new_price_bases: &[u64],
        hints: &[u32],
        owner: Address,
    ) -> Result<Vec<Result<Execution>>> {
        check_batch(size, &[ids.len(), new_amount0_bases.len(), new_price_bases.len(), hints.len()])?;
        Ok((0..size)
            .map(|i| self.update_limit_order(ids[i], new_amount0_bases[i], new_price_bases[i], hints[i], owner))
            .collect())
    }

    /// Apply `size` cancels in order.
    pub fn cancel_limit_order_batch(&mut self, size: usize, ids: &[u32], owner: Address) -> Result<Vec<Result<Order>>> {
        check_batch(size, &[ids.len()])?;
        Ok(ids[..size].iter().map(|&id| self.cancel_limit_order(id, owner)).collect())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    #[inline]
    pub fn id(&self) -> u8 {
        self.info.id
    }

    #[inline]
    pub fn info(&self) -> &MarketInfo {
        &self.info
    }

    pub fn get_best_ask(&self) -> Option<OrderView> {
        self.index.best_order(Side::Ask, &self.store).map(Order::view)
    }

    pub fn get_best_bid(&self) -> Option<OrderView> {
        self.index.best_order(Side::Bid, &self.store).map(Order::view)
    }

    /// Every resting order, asks then bids, each side in priority order.
    pub fn get_limit_orders(&self) -> LimitOrders {
        let mut orders = LimitOrders::default();
        for side in [Side::Ask, Side::Bid] {
            for order in self.index.iter(side, &self.store) {
                orders.push(order);
            }
        }
        orders
    }

    pub fn is_order_active(&self, id: u32) -> bool {
        self.store.get(id).map_or(false, |o| o.active)
    }

    pub fn is_ask_order(&self, id: u32) -> Result<bool> {
        self.store.get(id).map(Order::is_ask)
    }

    /// The resting order.
    pub fn order(&self, id: u32) -> Result<&Order> {
        self.store.get(id)
    }

    /// Hint for an order of `amount0` / `amount1` on the given side: the id
    /// it would follow, or `0` if it would become the best order.
    pub fn get_mock_index_to_insert(&self, amount0: U256, amount1: U256, is_ask: bool) -> u32 {
        let ticks = self.info.ticks;
        let side = Side::from_is_ask(is_ask);
        self.index.position_for(side, &self.store, |resting| {
            let ordering = ticks.cmp_quote_at(amount0, amount1, resting.price_base);
            match side {
                Side::Ask => ordering.is_lt(),
                Side::Bid => ordering.is_gt(),
            }
        })
    }

    #[inline]
    pub fn size_tick(&self) -> U256 {
        self.info.ticks.size_tick()
    }

    #[inline]
    pub fn price_tick(&self) -> U256 {
        self.info.ticks.price_tick()
    }

    #[inline]
    pub fn price_multiplier(&self) -> U256 {
        self.info.ticks.price_multiplier()
    }

    /// Number of resting orders
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Events emitted since the last drain.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drain the event buffer.
    pub fn take_events(&mut self) -> Vec<Event> {
        mem::take(&mut self.events)
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Sides sorted, every order linked once, and best bid < best ask.
    pub fn check_invariants(&self) -> bool {
        self.index.is_consistent(&self.store) && self.index.crossed(&self.store).is_none()
    }

    /// SHA-256 over the SSZ encoding of the market parameters and every
    /// resting order in priority order.
    pub fn state_root(&self) -> std::result::Result<[u8; 32], SnapshotError> {
        let header = MarketHeader {
            market_id: self.info.id,
            next_order_id: self.store.peek_next_id(),
            base_token: self.info.base_token.to_word(),
            quote_token: self.info.quote_token.to_word(),
            size_tick: snapshot::word(self.size_tick()),
            price_tick: snapshot::word(self.price_tick()),
            price_multiplier: snapshot::word(self.price_multiplier()),
        };
        let orders = self
            .index
            .iter(Side::Ask, &self.store)
            .chain(self.index.iter(Side::Bid, &self.store));
        snapshot::state_root(&header, orders)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn place_limit(
        &mut self,
        owner: Address,
        side: Side,
        amount0_base: u64,
        price_base: u64,
        hint: u32,
        replaces: Option<Order>,
    ) -> Result<Execution> {
        let (amount0, amount1) = self.info.ticks.quantize(amount0_base, price_base)?;
        let plan = matcher::plan(&self.store, &self.index, &self.info.ticks, side, price_base, amount0)?;
        let (rest0, rest1) = self.resting_amounts(&plan, price_base)?;
        if !rest0.is_zero() {
            guard_uncrossed(side, price_base, plan.stop_price)?;
        }
        self.ensure_id_available()?;

        // paid in base for asks, quote for bids; a replaced order's reserve is
        // in the same token and is netted against it
        let owed = match side {
            Side::Ask => plan.filled0.saturating_add(rest0),
            Side::Bid => plan.filled1.saturating_add(rest1),
        };
        let released = replaces
            .as_ref()
            .map_or(U256::zero(), |old| self.reserve_of(old).1);
        if owed > released {
            self.debit(side, owner, owed - released)?;
        }

        if let Some(old) = &replaces {
            self.index.remove(side, old.id, &mut self.store)?;
            self.store.deactivate(old.id)?;
        }
        if released > owed {
            self.credit(self.paying_token(side), owner, released - owed);
        }

        let id = self.store.reserve_id()?;
        let is_ask = side.is_ask();
        self.events.push(match &replaces {
            Some(old) => Event::LimitOrderUpdated {
                id: old.id,
                new_id: id,
                owner,
                new_amount0: amount0,
                new_amount1: amount1,
                is_ask,
            },
            None => Event::LimitOrderCreated {
                id,
                owner,
                amount0,
                amount1,
                is_ask,
            },
        });

        let swaps = self.commit_fills(side, id, owner, &plan.fills)?;

        let placement = if rest0.is_zero() {
            None
        } else {
            self.store
                .insert(Order::new(id, owner, side, price_base, rest0, rest1));
            Some(self.index.insert(side, id, hint, &mut self.store)?)
        };
        debug_assert!(self.index.crossed(&self.store).is_none());

        let status = match (plan.is_empty(), placement.is_some()) {
            (true, true) => OrderStatus::Resting,
            (false, true) => OrderStatus::PartiallyFilled,
            (_, false) => OrderStatus::Filled,
        };
        tracing::debug!(
            market = self.info.id,
            id,
            replaced = replaces.as_ref().map(|o| o.id),
            %owner,
            ?side,
            price_base,
            fills = swaps.len(),
            ?status,
            ?placement,
            "limit order placed"
        );

        Ok(Execution {
            id,
            status,
            filled0: plan.filled0,
            filled1: plan.filled1,
            resting0: rest0,
            swaps,
            placement,
        })
    }

    /// Amounts the remainder of `plan` would rest with. A remainder worth no
    /// quote is dropped.
    fn resting_amounts(&self, plan: &MatchPlan, price_base: u64) -> Result<(U256, U256)> {
        if plan.remaining0.is_zero() {
            return Ok((U256::zero(), U256::zero()));
        }
        let rest1 = self
            .info
            .ticks
            .quote_for(plan.remaining0, price_base)
            .ok_or(BookError::InvalidQuantity {
                amount0_base: 0,
                price_base,
            })?;
        if rest1.is_zero() {
            tracing::debug!(market = self.info.id, remainder = %plan.remaining0, price_base, "dropping dust remainder");
            return Ok((U256::zero(), U256::zero()));
        }
        Ok((plan.remaining0, rest1))
    }

    fn commit_fills(&mut self, taker: Side, taker_id: u32, taker_owner: Address, fills: &[Fill]) -> Result<Vec<Swap>> {
        let (base, quote) = (self.info.base_token, self.info.quote_token);
        let mut swaps = Vec::with_capacity(fills.len());

        for fill in fills {
            if fill.closes {
                self.index.remove(taker.opposite(), fill.resting_id, &mut self.store)?;
                self.store.deactivate(fill.resting_id)?;
            } else {
                self.store
                    .mutate_amounts(fill.resting_id, fill.remaining0, fill.remaining1)?;
            }

            let swap = match taker {
                Side::Ask => {
                    self.credit(base, fill.resting_owner, fill.amount0);
                    self.credit(quote, taker_owner, fill.amount1);
                    Swap::new(fill.amount0, fill.amount1, taker_id, taker_owner, fill.resting_id, fill.resting_owner)
                }
                Side::Bid => {
                    self.credit(quote, fill.resting_owner, fill.amount1);
                    self.credit(base, taker_owner, fill.amount0);
                    Swap::new(fill.amount0, fill.amount1, fill.resting_id, fill.resting_owner, taker_id, taker_owner)
                }
            };
            self.credit(base, fill.resting_owner, fill.dust0);

            self.events.push(Event::Swap(swap));
            swaps.push(swap);
        }
        Ok(swaps)
    }

    fn ensure_id_available(&self) -> Result<()> {
        if self.store.peek_next_id() == u32::MAX {
            return Err(BookError::IdsExhausted);
        }
        Ok(())
    }

    /// Token an order on `side` pays with and reserves.
    fn paying_token(&self, side: Side) -> Address {
        match side {
            Side::Ask => self.info.base_token,
            Side::Bid => self.info.quote_token,
        }
    }

    /// Token and amount reserved by a resting order.
    fn reserve_of(&self, order: &Order) -> (Address, U256) {
        let amount = match order.side {
            Side::Ask => order.amount0,
            Side::Bid => order.amount1,
        };
        (self.paying_token(order.side), amount)
    }

    fn debit(&mut self, taker: Side, owner: Address, amount: U256) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let token = self.paying_token(taker);
        self.ledger
            .debit(token, owner, amount, self.info.id)
            .map_err(BookError::from)
    }

    fn credit(&mut self, token: Address, account: Address, amount: U256) {
        if !amount.is_zero() {
            self.ledger.credit(token, account, amount, self.info.id);
        }
    }
}

fn guard_uncrossed(side: Side, price_base: u64, stop_price: Option<u64>) -> Result<()> {
    match stop_price {
        Some(opposite) if matcher::crosses(side, price_base, opposite) => {
            let (bid_price, ask_price) = match side {
                Side::Bid => (price_base, opposite),
                Side::Ask => (opposite, price_base),
            };
            tracing::error!(bid_price, ask_price, "resting remainder would cross the book");
            Err(BookError::CrossedBookInvariantViolation { bid_price, ask_price })
        }
        _ => Ok(()),
    }
}

fn check_batch(size: usize, lens: &[usize]) -> Result<()> {
    match lens.iter().copied().find(|&len| len < size) {
        Some(len) => Err(BookError::BatchLengthMismatch { size, len }),
        None => Ok(()),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
