//! Book index: the two sorted sides, addressed by order id.
//!
//! The index never copies order fields. It only threads the store's nodes
//! into two lists and translates ids and hints into slab keys.

use crate::error::{BookError, Result};
use crate::orderbook::side::{BookSide, Placement};
use crate::orderbook::OrderStore;
use crate::types::{Order, Side};

/// Hint value meaning "no hint".
pub const NO_HINT: u32 = 0;

/// Bid and ask sequences of one market.
#[derive(Debug, Clone)]
pub struct BookIndex {
    asks: BookSide,
    bids: BookSide,
}

impl Default for BookIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl BookIndex {
    pub fn new() -> Self {
        Self {
            asks: BookSide::new(Side::Ask),
            bids: BookSide::new(Side::Bid),
        }
    }

    #[inline]
    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Ask => &self.asks,
            Side::Bid => &self.bids,
        }
    }

    #[inline]
    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Ask => &mut self.asks,
            Side::Bid => &mut self.bids,
        }
    }

    /// Link a stored order into its side. `hint` is the id of the order the
    /// caller expects to precede it, or [`NO_HINT`].
    pub fn insert(&mut self, side: Side, id: u32, hint: u32, store: &mut OrderStore) -> Result<Placement> {
        let key = store.key_of(id).ok_or(BookError::UnknownOrder(id))?;
        if store.node(key).map(|n| n.side()) != Some(side) {
            return Err(BookError::UnknownOrder(id));
        }
        let hint_key = if hint == NO_HINT { None } else { store.key_of(hint) };
        if hint != NO_HINT && hint_key.is_none() {
            tracing::debug!(id, hint, "hint is not a live order");
        }
        Ok(self.side_mut(side).insert(key, hint_key, store.nodes_mut()))
    }

    /// Unlink an order from its side.
    pub fn remove(&mut self, side: Side, id: u32, store: &mut OrderStore) -> Result<()> {
        let key = store.key_of(id).ok_or(BookError::UnknownOrder(id))?;
        if self.side_mut(side).unlink(key, store.nodes_mut()) {
            Ok(())
        } else {
            Err(BookError::UnknownOrder(id))
        }
    }

    /// Id of the best order on `side`
    pub fn best(&self, side: Side, store: &OrderStore) -> Option<u32> {
        self.best_order(side, store).map(|o| o.id)
    }

    /// The best order on `side`
    pub fn best_order<'a>(&self, side: Side, store: &'a OrderStore) -> Option<&'a Order> {
        let key = self.side(side).head()?;
        store.node(key).map(|n| &n.order)
    }

    /// Orders of `side` in priority order. Each call starts a fresh walk.
    pub fn iter<'a>(&self, side: Side, store: &'a OrderStore) -> impl Iterator<Item = &'a Order> + 'a {
        self.side(side).iter(store.nodes())
    }

    /// Ids of `side` in priority order.
    pub fn ids<'a>(&self, side: Side, store: &'a OrderStore) -> impl Iterator<Item = u32> + 'a {
        self.iter(side, store).map(|o| o.id)
    }

    /// Id of the order a new entry should follow, or [`NO_HINT`] if it would
    /// become the head. `is_worse_than_target` must return true for resting
    /// orders strictly worse than the new one.
    pub fn position_for<F>(&self, side: Side, store: &OrderStore, is_worse_than_target: F) -> u32
    where
        F: FnMut(&Order) -> bool,
    {
        self.side(side)
            .predecessor(store.nodes(), is_worse_than_target)
            .and_then(|key| store.node(key))
            .map_or(NO_HINT, |n| n.order_id())
    }

    /// `(best bid price, best ask price)` if the book is crossed.
    pub fn crossed(&self, store: &OrderStore) -> Option<(u64, u64)> {
        let bid = self.best_order(Side::Bid, store)?.price_base;
        let ask = self.best_order(Side::Ask, store)?.price_base;
        (bid >= ask).then_some((bid, ask))
    }

    /// Both sides sorted, and every stored order linked exactly once.
    pub fn is_consistent(&self, store: &OrderStore) -> bool {
        self.asks.is_sorted(store.nodes())
            && self.bids.is_sorted(store.nodes())
            && self.asks.len() + self.bids.len() == store.len()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
