//! Order store: the single owner of live order records.
//!
//! ## Memory Model
//!
//! Per slab docs (https://docs.rs/slab/0.4.11):
//! - `Slab::with_capacity(n)` pre-allocates n slots
//! - Keys are reused after removal
//! - O(1) insert, remove, and lookup
//!
//! Slab keys are an internal detail. Callers address orders by their `u32`
//! id, which comes from a per-market counter and is never reused, so a stale
//! reference to a canceled order can never alias a newer one.

use std::collections::HashMap;

use primitive_types::U256;
use slab::Slab;

use crate::error::{BookError, Result};
use crate::orderbook::OrderNode;
use crate::types::{Address, Order, Side};

/// First id handed out by a fresh store. Id 0 is reserved for "no hint".
pub const FIRST_ORDER_ID: u32 = 1;

/// Live orders keyed by id.
#[derive(Debug)]
pub struct OrderStore {
    /// Pre-allocated order storage
    nodes: Slab<OrderNode>,

    /// Order id to slab key mapping
    index: HashMap<u32, usize>,

    /// Next id to hand out
    next_id: u32,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a store with pre-allocated capacity
    ///
    /// ```
    /// use tickbook::orderbook::OrderStore;
    ///
    /// let store = OrderStore::with_capacity(1_000);
    /// assert!(store.capacity() >= 1_000);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            next_id: FIRST_ORDER_ID,
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Number of live orders
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Id Generation
    // ========================================================================

    /// Consume the next id without storing an order.
    ///
    /// Used for incoming orders that may never rest, so that their fills can
    /// still name them.
    pub fn reserve_id(&mut self) -> Result<u32> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(BookError::IdsExhausted)?;
        Ok(id)
    }

    /// The id the next reservation will return
    #[inline]
    pub fn peek_next_id(&self) -> u32 {
        self.next_id
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Create an active order with a fresh id.
    pub fn allocate(
        &mut self,
        owner: Address,
        side: Side,
        price_base: u64,
        amount0: U256,
        amount1: U256,
    ) -> Result<u32> {
        let id = self.reserve_id()?;
        self.insert(Order::new(id, owner, side, price_base, amount0, amount1));
        Ok(id)
    }

    /// Store an order under an id obtained from [`reserve_id`](Self::reserve_id).
    ///
    /// Returns the slab key of the new node (not yet linked into any side).
    pub(crate) fn insert(&mut self, order: Order) -> usize {
        let id = order.id;
        let key = self.nodes.insert(OrderNode::new(order));
        self.index.insert(id, key);
        key
    }

    /// Get an active order by id
    pub fn get(&self, id: u32) -> Result<&Order> {
        self.key_of(id)
            .and_then(|key| self.nodes.get(key))
            .map(|node| &node.order)
            .ok_or(BookError::UnknownOrder(id))
    }

    /// Replace the remaining amounts of an active order.
    pub fn mutate_amounts(&mut self, id: u32, amount0: U256, amount1: U256) -> Result<()> {
        let key = self.key_of(id).ok_or(BookError::UnknownOrder(id))?;
        let node = self.nodes.get_mut(key).ok_or(BookError::UnknownOrder(id))?;
        node.order.amount0 = amount0;
        node.order.amount1 = amount1;
        Ok(())
    }

    /// Remove an order and return its final record with `active == false`.
    ///
    /// The caller must already have unlinked it from its book side.
    pub fn deactivate(&mut self, id: u32) -> Result<Order> {
        let key = self.index.remove(&id).ok_or(BookError::UnknownOrder(id))?;
        let mut order = self.nodes.remove(key).order;
        order.active = false;
        Ok(order)
    }

    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    /// Slab key for an order id
    #[inline]
    pub fn key_of(&self, id: u32) -> Option<usize> {
        self.index.get(&id).copied()
    }

    // ========================================================================
    // Node Access (for the book index)
    // ========================================================================

    #[inline]
    pub fn node(&self, key: usize) -> Option<&OrderNode> {
        self.nodes.get(key)
    }

    #[inline]
    pub(crate) fn nodes(&self) -> &Slab<OrderNode> {
        &self.nodes
    }

    #[inline]
    pub(crate) fn nodes_mut(&mut self) -> &mut Slab<OrderNode> {
        &mut self.nodes
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
