//! Order node for slab-based storage.
//!
//! ## Design
//!
//! `OrderNode` wraps an `Order` with doubly-linked list pointers. All resting
//! orders of one side form a single list sorted by price, then arrival, so
//! the book index is nothing more than a head/tail pair per side threaded
//! through the slab.
//!
//! ## Linked List
//!
//! - `next`: the following order (same or worse price)
//! - `prev`: the preceding order (same or better price)
//!
//! Pointers are slab keys (`usize`), not direct references.

use crate::types::{Order, Side};

/// Order node stored in the slab.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The actual order data
    pub order: Order,

    /// Next order in the side's sequence (slab key)
    /// None if this is the tail
    pub next: Option<usize>,

    /// Previous order in the side's sequence (slab key)
    /// None if this is the head
    pub prev: Option<usize>,
}

impl OrderNode {
    /// Create a new order node (not yet linked)
    ///
    /// ```
    /// use tickbook::orderbook::OrderNode;
    /// use tickbook::types::{Address, Order, Side};
    ///
    /// let order = Order::new(1, Address::ZERO, Side::Bid, 100, 10u64.into(), 10u64.into());
    /// let node = OrderNode::new(order);
    ///
    /// assert!(node.next.is_none());
    /// assert!(node.prev.is_none());
    /// ```
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
        }
    }

    #[inline]
    pub fn order_id(&self) -> u32 {
        self.order.id
    }

    #[inline]
    pub fn price(&self) -> u64 {
        self.order.price_base
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.order.side
    }
}
