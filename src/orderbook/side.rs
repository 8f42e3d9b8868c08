//! One side of the book: a sorted, intrusive linked list of resting orders.
//!
//! ## Ordering
//!
//! ```text
//! head (best price, oldest) <-> ... <-> tail (worst price, newest)
//! ```
//!
//! Asks are ascending by price, bids descending. Equal prices keep arrival
//! order, so a new order goes immediately before the first entry with a
//! strictly worse price.
//!
//! ## Hints
//!
//! A hint is the slab key of an order believed to sit next to the insertion
//! point. If it is valid (present, linked, same side) the insertion walks from
//! it toward the correct position; otherwise the list is scanned from the
//! head. The hint never changes where the order ends up, only how far the
//! walk goes.

use slab::Slab;

use crate::orderbook::OrderNode;
use crate::types::{Order, Side};

/// How an insertion found its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Walked from the caller's hint
    FromHint,
    /// Hint absent or stale: scanned from the head
    Scanned,
}

/// A sorted sequence of resting orders for one side.
///
/// The order data lives in the slab; this struct only holds the list
/// endpoints.
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,

    /// Best order (slab key)
    head: Option<usize>,

    /// Worst, newest order (slab key)
    tail: Option<usize>,

    len: usize,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slab key of the best order
    #[inline]
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// True if `key` is a node currently linked into this side.
    pub fn is_linked(&self, key: usize, slab: &Slab<OrderNode>) -> bool {
        match slab.get(key) {
            Some(node) => {
                node.side() == self.side
                    && (node.prev.is_some() || node.next.is_some() || self.head == Some(key))
            }
            None => false,
        }
    }

    /// Link the node at `key` into its sorted position.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not in the slab.
    pub fn insert(&mut self, key: usize, hint: Option<usize>, slab: &mut Slab<OrderNode>) -> Placement {
        let price = slab.get(key).expect("Invalid slab key").price();
        let side = self.side;
        let worse = |node: &OrderNode| side.is_worse(node.price(), price);

        let valid_hint = match hint {
            Some(h) if h != key && self.is_linked(h, slab) => Some(h),
            _ => None,
        };

        let (before, placement) = match valid_hint {
            Some(h) => {
                let hint_node = &slab[h];
                if worse(hint_node) {
                    // walk back over the run of worse orders
                    let mut cur = h;
                    while let Some(prev) = slab[cur].prev {
                        if !worse(&slab[prev]) {
                            break;
                        }
                        cur = prev;
                    }
                    (Some(cur), Placement::FromHint)
                } else {
                    // walk forward past orders that are not worse
                    let mut next = hint_node.next;
                    while let Some(n) = next {
                        if worse(&slab[n]) {
                            break;
                        }
                        next = slab[n].next;
                    }
                    (next, Placement::FromHint)
                }
            }
            None => {
                if hint.is_some() {
                    tracing::debug!(side = ?side, key, "stale hint, scanning from head");
                }
                let mut cur = self.head;
                while let Some(c) = cur {
                    if worse(&slab[c]) {
                        break;
                    }
                    cur = slab[c].next;
                }
                (cur, Placement::Scanned)
            }
        };

        match before {
            Some(b) => self.link_before(key, b, slab),
            None => self.push_back(key, slab),
        }
        placement
    }

    fn push_back(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let tail = self.tail;
        {
            let node = &mut slab[key];
            node.prev = tail;
            node.next = None;
        }
        match tail {
            Some(t) => slab[t].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        self.len += 1;
    }

    fn link_before(&mut self, key: usize, before: usize, slab: &mut Slab<OrderNode>) {
        let prev = slab[before].prev;
        {
            let node = &mut slab[key];
            node.prev = prev;
            node.next = Some(before);
        }
        slab[before].prev = Some(key);
        match prev {
            Some(p) => slab[p].next = Some(key),
            None => self.head = Some(key),
        }
        self.len += 1;
    }

    /// Unlink the node at `key`. Returns false if it was not linked here.
    pub fn unlink(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> bool {
        if !self.is_linked(key, slab) {
            return false;
        }
        let (prev, next) = {
            let node = &slab[key];
            (node.prev, node.next)
        };

        match prev {
            Some(p) => slab[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => slab[n].prev = prev,
            None => self.tail = prev,
        }

        let node = &mut slab[key];
        node.prev = None;
        node.next = None;
        self.len -= 1;
        true
    }

    /// Iterate the side's orders in priority order.
    pub fn iter<'a>(&self, slab: &'a Slab<OrderNode>) -> SideIter<'a> {
        SideIter {
            slab,
            cursor: self.head,
        }
    }

    /// Key of the last order that is not strictly worse than the target,
    /// i.e. the predecessor a new order should be linked after.
    pub fn predecessor<F>(&self, slab: &Slab<OrderNode>, mut is_worse_than_target: F) -> Option<usize>
    where
        F: FnMut(&Order) -> bool,
    {
        let mut pred = None;
        let mut cur = self.head;
        while let Some(c) = cur {
            let node = &slab[c];
            if is_worse_than_target(&node.order) {
                break;
            }
            pred = Some(c);
            cur = node.next;
        }
        pred
    }

    /// Check the sortedness invariant: prices monotonic in the side's
    /// direction and, within a price, ids ascending (arrival order).
    pub fn is_sorted(&self, slab: &Slab<OrderNode>) -> bool {
        let mut count = 0;
        let mut last: Option<&Order> = None;
        for order in self.iter(slab) {
            if let Some(prev) = last {
                if self.side.is_better(order.price_base, prev.price_base) {
                    return false;
                }
                if order.price_base == prev.price_base && order.id < prev.id {
                    return false;
                }
            }
            last = Some(order);
            count += 1;
        }
        count == self.len
    }
}

/// Lazy, finite iterator over one side in priority order.
pub struct SideIter<'a> {
    slab: &'a Slab<OrderNode>,
    cursor: Option<usize>,
}

impl<'a> Iterator for SideIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.slab.get(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.order)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
