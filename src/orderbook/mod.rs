//! Order storage and the sorted book index.
//!
//! ## Architecture
//!
//! - **Slab-based storage**: O(1) order insertion, removal, and lookup
//! - **One linked list per side**: sorted by price, then arrival
//! - **Hint-assisted insertion**: O(distance from hint), O(n) worst case
//!
//! ## Components
//!
//! - [`OrderNode`]: `Order` plus list pointers
//! - [`OrderStore`]: owns every live order, hands out ids
//! - [`BookSide`]: one sorted side
//! - [`BookIndex`]: both sides, addressed by order id
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Insert with good hint | O(1) |
//! | Insert without hint | O(n) |
//! | Remove by id | O(1) |
//! | Best bid/ask | O(1) |
//!
//! ## Example
//!
//! ```
//! use tickbook::orderbook::{BookIndex, OrderStore, NO_HINT};
//! use tickbook::types::{Address, Side};
//!
//! let mut store = OrderStore::with_capacity(16);
//! let mut index = BookIndex::new();
//!
//! let id = store.allocate(Address::ZERO, Side::Bid, 100, 10u64.into(), 10u64.into()).unwrap();
//! index.insert(Side::Bid, id, NO_HINT, &mut store).unwrap();
//!
//! assert_eq!(index.best(Side::Bid, &store), Some(id));
//! ```

pub mod index;
pub mod node;
pub mod side;
pub mod store;

pub use index::{BookIndex, NO_HINT};
pub use node::OrderNode;
pub use side::{BookSide, Placement};
pub use store::OrderStore;
