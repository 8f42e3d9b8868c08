//! Calldata router.
//!
//! Hosts submit compact binary frames (see [`frame`]) on behalf of a sender;
//! the [`Exchange`] decodes them, applies them to the addressed market and
//! answers with a [`BatchReceipt`](crate::types::BatchReceipt) holding one
//! outcome per element.
//!
//! ## Example
//!
//! ```
//! use tickbook::engine::MarketInfo;
//! use tickbook::router::Exchange;
//! use tickbook::settlement::RecordingLedger;
//! use tickbook::types::{Address, Ticks};
//!
//! let mut exchange = Exchange::new(RecordingLedger::new());
//! exchange
//!     .create_market(MarketInfo {
//!         id: 0,
//!         base_token: Address::from_low_u64(0xb),
//!         quote_token: Address::from_low_u64(0xc),
//!         ticks: Ticks::from_exponents(0, 0, 0).unwrap(),
//!     })
//!     .unwrap();
//!
//! // market 0, one bid: 5 @ 100, no hint
//! let calldata = "0x010001000000000000000500000000000000640000000000";
//! let receipt = exchange.execute(Address::from_low_u64(1), calldata).unwrap();
//! assert_eq!(receipt.succeeded, 1);
//! assert_eq!(receipt.ids(), vec![1]);
//! ```

pub mod exchange;
pub mod frame;

pub use exchange::Exchange;
pub use frame::{Command, Frame, LimitRequest, MarketRequest, UpdateRequest};
