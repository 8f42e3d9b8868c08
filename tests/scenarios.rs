//! End-to-end behavior of a market through its public surface.
//!
//! Prices and sizes use unit ticks unless noted, so `amount0` equals the
//! size and `amount1 = size * price`.

use std::thread;

use tickbook::config::ExchangeConfig;
use tickbook::router::{Command, Frame, LimitRequest, UpdateRequest};
use tickbook::{
    Address, BookError, ElementStatus, Event, InMemoryLedger, Ledger, Market, MarketInfo, OrderStatus, RecordingLedger,
    Ticks, NO_HINT, U256,
};

// ============================================================================
// HELPERS
// ============================================================================

fn base() -> Address {
    Address::from_low_u64(0xb0)
}

fn quote() -> Address {
    Address::from_low_u64(0xc0)
}

fn alice() -> Address {
    Address::from_low_u64(1)
}

fn bob() -> Address {
    Address::from_low_u64(2)
}

fn info(id: u8, ticks: Ticks) -> MarketInfo {
    MarketInfo {
        id,
        base_token: base(),
        quote_token: quote(),
        ticks,
    }
}

fn unit_ticks() -> Ticks {
    Ticks::from_exponents(0, 0, 0).unwrap()
}

fn recording_market() -> Market<RecordingLedger> {
    Market::new(info(0, unit_ticks()), RecordingLedger::new())
}

fn funded_ledger(accounts: &[Address], amount: u64) -> InMemoryLedger {
    let ledger = InMemoryLedger::new();
    for &account in accounts {
        ledger.deposit(base(), account, amount.into());
        ledger.deposit(quote(), account, amount.into());
    }
    ledger
}

fn swaps(events: &[Event]) -> Vec<(U256, U256)> {
    events
        .iter()
        .filter_map(Event::as_swap)
        .map(|s| (s.amount0, s.amount1))
        .collect()
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn scenario_a_first_bid_rests_as_best() {
    let mut m = recording_market();
    let exec = m.create_limit_order(1, 100, false, alice(), NO_HINT).unwrap();

    assert_eq!(exec.status, OrderStatus::Resting);
    let best = m.get_best_bid().unwrap();
    assert_eq!(best.id, exec.id);
    assert_eq!(best.owner, alice());
    assert_eq!(best.amount0, U256::from(1u64));
    assert_eq!(best.amount1, U256::from(100u64));
    assert!(m.get_best_ask().is_none());
}

#[test]
fn scenario_b_market_buy_partially_consumes_ask() {
    let mut m = recording_market();
    let ask = m.create_limit_order(5, 100, true, alice(), NO_HINT).unwrap();
    m.take_events();

    let exec = m.create_market_order(3, u64::MAX, false, bob()).unwrap();
    assert_eq!(exec.status, OrderStatus::Filled);

    let events = m.take_events();
    assert!(matches!(events[0], Event::MarketOrderCreated { id, .. } if id == exec.id));
    assert_eq!(swaps(&events), vec![(U256::from(3u64), U256::from(300u64))]);

    let swap = events[1].as_swap().unwrap();
    assert_eq!((swap.ask_id, swap.ask_owner), (ask.id, alice()));
    assert_eq!((swap.bid_id, swap.bid_owner), (exec.id, bob()));

    assert!(m.is_order_active(ask.id));
    let best = m.get_best_ask().unwrap();
    assert_eq!(best.amount0, U256::from(2u64));
    assert_eq!(best.amount1, U256::from(200u64));
}

#[test]
fn scenario_c_market_buy_remainder_is_forfeited() {
    let mut m = recording_market();
    let ask = m.create_limit_order(3, 100, true, alice(), NO_HINT).unwrap();
    m.take_events();

    let exec = m.create_market_order(5, u64::MAX, false, bob()).unwrap();
    assert_eq!(exec.status, OrderStatus::PartiallyFilled);
    assert_eq!(exec.filled0, U256::from(3u64));
    assert_eq!(swaps(&m.take_events()), vec![(U256::from(3u64), U256::from(300u64))]);

    assert!(!m.is_order_active(ask.id));
    assert!(!m.is_order_active(exec.id));
    assert!(m.get_limit_orders().is_empty());
    assert!(m.check_invariants());
}

#[test]
fn scenario_d_crossing_sell_fills_at_bid_price_and_rests_rest() {
    let mut m = recording_market();
    let bid = m.create_limit_order(3, 95, false, alice(), NO_HINT).unwrap();
    m.take_events();

    let ask = m.create_limit_order(5, 90, true, bob(), NO_HINT).unwrap();
    assert_eq!(ask.status, OrderStatus::PartiallyFilled);

    // 3 @ 95, not @ 90
    assert_eq!(swaps(&m.take_events()), vec![(U256::from(3u64), U256::from(285u64))]);
    assert!(!m.is_order_active(bid.id));

    let best = m.get_best_ask().unwrap();
    assert_eq!(best.id, ask.id);
    assert_eq!(best.amount0, U256::from(2u64));
    assert_eq!(best.amount1, U256::from(180u64));
    assert!(m.get_best_bid().is_none());
}

#[test]
fn scenario_e_cancel_of_filled_order_is_unknown() {
    let mut m = recording_market();
    let ask = m.create_limit_order(2, 50, true, alice(), NO_HINT).unwrap();
    m.create_limit_order(2, 50, false, bob(), NO_HINT).unwrap();

    assert!(!m.is_order_active(ask.id));
    assert_eq!(m.cancel_limit_order(ask.id, alice()), Err(BookError::UnknownOrder(ask.id)));
}

#[test]
fn scenario_f_crossing_update_equals_cancel_then_create() {
    let setup = || {
        let ledger = funded_ledger(&[alice(), bob()], 10_000);
        let mut m = Market::new(info(0, unit_ticks()), ledger.clone());
        let bid = m.create_limit_order(3, 90, false, alice(), NO_HINT).unwrap().id;
        m.create_limit_order(2, 100, true, bob(), NO_HINT).unwrap();
        m.create_limit_order(2, 104, true, bob(), NO_HINT).unwrap();
        m.take_events();
        (m, ledger, bid)
    };

    let (mut updated, updated_ledger, bid) = setup();
    let exec = updated.update_limit_order(bid, 3, 100, NO_HINT, alice()).unwrap();
    assert_eq!(exec.status, OrderStatus::PartiallyFilled);
    let update_events = updated.take_events();
    assert!(matches!(
        update_events[0],
        Event::LimitOrderUpdated { id, new_id, .. } if id == bid && new_id == exec.id
    ));

    let (mut replaced, replaced_ledger, bid) = setup();
    replaced.cancel_limit_order(bid, alice()).unwrap();
    let fresh = replaced.create_limit_order(3, 100, false, alice(), NO_HINT).unwrap();
    let replace_events = replaced.take_events();

    assert_eq!(exec.id, fresh.id);
    assert_eq!(exec.swaps, fresh.swaps);
    assert_eq!(swaps(&update_events), swaps(&replace_events));
    assert_eq!(updated.get_limit_orders(), replaced.get_limit_orders());
    assert_eq!(updated.state_root().unwrap(), replaced.state_root().unwrap());
    for token in [base(), quote()] {
        for account in [alice(), bob()] {
            assert_eq!(
                updated_ledger.balance(token, account),
                replaced_ledger.balance(token, account)
            );
        }
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn cancel_round_trip() {
    let mut m = recording_market();
    let a = m.create_limit_order(4, 10, true, alice(), NO_HINT).unwrap().id;
    let b = m.create_limit_order(4, 11, true, alice(), NO_HINT).unwrap().id;

    m.cancel_limit_order(a, alice()).unwrap();
    assert!(!m.is_order_active(a));
    assert_eq!(m.get_limit_orders().ids, vec![b]);
    assert_eq!(m.ledger().credited(base(), alice()), U256::from(4u64));
}

#[test]
fn cancel_by_non_owner_is_rejected() {
    let mut m = recording_market();
    let a = m.create_limit_order(4, 10, true, alice(), NO_HINT).unwrap().id;
    assert_eq!(
        m.cancel_limit_order(a, bob()),
        Err(BookError::NotOwner { id: a, caller: bob() })
    );
    assert!(m.is_order_active(a));
}

#[test]
fn price_then_time_priority() {
    let mut m = recording_market();
    let first = m.create_limit_order(1, 100, false, alice(), NO_HINT).unwrap().id;
    let better = m.create_limit_order(1, 101, false, alice(), NO_HINT).unwrap().id;
    let second = m.create_limit_order(1, 100, false, alice(), NO_HINT).unwrap().id;
    let worse = m.create_limit_order(1, 99, false, alice(), NO_HINT).unwrap().id;

    assert_eq!(m.get_limit_orders().ids, vec![better, first, second, worse]);

    m.take_events();
    m.create_market_order(2, 1, true, bob()).unwrap();
    let events = m.take_events();
    let hit: Vec<u32> = events.iter().filter_map(Event::as_swap).map(|s| s.bid_id).collect();
    assert_eq!(hit, vec![better, first]);
}

#[test]
fn fills_of_a_resting_order_sum_to_its_quote_amount() {
    // amount1 = amount0 * price / 10, truncated
    let ticks = Ticks::from_exponents(0, 0, 1).unwrap();
    let mut m = Market::new(info(0, ticks), RecordingLedger::new());
    let ask = m.create_limit_order(9, 7, true, alice(), NO_HINT).unwrap().id;
    let total1 = m.order(ask).unwrap().amount1;
    m.take_events();

    for _ in 0..4 {
        m.create_market_order(2, u64::MAX, false, bob()).unwrap();
    }
    m.create_market_order(5, u64::MAX, false, bob()).unwrap();

    let paid: U256 = m
        .take_events()
        .iter()
        .filter_map(Event::as_swap)
        .fold(U256::zero(), |acc, s| acc + s.amount1);
    assert_eq!(paid, total1);
    assert!(!m.is_order_active(ask));
}

#[test]
fn stale_and_foreign_hints_do_not_change_placement() {
    let prices = [105u64, 101, 103, 101, 108, 99, 103, 110, 100, 104];
    let hints = [0u32, 1, 999, 2, 3, 42, 7, 6, 1, 5];

    let mut plain = recording_market();
    let mut hinted = recording_market();
    let bid = hinted.create_limit_order(1, 50, false, bob(), NO_HINT).unwrap().id;
    plain.create_limit_order(1, 50, false, bob(), NO_HINT).unwrap();

    for (&price, &hint) in prices.iter().zip(hints.iter()) {
        plain.create_limit_order(1, price, true, alice(), NO_HINT).unwrap();
        // includes unknown ids, a bid id, and ids on the wrong side of the target
        let hint = if hint == 42 { bid } else { hint };
        hinted.create_limit_order(1, price, true, alice(), hint).unwrap();
    }

    assert_eq!(plain.get_limit_orders(), hinted.get_limit_orders());
    assert!(hinted.check_invariants());
}

#[test]
fn mock_index_round_trip() {
    let mut m = recording_market();
    for price in [100u64, 102, 104] {
        m.create_limit_order(1, price, false, alice(), NO_HINT).unwrap();
    }
    let (a0, a1) = (U256::from(1u64), U256::from(103u64));
    let hint = m.get_mock_index_to_insert(a0, a1, false);
    assert_eq!(hint, m.get_limit_orders().ids[0]);

    let exec = m.create_limit_order(1, 103, false, alice(), hint).unwrap();
    assert_eq!(exec.placement, Some(tickbook::orderbook::Placement::FromHint));
    let prices: Vec<U256> = m.get_limit_orders().amount1s;
    assert_eq!(prices, vec![104u64.into(), 103u64.into(), 102u64.into(), 100u64.into()]);
}

#[test]
fn market_constants() {
    let m = Market::new(info(0, Ticks::from_exponents(14, 4, 18).unwrap()), RecordingLedger::new());
    assert_eq!(m.size_tick(), U256::from(10u64).pow(14u64.into()));
    assert_eq!(m.price_tick(), U256::from(10_000u64));
    assert_eq!(m.price_multiplier(), U256::from(10u64).pow(18u64.into()));
}

// ============================================================================
// SETTLEMENT
// ============================================================================

#[test]
fn balances_move_on_fill() {
    let ledger = funded_ledger(&[alice(), bob()], 1_000);
    let mut m = Market::new(info(0, unit_ticks()), ledger.clone());

    m.create_limit_order(4, 10, true, alice(), NO_HINT).unwrap();
    assert_eq!(ledger.balance(base(), alice()), U256::from(996u64));

    m.create_limit_order(3, 12, false, bob(), NO_HINT).unwrap();
    // bob pays 30 at alice's price 10, not 36
    assert_eq!(ledger.balance(quote(), bob()), U256::from(970u64));
    assert_eq!(ledger.balance(base(), bob()), U256::from(1_003u64));
    assert_eq!(ledger.balance(quote(), alice()), U256::from(1_030u64));

    m.cancel_limit_order(m.get_best_ask().unwrap().id, alice()).unwrap();
    assert_eq!(ledger.balance(base(), alice()), U256::from(997u64));
}

#[test]
fn insufficient_balance_rejects_without_change() {
    let ledger = funded_ledger(&[alice()], 100);
    let mut m = Market::new(info(0, unit_ticks()), ledger.clone());
    m.create_limit_order(5, 10, true, alice(), NO_HINT).unwrap();
    let before = m.get_limit_orders();

    let err = m.create_limit_order(5, 10, false, bob(), NO_HINT).unwrap_err();
    assert!(matches!(err, BookError::Settlement(_)));
    assert_eq!(m.get_limit_orders(), before);
    assert_eq!(ledger.balance(quote(), bob()), U256::zero());
}

// ============================================================================
// ROUTER
// ============================================================================

const CONFIG: &str = r#"{
    "markets": [
        { "id": 0, "symbol": "A_Q", "base_token": "0x00000000000000000000000000000000000000b0",
          "quote_token": "0x00000000000000000000000000000000000000c0", "base_decimals": 0,
          "quote_decimals": 0, "size_tick_exp": 0, "price_tick_exp": 0 },
        { "id": 1, "symbol": "B_Q", "base_token": "0x00000000000000000000000000000000000000b1",
          "quote_token": "0x00000000000000000000000000000000000000c0", "base_decimals": 0,
          "quote_decimals": 0, "size_tick_exp": 0, "price_tick_exp": 0 }
    ],
    "deposits": [
        { "account": "0x0000000000000000000000000000000000000001", "market": 0, "base": "100", "quote": "10000" },
        { "account": "0x0000000000000000000000000000000000000002", "market": 0, "base": "100", "quote": "10000" }
    ]
}"#;

#[test]
fn router_frames_drive_markets() {
    let config = ExchangeConfig::from_json_str(CONFIG).unwrap();
    let ledger = InMemoryLedger::new();
    config.seed(&ledger).unwrap();
    let mut exchange = config.build(ledger.clone()).unwrap();

    let create = Frame::new(
        0,
        Command::CreateLimitBatch(vec![
            LimitRequest { amount0_base: 5, price_base: 20, is_ask: true, hint: 0 },
            LimitRequest { amount0_base: 5, price_base: 22, is_ask: true, hint: 1 },
        ]),
    );
    let receipt = exchange.execute(alice(), &create.to_hex().unwrap()).unwrap();
    assert_eq!((receipt.operations, receipt.succeeded, receipt.swaps), (2, 2, 0));
    assert_eq!(receipt.ids(), vec![1, 2]);
    assert!(receipt.outcomes.iter().all(|o| o.status == ElementStatus::Resting));

    let update = Frame::new(
        0,
        Command::UpdateLimitBatch(vec![UpdateRequest { id: 2, amount0_base: 5, price_base: 21, hint: 1 }]),
    );
    let receipt = exchange.execute_frame(alice(), &update).unwrap();
    assert_eq!(receipt.succeeded, 1);
    assert_eq!(receipt.ids(), vec![3]);

    // market buy 0x04, market 0, 7 @ worst 21
    let calldata = format!("0x0400{:016x}{:016x}00", 7, 21);
    let receipt = exchange.execute(bob(), &calldata).unwrap();
    assert_eq!(receipt.swaps, 2);
    assert_eq!(receipt.outcomes[0].id, Some(4));
    assert_eq!(receipt.outcomes[0].status, ElementStatus::Filled);
    assert_eq!(receipt.outcomes[0].filled0, U256::from(7u64));
    assert_eq!(receipt.outcomes[0].filled1, U256::from(5 * 20 + 2 * 21u64));
    assert_eq!(ledger.balance(base(), bob()), U256::from(107u64));
    assert_eq!(ledger.balance(quote(), bob()), U256::from(10_000u64 - 5 * 20 - 2 * 21));

    // bob cannot cancel alice's order, alice can
    let remaining = exchange.market(0).unwrap().get_best_ask().unwrap().id;
    let cancel = Frame::new(0, Command::CancelLimitBatch(vec![remaining]));
    assert_eq!(remaining, 3);
    let rejected = exchange.execute_frame(bob(), &cancel).unwrap();
    assert_eq!(rejected.succeeded, 0);
    assert_eq!(rejected.outcomes[0].status, ElementStatus::Rejected);
    assert!(rejected.outcomes[0].error.as_deref().unwrap().contains("is not owned by"));
    let canceled = exchange.execute_frame(alice(), &cancel).unwrap();
    assert_eq!(canceled.outcomes[0].status, ElementStatus::Canceled);
    assert_eq!(canceled.ids(), vec![3]);
    assert!(exchange.market(0).unwrap().is_empty());

    // base + ask reserves are conserved
    assert_eq!(ledger.total_supply(base()), U256::from(200u64));
    assert_eq!(ledger.total_supply(quote()), U256::from(20_000u64));
}

#[test]
fn router_rejects_malformed_frames_before_any_market() {
    let config = ExchangeConfig::from_json_str(CONFIG).unwrap();
    let mut exchange = config.build(RecordingLedger::new()).unwrap();

    assert!(exchange.execute(alice(), "0x0407").is_err());
    assert!(exchange.execute(alice(), "0x0209").is_err());
    assert!(exchange.execute(alice(), "nothex").is_err());
    assert!(exchange.ledger().calls().is_empty());
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn independent_markets_run_on_separate_threads() {
    let ledger = funded_ledger(&[alice(), bob()], 1_000_000);

    let handles: Vec<_> = (0..4u8)
        .map(|id| {
            let mut market = Market::new(info(id, unit_ticks()), ledger.clone());
            thread::spawn(move || {
                for i in 0..200u64 {
                    let price = 100 + (i * 7 + id as u64) % 13;
                    let is_ask = i % 2 == 0;
                    let owner = if is_ask { alice() } else { bob() };
                    market.create_limit_order(1 + i % 3, price, is_ask, owner, NO_HINT).unwrap();
                    assert!(market.check_invariants());
                }
                market
            })
        })
        .collect();

    let markets: Vec<Market<InMemoryLedger>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let reserved_base = markets
        .iter()
        .flat_map(|m| {
            let orders = m.get_limit_orders();
            orders
                .amount0s
                .into_iter()
                .zip(orders.is_asks)
                .filter(|(_, is_ask)| *is_ask)
                .map(|(a0, _)| a0)
                .collect::<Vec<_>>()
        })
        .fold(U256::zero(), |acc, a| acc + a);
    assert_eq!(
        ledger.total_supply(base()) + reserved_base,
        U256::from(2_000_000u64)
    );
}

#[test]
fn ledger_trait_object_is_usable() {
    fn credit_dyn(ledger: &mut dyn Ledger) {
        ledger.credit(base(), alice(), U256::one(), 0);
    }
    let mut ledger = InMemoryLedger::new();
    credit_dyn(&mut ledger);
    assert_eq!(ledger.balance(base(), alice()), U256::one());
}
