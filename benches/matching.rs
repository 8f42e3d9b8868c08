//! Benchmarks for the tickbook matching engine.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark
//! cargo bench -- single_match
//!
//! # Run with verbose output
//! cargo bench -- --verbose
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use tickbook::error::SettlementError;
use tickbook::{Address, Ledger, Market, MarketInfo, Ticks, NO_HINT, U256};

// ============================================================================
// HELPER FUNCTIONS - Deterministic market setup
// ============================================================================

/// Ledger that accepts everything and keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
struct NullLedger;

impl Ledger for NullLedger {
    fn credit(&mut self, _: Address, _: Address, _: U256, _: u8) {}

    fn debit(&mut self, _: Address, _: Address, _: U256, _: u8) -> Result<(), SettlementError> {
        Ok(())
    }
}

fn maker() -> Address {
    Address::from_low_u64(1)
}

fn taker() -> Address {
    Address::from_low_u64(2)
}

fn new_market(capacity: usize) -> Market<NullLedger> {
    let info = MarketInfo {
        id: 0,
        base_token: Address::from_low_u64(0xb),
        quote_token: Address::from_low_u64(0xc),
        ticks: Ticks::from_exponents(0, 0, 0).unwrap(),
    };
    Market::with_capacity(info, NullLedger, capacity)
}

/// Rest `count` asks at increasing prices, each placed from the previous
/// one so setup stays linear.
fn populate_asks(market: &mut Market<NullLedger>, count: usize, base_price: u64, step: u64, size: u64) {
    let mut hint = NO_HINT;
    for i in 0..count {
        let price = base_price + i as u64 * step;
        hint = market.create_limit_order(size, price, true, maker(), hint).unwrap().id;
    }
}

/// Rest `count` bids at decreasing prices.
fn populate_bids(market: &mut Market<NullLedger>, count: usize, base_price: u64, step: u64, size: u64) {
    let mut hint = NO_HINT;
    for i in 0..count {
        let price = base_price - i as u64 * step;
        hint = market.create_limit_order(size, price, false, maker(), hint).unwrap().id;
    }
}

/// `(size, price, is_ask)` triples around a mid price.
fn generate_order_batch(count: usize, seed: u64) -> Vec<(u64, u64, bool)> {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let is_ask = rng.gen_bool(0.5);
            let price = rng.gen_range(9_950..=10_050u64);
            let size = rng.gen_range(1..=100u64);
            (size, price, is_ask)
        })
        .collect()
}

// ============================================================================
// BENCHMARK: Single Match Latency
// ============================================================================

fn bench_single_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_match");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("against_1k_orders", |b| {
        b.iter_batched(
            || {
                let mut market = new_market(2_000);
                populate_asks(&mut market, 1_000, 10_000, 1, 10);
                market
            },
            |mut market| black_box(market.create_market_order(10, 10_000, false, taker())),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("multi_level_sweep", |b| {
        b.iter_batched(
            || {
                let mut market = new_market(200);
                populate_asks(&mut market, 100, 10_000, 1, 1);
                market
            },
            // sweeps 10 levels
            |mut market| black_box(market.create_limit_order(10, 10_009, false, taker(), NO_HINT)),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("no_match_rest_on_book", |b| {
        b.iter_batched(
            || {
                let mut market = new_market(2_000);
                populate_asks(&mut market, 1_000, 10_000, 1, 10);
                market
            },
            |mut market| black_box(market.create_limit_order(10, 9_000, false, taker(), NO_HINT)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Hinted Insertion
// ============================================================================

fn bench_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("insertion");
    group.measurement_time(Duration::from_secs(5));

    for depth in [100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("scan", depth), &depth, |b, &depth| {
            b.iter_batched(
                || {
                    let mut market = new_market(depth + 1);
                    populate_bids(&mut market, depth, 100_000, 1, 1);
                    market
                },
                // lands at the tail
                |mut market| black_box(market.create_limit_order(1, 1, false, taker(), NO_HINT)),
                BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("hinted", depth), &depth, |b, &depth| {
            b.iter_batched(
                || {
                    let mut market = new_market(depth + 1);
                    populate_bids(&mut market, depth, 100_000, 1, 1);
                    let hint = market.get_mock_index_to_insert(U256::one(), U256::one(), false);
                    (market, hint)
                },
                |(mut market, hint)| black_box(market.create_limit_order(1, 1, false, taker(), hint)),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Order Operations
// ============================================================================

fn bench_order_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_operations");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("add_to_empty", |b| {
        b.iter_batched(
            || new_market(16),
            |mut market| black_box(market.create_limit_order(1, 10_000, false, maker(), NO_HINT)),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("cancel_order", |b| {
        b.iter_batched(
            || {
                let mut market = new_market(2_000);
                populate_bids(&mut market, 1_000, 10_000, 1, 1);
                market
            },
            // middle of the book
            |mut market| black_box(market.cancel_limit_order(500, maker())),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("update_order", |b| {
        b.iter_batched(
            || {
                let mut market = new_market(2_000);
                populate_bids(&mut market, 1_000, 10_000, 1, 1);
                market
            },
            |mut market| black_box(market.update_limit_order(500, 2, 9_700, 499, maker())),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Throughput
// ============================================================================

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(15));
    group.sample_size(50);

    for batch_size in [1_000usize, 10_000] {
        group.throughput(Throughput::Elements(batch_size as u64));

        group.bench_with_input(BenchmarkId::new("orders", batch_size), &batch_size, |b, &size| {
            let orders = generate_order_batch(size, 42);

            b.iter_batched(
                || new_market(size),
                |mut market| {
                    for &(amount, price, is_ask) in &orders {
                        let _ = black_box(market.create_limit_order(amount, price, is_ask, maker(), NO_HINT));
                    }
                    market.take_events().len()
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: State Root
// ============================================================================

fn bench_state_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_root");
    group.measurement_time(Duration::from_secs(5));

    for depth in [100usize, 1_000, 10_000] {
        let mut market = new_market(depth * 2);
        populate_asks(&mut market, depth, 20_000, 1, 5);
        populate_bids(&mut market, depth, 10_000, 1, 5);

        group.throughput(Throughput::Elements((depth * 2) as u64));
        group.bench_with_input(BenchmarkId::new("orders", depth * 2), &market, |b, market| {
            b.iter(|| black_box(market.state_root()))
        });
    }

    group.finish();
}

// ============================================================================
// CRITERION ENTRY POINT
// ============================================================================

criterion_group!(
    benches,
    bench_single_match,
    bench_insertion,
    bench_order_operations,
    bench_throughput,
    bench_state_root
);

criterion_main!(benches);
