//! Synthetic load generator with a latency report.
//!
//! Drives the book with a seeded stream of adds and cancels around a moving
//! mid price, records per-operation latency into an HDR histogram, and
//! prints throughput plus the percentile profile.

use std::time::Instant;

use hdrhistogram::Histogram;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use matchbook::{OrderBook, OrderRequest, OrderType, Side, PRICE_SCALE};

const SEED: u64 = 42;
const WARMUP_OPS: usize = 10_000;
const ITERATIONS: usize = 1_000_000;

/// Mid price the synthetic flow oscillates around: 125.0000
const MID_PRICE: u64 = 125 * PRICE_SCALE;

#[derive(Clone, Copy, Debug)]
enum Op {
    Add(OrderRequest),
    Cancel(u64),
}

/// Pre-generate the whole operation stream so the measured loop does no RNG
/// or allocation work.
fn generate_ops(count: usize, first_id: u64) -> Vec<Op> {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut ops = Vec::with_capacity(count);
    let mut live_ids: Vec<u64> = Vec::new();
    let mut next_id = first_id;

    for _ in 0..count {
        // 70% add, 30% cancel
        if live_ids.is_empty() || rng.gen_bool(0.7) {
            let id = next_id;
            next_id += 1;

            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            // Overlapping bands so a slice of the flow crosses and matches
            let price = match side {
                Side::Buy => MID_PRICE - rng.gen_range(0..5000) * 10,
                Side::Sell => MID_PRICE - 2500 * 10 + rng.gen_range(0..5000) * 10,
            };
            let qty = rng.gen_range(100..1000);

            let order_type = if rng.gen_bool(0.05) {
                OrderType::FillAndKill
            } else {
                OrderType::GoodTillCancel
            };

            ops.push(Op::Add(OrderRequest {
                id,
                side,
                order_type,
                price,
                qty,
            }));
            live_ids.push(id);
        } else {
            let slot = rng.gen_range(0..live_ids.len());
            ops.push(Op::Cancel(live_ids.swap_remove(slot)));
        }
    }

    ops
}

fn apply(book: &OrderBook, op: Op) {
    match op {
        Op::Add(request) => {
            std::hint::black_box(book.add_order(request));
        }
        Op::Cancel(id) => book.cancel_order(id),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Pin to the last core; it is the one most likely isolated from OS noise
    if let Some(core_ids) = core_affinity::get_core_ids() {
        if let Some(last_core) = core_ids.last() {
            core_affinity::set_for_current(*last_core);
        }
    }

    println!("Preparing load benchmark...");
    let book = OrderBook::new(1_000_000);
    book.warm_up();

    println!("Pre-generating {} operations...", WARMUP_OPS + ITERATIONS);
    let ops = generate_ops(WARMUP_OPS + ITERATIONS, 1);
    let (warmup_ops, measured_ops) = ops.split_at(WARMUP_OPS);

    println!("Warming up ({WARMUP_OPS} ops)...");
    for op in warmup_ops {
        apply(&book, *op);
    }

    println!("Running {ITERATIONS} measured iterations...");
    let mut histogram =
        Histogram::<u64>::new_with_bounds(1, 10_000_000, 3).expect("valid histogram bounds");
    let mut total = std::time::Duration::ZERO;

    for op in measured_ops {
        let start = Instant::now();
        apply(&book, *op);
        let elapsed = start.elapsed();

        histogram.record(elapsed.as_nanos() as u64).unwrap_or(());
        total += elapsed;
    }

    println!("\n=== Latency Report (ns) ===");
    println!("Total Ops:  {ITERATIONS}");
    println!(
        "Throughput: {:.2} ops/sec",
        ITERATIONS as f64 / total.as_secs_f64()
    );
    println!("Resting:    {} orders", book.size());
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("P99.99: {:6} ns", histogram.value_at_quantile(0.9999));
    println!("Max:    {:6} ns", histogram.max());
    println!("---------------------------");
}
