//! Per-message latency percentiles, measured by driving the matcher
//! dispatch directly (no ring, no second thread).

use std::hint::black_box;
use std::time::Instant;

use hdrhistogram::Histogram;

use nanomatch::{Arena, EngineStats, Gateway, Matcher, OrderPool};

const WARMUP: usize = 50_000;
const ITERATIONS: usize = 1_000_000;

fn main() {
    println!("Preparing latency run...");

    let arena = Arena::new(nanomatch::config::ARENA_SIZE_BYTES).expect("arena");
    let pool = OrderPool::new(&arena, nanomatch::config::MAX_ORDERS).expect("pool");
    let mut matcher = Matcher::new(pool);
    let stats = EngineStats::new();

    let mut gateway = Gateway::new(WARMUP + ITERATIONS, 42);
    let mut messages = Vec::with_capacity(WARMUP + ITERATIONS);
    for _ in 0..WARMUP + ITERATIONS {
        messages.push(gateway.next_message());
    }

    println!("Warming up ({WARMUP} messages)...");
    for msg in &messages[..WARMUP] {
        black_box(matcher.process(msg, &stats));
    }

    println!("Measuring {ITERATIONS} messages...");
    let mut histogram = Histogram::<u64>::new_with_bounds(1, 1_000_000, 3).unwrap();
    let run_start = Instant::now();
    for msg in &messages[WARMUP..] {
        let start = Instant::now();
        black_box(matcher.process(msg, &stats));
        let _ = histogram.record(start.elapsed().as_nanos() as u64);
    }
    let total = run_start.elapsed();

    println!();
    println!("=== Latency Report (ns) ===");
    println!("Total Ops:  {ITERATIONS}");
    println!(
        "Throughput: {:.2} ops/sec",
        ITERATIONS as f64 / total.as_secs_f64()
    );
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("Max:    {:6} ns", histogram.max());
    println!("---------------------------");
}
