//! Orchestration: wire the arena, pool, ring, gateway, and matcher
//! together, run one synthetic session, and print the report.

use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use nanomatch::config::{
    ARENA_SIZE_BYTES, GATEWAY_ORDER_COUNT, MATCHER_CORE_ID, MAX_ORDERS, RING_BUFFER_CAPACITY,
};
use nanomatch::{Arena, EngineError, EngineStats, Gateway, Matcher, OrderMessage, OrderPool, SpscRing};

const GATEWAY_SEED: u64 = 42;

fn main() -> Result<(), EngineError> {
    tracing_subscriber::fmt().with_target(false).init();

    // All fallible work happens here, before the workers start.
    let arena = Arena::new(ARENA_SIZE_BYTES)?;
    let pool = OrderPool::new(&arena, MAX_ORDERS)?;
    let mut ring = SpscRing::<OrderMessage>::new(&arena, RING_BUFFER_CAPACITY)?;
    let stats = EngineStats::new();

    info!(
        arena_mb = arena.capacity() / (1024 * 1024),
        arena_used_mb = arena.used() / (1024 * 1024),
        pool_slots = MAX_ORDERS,
        ring_capacity = RING_BUFFER_CAPACITY,
        "memory substrate ready"
    );

    let (mut producer, mut consumer) = ring.split();
    let stats_ref = &stats;

    let (matcher, elapsed) = thread::scope(|s| {
        info!(core = MATCHER_CORE_ID, "starting matcher thread");
        let matcher_handle = s.spawn(move || {
            let mut matcher = Matcher::new(pool);
            matcher.run(&mut consumer, stats_ref, Some(MATCHER_CORE_ID));
            matcher
        });

        // Give the matcher a moment to pin and settle before the flood.
        thread::sleep(Duration::from_millis(50));

        info!(orders = GATEWAY_ORDER_COUNT, "starting gateway");
        let start = Instant::now();
        let gateway_handle = s.spawn(move || {
            let mut gateway = Gateway::new(GATEWAY_ORDER_COUNT, GATEWAY_SEED);
            gateway.run(&mut producer, stats_ref)
        });

        let published = gateway_handle.join().expect("gateway thread panicked");
        info!(published, "gateway done, draining");

        // Let the matcher drain the tail of the ring, then stop it.
        thread::sleep(Duration::from_millis(100));
        stats.stop();

        let matcher = matcher_handle.join().expect("matcher thread panicked");
        (matcher, start.elapsed())
    });

    nanomatch::report::print_report(&stats, elapsed.as_secs_f64(), &arena, matcher.book());
    Ok(())
}
