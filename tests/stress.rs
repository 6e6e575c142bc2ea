//! Stress tests: capacity edges, heavy single-level contention, randomized
//! churn with invariant sweeps.

use std::sync::atomic::Ordering;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use nanomatch::{
    Arena, EngineStats, Matcher, Order, OrderBook, OrderKind, OrderMessage, OrderPool, Side,
};

fn limit_msg(id: u64, side: Side, price: i64, qty: u32) -> OrderMessage {
    OrderMessage::limit(Order {
        id,
        price,
        quantity: qty,
        remaining_qty: qty,
        side,
        active: true,
        ..Order::default()
    })
}

fn market_msg(id: u64, side: Side, qty: u32) -> OrderMessage {
    OrderMessage::market(Order {
        id,
        quantity: qty,
        remaining_qty: qty,
        side,
        kind: OrderKind::Market,
        active: true,
        ..Order::default()
    })
}

#[test]
fn pool_exhaustion_at_capacity_then_recovery_via_compact() {
    const CAPACITY: usize = 256;

    let arena = Arena::new(1 << 20).unwrap();
    let pool = OrderPool::new(&arena, CAPACITY).unwrap();
    let mut matcher = Matcher::new(pool);
    let stats = EngineStats::new();

    // Non-crossing bids fill the pool exactly.
    for i in 0..CAPACITY as u64 {
        matcher.process(
            &limit_msg(i + 1, Side::Bid, 400_000 + (i as i64 % 100) * 100, 10),
            &stats,
        );
    }
    assert_eq!(matcher.pool().in_use(), CAPACITY);

    // One more is dropped and counted.
    matcher.process(&limit_msg(9_999, Side::Bid, 450_000, 10), &stats);
    assert_eq!(stats.pool_exhausted.load(Ordering::Relaxed), 1);

    // Cancel two orders; slots come back only after a sweep reaps them.
    let drops_so_far = stats.pool_exhausted.load(Ordering::Relaxed);
    matcher.process(&OrderMessage::cancel(1), &stats);
    matcher.process(&OrderMessage::cancel(2), &stats);
    assert_eq!(matcher.pool().available(), 0);

    // Compaction normally runs on the matcher loop's interval; drive the
    // sweep directly here.
    {
        let (book, pool) = matcher.book_and_pool_mut();
        book.compact(pool);
    }
    assert_eq!(matcher.pool().available(), 2);
    assert_eq!(stats.pool_exhausted.load(Ordering::Relaxed), drops_so_far);
}

#[test]
fn thousand_orders_on_one_level_fill_in_arrival_order() {
    const N: u64 = 1_000;

    let arena = Arena::new(1 << 22).unwrap();
    let pool = OrderPool::new(&arena, 4_096).unwrap();
    let mut matcher = Matcher::new(pool);
    let stats = EngineStats::new();

    for i in 0..N {
        matcher.process(&limit_msg(i + 1, Side::Ask, 500_000, 10), &stats);
    }
    let level_idx = OrderBook::price_to_index(500_000);
    assert_eq!(matcher.book().ask_level(level_idx).total_qty() as u64, N * 10);

    // One aggressor takes out half the queue.
    matcher.process(&market_msg(N + 1, Side::Bid, (N as u32 / 2) * 10), &stats);

    // The first half is gone, in order; the second half is untouched.
    let level = matcher.book().ask_level(level_idx);
    let states: Vec<(u64, u32, bool)> = level
        .orders()
        .iter(matcher.pool())
        .map(|o| (o.id, o.remaining_qty, o.active))
        .collect();
    assert_eq!(states.len() as u64, N);
    for (i, (id, remaining, active)) in states.iter().enumerate() {
        assert_eq!(*id, i as u64 + 1);
        if (i as u64) < N / 2 {
            assert_eq!(*remaining, 0, "older order {id} should be consumed");
            assert!(!active);
        } else {
            assert_eq!(*remaining, 10, "newer order {id} should be untouched");
            assert!(active);
        }
    }
}

#[test]
fn randomized_churn_keeps_invariants() {
    const MESSAGES: usize = 200_000;

    let arena = Arena::new(1 << 26).unwrap();
    let pool = OrderPool::new(&arena, 300_000).unwrap();
    let mut matcher = Matcher::new(pool);
    let stats = EngineStats::new();

    let mut rng = ChaCha8Rng::seed_from_u64(0xDEADBEEF);
    let mut next_id = 1u64;

    for _ in 0..MESSAGES {
        let roll: f64 = rng.gen();
        let msg = if roll < 0.6 {
            let id = next_id;
            next_id += 1;
            let side = if rng.gen_bool(0.5) { Side::Bid } else { Side::Ask };
            let price = 500_000 + rng.gen_range(-20_000..=20_000i64);
            limit_msg(id, side, price, rng.gen_range(1..500))
        } else if roll < 0.8 {
            let id = next_id;
            next_id += 1;
            let side = if rng.gen_bool(0.5) { Side::Bid } else { Side::Ask };
            market_msg(id, side, rng.gen_range(1..2_000))
        } else {
            OrderMessage::cancel(rng.gen_range(1..next_id.max(2)))
        };
        matcher.process(&msg, &stats);
    }

    // Pool conservation held the whole way (checked at the end; the pool
    // cannot go negative without tripping debug asserts en route).
    let pool = matcher.pool();
    assert_eq!(pool.available() + pool.in_use(), pool.capacity());

    // Sweep everything, then every touched level's cache must equal the sum
    // over its live orders.
    let (book, pool) = matcher.book_and_pool_mut();
    book.compact(pool);
    for idx in 0..nanomatch::config::MAX_PRICE_LEVELS {
        for level in [book.bid_level(idx), book.ask_level(idx)] {
            let live_sum: u32 = level
                .orders()
                .iter(pool)
                .filter(|o| o.active)
                .map(|o| o.remaining_qty)
                .sum();
            assert_eq!(level.total_qty(), live_sum, "level {idx} cache drifted");
            // Compaction leaves only live nodes behind.
            assert_eq!(
                level.orders().iter(pool).filter(|o| !o.active).count(),
                0,
                "level {idx} still holds dead nodes after compact"
            );
        }
    }
}

#[test]
fn cancel_storm_is_idempotent() {
    let arena = Arena::new(1 << 20).unwrap();
    let pool = OrderPool::new(&arena, 512).unwrap();
    let mut matcher = Matcher::new(pool);
    let stats = EngineStats::new();

    for i in 1..=100u64 {
        matcher.process(&limit_msg(i, Side::Bid, 500_000, 10), &stats);
    }
    for i in 1..=100u64 {
        matcher.process(&OrderMessage::cancel(i), &stats);
    }
    assert_eq!(matcher.book().cancel_count(), 100);

    // A second storm over the same ids changes nothing.
    for i in 1..=100u64 {
        matcher.process(&OrderMessage::cancel(i), &stats);
    }
    assert_eq!(matcher.book().cancel_count(), 100);
    let level = matcher.book().bid_level(OrderBook::price_to_index(500_000));
    assert_eq!(level.total_qty(), 0);
}
