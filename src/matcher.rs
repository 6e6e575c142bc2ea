//! The matcher: single owner of the pool and the book, fed by the ring.
//!
//! Dispatch per message kind:
//! - limit: copy the payload into a pool slot, rest it, cross the book
//! - market: sweep the opposite side from a stack-local copy
//! - cancel: O(1) lookup and deactivate
//!
//! The run loop busy-spins on an empty ring. No sleeping, no yielding, no
//! syscalls; the only pause instruction is `spin_loop` to be polite to the
//! sibling hyperthread. After `running` clears, the loop drains whatever
//! the producer managed to queue before stopping.

use std::sync::atomic::Ordering;

use tracing::warn;

use crate::config::COMPACT_INTERVAL;
use crate::order::{OrderKind, OrderMessage};
use crate::order_book::OrderBook;
use crate::platform;
use crate::pool::OrderPool;
use crate::ring::Consumer;
use crate::stats::EngineStats;

pub struct Matcher<'a> {
    pool: OrderPool<'a>,
    book: OrderBook,
    processed: u64,
}

impl<'a> Matcher<'a> {
    pub fn new(pool: OrderPool<'a>) -> Self {
        Self {
            pool,
            book: OrderBook::new(),
            processed: 0,
        }
    }

    /// Dispatch one message. Total: every outcome is a state change or a
    /// counter, never an error.
    pub fn process(&mut self, msg: &OrderMessage, stats: &EngineStats) {
        match msg.kind {
            OrderKind::Limit => {
                let Some(idx) = self.pool.acquire() else {
                    stats.pool_exhausted.fetch_add(1, Ordering::Relaxed);
                    return;
                };
                *self.pool.get_mut(idx) = msg.order;
                self.book.add_order(&mut self.pool, idx);
                let fills = self.book.match_crossing(&mut self.pool);
                if fills > 0 {
                    stats.total_fills.fetch_add(fills, Ordering::Relaxed);
                }
            }
            OrderKind::Market => {
                let mut order = msg.order;
                let fills = self.book.match_market(&mut self.pool, &mut order);
                if fills > 0 {
                    stats.total_fills.fetch_add(fills, Ordering::Relaxed);
                }
            }
            OrderKind::Cancel => {
                self.book.cancel_order(&mut self.pool, msg.cancel_id);
            }
        }
    }

    /// Event loop: pin, spin, dispatch, drain. Returns when `running` has
    /// been cleared and the ring is empty.
    pub fn run(
        &mut self,
        input: &mut Consumer<'_, OrderMessage>,
        stats: &EngineStats,
        core_id: Option<usize>,
    ) {
        if let Some(core) = core_id {
            if !platform::pin_to_core(core) {
                warn!(core, "failed to pin matcher thread, continuing unpinned");
            }
        }

        while stats.running() {
            if let Some(msg) = input.pop() {
                self.dispatch(&msg, stats);
            } else {
                std::hint::spin_loop();
            }
        }

        // Drain whatever was in flight at shutdown.
        while let Some(msg) = input.pop() {
            self.dispatch(&msg, stats);
        }
    }

    #[inline]
    fn dispatch(&mut self, msg: &OrderMessage, stats: &EngineStats) {
        self.process(msg, stats);
        stats.orders_processed.fetch_add(1, Ordering::Relaxed);
        self.processed += 1;
        // Periodic maintenance, off the per-message path: reap dead nodes
        // and recycle their pool slots.
        if self.processed & (COMPACT_INTERVAL - 1) == 0 {
            self.book.compact(&mut self.pool);
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn pool(&self) -> &OrderPool<'a> {
        &self.pool
    }

    /// Split borrow over both owned halves, for maintenance and inspection.
    pub fn book_and_pool_mut(&mut self) -> (&mut OrderBook, &mut OrderPool<'a>) {
        (&mut self.book, &mut self.pool)
    }
}
