//! Shared observability counters and the shutdown flag.
//!
//! Everything here is read cross-thread with relaxed ordering; the numbers
//! exist for the final report and may be momentarily stale while running.
//! Only the `running` flag carries ordering weight: a release store at
//! shutdown, relaxed loads on the hot path (a missed read just delays exit
//! by one spin).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::config::CACHE_LINE_SIZE;

#[repr(align(64))]
pub struct EngineStats {
    /// Messages the gateway handed to the ring.
    pub orders_received: AtomicU64,
    /// Messages the matcher popped and dispatched.
    pub orders_processed: AtomicU64,
    /// Units filled across all matches.
    pub total_fills: AtomicU64,
    /// Producer-side back-pressure events (push rejected, retried).
    pub ring_buffer_full: AtomicU64,
    /// Orders dropped because the pool had no free slot.
    pub pool_exhausted: AtomicU64,
    running: AtomicBool,
}

const _: () = assert!(std::mem::align_of::<EngineStats>() == CACHE_LINE_SIZE);

impl EngineStats {
    pub fn new() -> Self {
        Self {
            orders_received: AtomicU64::new(0),
            orders_processed: AtomicU64::new(0),
            total_fills: AtomicU64::new(0),
            ring_buffer_full: AtomicU64::new(0),
            pool_exhausted: AtomicU64::new(0),
            running: AtomicBool::new(true),
        }
    }

    #[inline]
    pub fn running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Cooperative shutdown: workers observe this and wind down.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

impl Default for EngineStats {
    fn default() -> Self {
        Self::new()
    }
}
