//! Thin platform layer: CPU pinning and the monotonic nanosecond clock.

use std::sync::OnceLock;
use std::time::Instant;

/// Pin the calling thread to `core_id`. Returns false when the core does
/// not exist or the affinity call is refused; callers log and continue
/// unpinned.
pub fn pin_to_core(core_id: usize) -> bool {
    match core_affinity::get_core_ids() {
        Some(cores) => cores
            .into_iter()
            .find(|c| c.id == core_id)
            .map(core_affinity::set_for_current)
            .unwrap_or(false),
        None => false,
    }
}

/// Nanoseconds on a process-local monotonic clock.
#[inline]
pub fn timestamp_ns() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_nanos() as u64
}
