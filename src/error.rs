//! Startup error taxonomy.
//!
//! Everything that can fail does so during setup; the hot path itself is
//! total and reports through counters instead of `Result`s.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The backing allocation for the arena could not be obtained.
    #[error("arena: failed to allocate {0} bytes")]
    AllocationFailed(usize),

    /// A bump allocation did not fit in the remaining arena space.
    #[error("arena: out of memory (requested {requested} bytes, {remaining} remaining)")]
    ArenaExhausted { requested: usize, remaining: usize },

    /// Ring capacities must be powers of two for mask indexing.
    #[error("ring: capacity {0} is not a power of two")]
    CapacityNotPowerOfTwo(usize),

    /// Pool capacities must leave room for the null index sentinel.
    #[error("pool: capacity {0} exceeds the index range")]
    PoolTooLarge(usize),
}
