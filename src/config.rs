//! Engine-wide compile-time configuration.
//!
//! All capacities are fixed at compile time; nothing in the engine resizes
//! at runtime. Power-of-two requirements are enforced by const assertions.

/// Size of one cache line on the target hardware.
pub const CACHE_LINE_SIZE: usize = 64;

/// Capacity of the producer -> matcher ring. Must be a power of two so the
/// slot index is a single bitwise AND.
pub const RING_BUFFER_CAPACITY: usize = 1 << 16;

/// Size of the pre-reserved memory arena backing the pool and the ring.
pub const ARENA_SIZE_BYTES: usize = 64 * 1024 * 1024;

/// Order pool capacity.
pub const MAX_ORDERS: usize = 500_000;

/// Number of price level slots per book side.
pub const MAX_PRICE_LEVELS: usize = 10_000;

/// Slots in the direct-mapped order-id table. Power of two.
pub const ID_SLOTS: usize = 1 << 20;

/// Fixed-point price scale: real price * 10_000 (4 decimal digits).
pub const PRICE_MULTIPLIER: i64 = 10_000;

/// Core the matcher thread is pinned to.
pub const MATCHER_CORE_ID: usize = 1;

/// Mid price the gateway generates around ($100.0000 in fixed-point).
pub const MID_PRICE: i64 = 1_000_000;

/// Half-width of the gateway's limit price band around [`MID_PRICE`].
pub const PRICE_SPREAD: i64 = 15_000;

/// Total messages the gateway produces per run.
pub const GATEWAY_ORDER_COUNT: usize = 200_000;

/// Gateway order mix: limit / market / cancel = 70 / 20 / 10.
pub const LIMIT_ORDER_RATIO: f64 = 0.70;
pub const MARKET_ORDER_RATIO: f64 = 0.20;

/// Matcher runs book compaction every this many processed messages.
/// Power of two so the check is a mask against the message counter.
pub const COMPACT_INTERVAL: u64 = 1 << 17;

const _: () = assert!(
    RING_BUFFER_CAPACITY.is_power_of_two(),
    "ring capacity must be a power of two"
);

const _: () = assert!(
    ID_SLOTS.is_power_of_two(),
    "id table size must be a power of two"
);

const _: () = assert!(
    COMPACT_INTERVAL.is_power_of_two(),
    "compaction interval is used as a mask"
);

// Price levels are spaced PRICE_MULTIPLIER / 100 fixed-point units apart.
const _: () = assert!(
    PRICE_MULTIPLIER % 100 == 0,
    "price multiplier must be divisible by the level granularity"
);
