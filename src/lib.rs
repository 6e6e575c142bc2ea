//! # nanomatch
//!
//! A single-venue limit order matching engine built for a zero-allocation,
//! zero-syscall hot path.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: the matcher thread exclusively owns the pool and
//!   the book (no locks, no shared mutable state)
//! - **Pre-Allocated**: one arena carved at startup backs every long-lived
//!   buffer; the steady state never touches the system allocator
//! - **Intrusive Levels**: the FIFO link lives inside the order record, so
//!   appending to a price level is O(1) at any depth
//! - **Wait-Free Handoff**: a cache-line-isolated SPSC ring carries order
//!   messages by copy from the gateway to the matcher
//!
//! ## Architecture
//!
//! ```text
//! [Gateway Thread] --> [SPSC Ring Buffer] --> [Matcher Thread (Pinned)]
//!                                                     |
//!                                       [Order Pool + Order Book + Stats]
//! ```

pub mod arena;
pub mod config;
pub mod error;
pub mod fifo;
pub mod gateway;
pub mod matcher;
pub mod order;
pub mod order_book;
pub mod platform;
pub mod pool;
pub mod price_level;
pub mod report;
pub mod ring;
pub mod stats;

// Re-exports for convenience
pub use arena::Arena;
pub use error::EngineError;
pub use fifo::OrderFifo;
pub use gateway::Gateway;
pub use matcher::Matcher;
pub use order::{Order, OrderIdx, OrderKind, OrderMessage, Side, NULL_INDEX};
pub use order_book::OrderBook;
pub use pool::OrderPool;
pub use price_level::PriceLevel;
pub use ring::{Consumer, Producer, SpscRing};
pub use stats::EngineStats;
