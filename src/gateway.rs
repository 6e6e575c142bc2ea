//! Synthetic order gateway: the single producer feeding the ring.
//!
//! Generates a deterministic 70/20/10 mix of limit, market, and cancel
//! messages with a seeded ChaCha stream, so two runs of the same build see
//! the same flow. Limit prices spread around the configured mid; cancels
//! target a random previously issued id. On a full ring the gateway counts
//! the back-pressure event, yields, and retries the same message.

use std::sync::atomic::Ordering;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::{LIMIT_ORDER_RATIO, MARKET_ORDER_RATIO, MID_PRICE, PRICE_SPREAD};
use crate::order::{Order, OrderKind, OrderMessage, Side};
use crate::platform;
use crate::ring::Producer;
use crate::stats::EngineStats;

const INSTRUMENTS: u64 = 100;

pub struct Gateway {
    rng: ChaCha8Rng,
    total_orders: usize,
    next_id: u64,
}

impl Gateway {
    pub fn new(total_orders: usize, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            total_orders,
            next_id: 1,
        }
    }

    /// Produce the whole session, respecting back-pressure. Returns the
    /// number of messages actually published.
    pub fn run(
        &mut self,
        output: &mut Producer<'_, OrderMessage>,
        stats: &EngineStats,
    ) -> usize {
        let mut published = 0;
        for _ in 0..self.total_orders {
            if !stats.running() {
                break;
            }
            let msg = self.next_message();

            let mut pending = msg;
            loop {
                match output.push(pending) {
                    Ok(()) => break,
                    Err(back) => {
                        pending = back;
                        stats.ring_buffer_full.fetch_add(1, Ordering::Relaxed);
                        std::thread::yield_now();
                    }
                }
            }

            stats.orders_received.fetch_add(1, Ordering::Relaxed);
            published += 1;
        }
        debug!(published, "gateway finished");
        published
    }

    /// Draw the next message from the synthetic flow. Exposed so benches
    /// and tools can drive the matcher without a ring in between.
    pub fn next_message(&mut self) -> OrderMessage {
        let roll: f64 = self.rng.gen();
        if roll < LIMIT_ORDER_RATIO {
            OrderMessage::limit(self.fill_order(OrderKind::Limit))
        } else if roll < LIMIT_ORDER_RATIO + MARKET_ORDER_RATIO {
            OrderMessage::market(self.fill_order(OrderKind::Market))
        } else {
            OrderMessage::cancel(self.cancel_target())
        }
    }

    fn fill_order(&mut self, kind: OrderKind) -> Order {
        let id = self.next_id;
        self.next_id += 1;

        let qty = self.rng.gen_range(1..1000u32);
        let price = match kind {
            // Market orders carry no price.
            OrderKind::Market => 0,
            _ => (MID_PRICE + self.rng.gen_range(-PRICE_SPREAD..=PRICE_SPREAD)).max(1),
        };

        Order {
            id,
            instrument_id: self.rng.gen_range(0..INSTRUMENTS),
            price,
            quantity: qty,
            remaining_qty: qty,
            timestamp: platform::timestamp_ns(),
            side: if self.rng.gen_bool(0.5) {
                Side::Bid
            } else {
                Side::Ask
            },
            kind,
            active: true,
            ..Order::default()
        }
    }

    fn cancel_target(&mut self) -> u64 {
        if self.next_id <= 1 {
            return 1;
        }
        self.rng.gen_range(1..self.next_id)
    }
}
