//! A price level: the FIFO of resting orders at one fixed-point price, plus
//! a cached aggregate quantity.
//!
//! The cache is the only constant-time signal the book has for "is this
//! level matchable", so every path that changes resting quantity (fill,
//! external cancel, append) must keep it in step. The FIFO itself may hold
//! dead nodes until compaction; the cache never counts them.

use crate::fifo::OrderFifo;
use crate::order::OrderIdx;
use crate::pool::OrderPool;

#[derive(Clone, Copy, Debug)]
pub struct PriceLevel {
    price: i64,
    cached_qty: u32,
    orders: OrderFifo,
}

impl PriceLevel {
    pub const fn new(price: i64) -> Self {
        Self {
            price,
            cached_qty: 0,
            orders: OrderFifo::new(),
        }
    }

    /// Append a resting order and account for its remaining quantity. O(1).
    #[inline]
    pub fn add_order(&mut self, pool: &mut OrderPool, idx: OrderIdx) {
        self.cached_qty += pool.get(idx).remaining_qty;
        self.orders.push_back(pool, idx);
    }

    /// Fill up to `qty` units in FIFO order. Returns the filled amount and
    /// subtracts it from the cache.
    #[inline]
    pub fn fill(&mut self, pool: &mut OrderPool, qty: u32) -> u32 {
        let filled = self.orders.fill(pool, qty);
        debug_assert!(filled <= self.cached_qty);
        self.cached_qty = self.cached_qty.saturating_sub(filled);
        filled
    }

    /// Subtract externally cancelled quantity, saturating at zero, so later
    /// matching passes see the correct aggregate without compacting first.
    #[inline]
    pub fn reduce_qty(&mut self, amount: u32) {
        self.cached_qty = self.cached_qty.saturating_sub(amount);
    }

    /// Unlink dead nodes. Maintenance only.
    pub fn compact(&mut self, pool: &mut OrderPool) {
        self.orders.compact(pool);
    }

    #[inline]
    pub fn price(&self) -> i64 {
        self.price
    }

    /// Sum of remaining quantity over live orders, modulo lazy compaction.
    #[inline]
    pub fn total_qty(&self) -> u32 {
        self.cached_qty
    }

    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> &OrderFifo {
        &self.orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::order::Side;

    fn resting(pool: &mut OrderPool, id: u64, price: i64, qty: u32) -> OrderIdx {
        let idx = pool.acquire().unwrap();
        let o = pool.get_mut(idx);
        o.id = id;
        o.price = price;
        o.quantity = qty;
        o.remaining_qty = qty;
        o.side = Side::Bid;
        o.active = true;
        idx
    }

    #[test]
    fn add_accumulates_cache() {
        let arena = Arena::new(1 << 16).unwrap();
        let mut pool = OrderPool::new(&arena, 8).unwrap();
        let mut level = PriceLevel::new(10_000);

        let a = resting(&mut pool, 1, 10_000, 50);
        let b = resting(&mut pool, 2, 10_000, 25);
        level.add_order(&mut pool, a);
        level.add_order(&mut pool, b);

        assert_eq!(level.total_qty(), 75);
        assert_eq!(level.order_count(), 2);
    }

    #[test]
    fn fill_drains_cache_with_orders() {
        let arena = Arena::new(1 << 16).unwrap();
        let mut pool = OrderPool::new(&arena, 8).unwrap();
        let mut level = PriceLevel::new(10_000);

        let a = resting(&mut pool, 1, 10_000, 40);
        level.add_order(&mut pool, a);

        assert_eq!(level.fill(&mut pool, 15), 15);
        assert_eq!(level.total_qty(), 25);
        assert_eq!(pool.get(a).remaining_qty, 25);

        assert_eq!(level.fill(&mut pool, 100), 25);
        assert_eq!(level.total_qty(), 0);
        assert!(!pool.get(a).active);
    }

    #[test]
    fn reduce_qty_saturates() {
        let arena = Arena::new(1 << 16).unwrap();
        let mut pool = OrderPool::new(&arena, 8).unwrap();
        let mut level = PriceLevel::new(10_000);

        let a = resting(&mut pool, 1, 10_000, 10);
        level.add_order(&mut pool, a);

        level.reduce_qty(4);
        assert_eq!(level.total_qty(), 6);
        level.reduce_qty(100);
        assert_eq!(level.total_qty(), 0);
    }

    #[test]
    fn cache_matches_live_sum_after_compact() {
        let arena = Arena::new(1 << 16).unwrap();
        let mut pool = OrderPool::new(&arena, 8).unwrap();
        let mut level = PriceLevel::new(10_000);

        for id in 1..=4u64 {
            let idx = resting(&mut pool, id, 10_000, 10 * id as u32);
            level.add_order(&mut pool, idx);
        }
        level.fill(&mut pool, 35);
        level.compact(&mut pool);

        let live_sum: u32 = level
            .orders()
            .iter(&pool)
            .filter(|o| o.active)
            .map(|o| o.remaining_qty)
            .sum();
        assert_eq!(level.total_qty(), live_sum);
    }
}
