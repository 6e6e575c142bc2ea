//! The limit order book: dense bid/ask level arrays indexed by normalized
//! price, a direct-mapped id table for O(1) cancel, and best-price cursors.
//!
//! Levels are flat arrays rather than maps: the level for a price is a
//! divide and a clamp away, and both sides share the index space. Index 0
//! doubles as the "nothing resting" cursor sentinel on either side, so the
//! usable grid starts one tick above zero.
//!
//! Cancel is lazy: the order is deactivated and its quantity drained from
//! the level cache, but the node stays linked until `compact` sweeps it out
//! and returns its slot to the pool.

use crate::config::{ID_SLOTS, MAX_PRICE_LEVELS, PRICE_MULTIPLIER};
use crate::order::{Order, OrderIdx, Side, NULL_INDEX};
use crate::pool::OrderPool;
use crate::price_level::PriceLevel;

/// Fixed-point price distance between adjacent level indices.
const TICK: i64 = PRICE_MULTIPLIER / 100;

pub struct OrderBook {
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
    /// Direct-mapped id -> pool index table; `NULL_INDEX` marks a free slot.
    /// On a masked-id collision the most recent writer wins.
    id_map: Vec<OrderIdx>,
    /// Highest occupied bid index; 0 means no resting bids.
    best_bid_idx: usize,
    /// Lowest occupied ask index; 0 means no resting asks.
    best_ask_idx: usize,
    match_count: u64,
    cancel_count: u64,
    /// Scratch for compaction sweeps, allocated once.
    reclaim: Vec<OrderIdx>,
}

impl OrderBook {
    /// Allocate both sides and the id table. Done once at startup; the
    /// vectors never grow afterwards.
    pub fn new() -> Self {
        let side = || {
            (0..MAX_PRICE_LEVELS)
                .map(|i| PriceLevel::new(i as i64 * TICK))
                .collect::<Vec<_>>()
        };
        Self {
            bids: side(),
            asks: side(),
            id_map: vec![NULL_INDEX; ID_SLOTS],
            best_bid_idx: 0,
            best_ask_idx: 0,
            match_count: 0,
            cancel_count: 0,
            reclaim: Vec::with_capacity(1024),
        }
    }

    /// Map a fixed-point price onto the level grid. Out-of-range prices,
    /// negative ones included, pin to the top index. The grid is finite by
    /// configuration; callers own keeping their price domain inside it.
    #[inline]
    pub fn price_to_index(price: i64) -> usize {
        if price < 0 {
            return MAX_PRICE_LEVELS - 1;
        }
        let idx = (price.saturating_mul(100) / PRICE_MULTIPLIER) as usize;
        idx.min(MAX_PRICE_LEVELS - 1)
    }

    /// Rest a limit order: activate it, register it for cancel lookup,
    /// append it to its level FIFO, and advance the side's cursor. O(1).
    pub fn add_order(&mut self, pool: &mut OrderPool, idx: OrderIdx) {
        let (id, side, price) = {
            let order = pool.get_mut(idx);
            order.active = true;
            (order.id, order.side, order.price)
        };
        let level_idx = Self::price_to_index(price);

        self.id_map[(id & (ID_SLOTS as u64 - 1)) as usize] = idx;

        match side {
            Side::Bid => {
                self.bids[level_idx].add_order(pool, idx);
                if level_idx > self.best_bid_idx {
                    self.best_bid_idx = level_idx;
                }
            }
            Side::Ask => {
                self.asks[level_idx].add_order(pool, idx);
                if self.best_ask_idx == 0 || level_idx < self.best_ask_idx {
                    self.best_ask_idx = level_idx;
                }
            }
        }
    }

    /// Cancel by id. O(1). Returns false for unknown, stale, or already
    /// dead ids. The node stays in its FIFO for compaction to reap; the
    /// level cache is corrected immediately so matching stays honest.
    pub fn cancel_order(&mut self, pool: &mut OrderPool, order_id: u64) -> bool {
        let slot = (order_id & (ID_SLOTS as u64 - 1)) as usize;
        let idx = self.id_map[slot];
        if idx == NULL_INDEX {
            return false;
        }
        let (id, side, price, remaining, active) = {
            let o = pool.get(idx);
            (o.id, o.side, o.price, o.remaining_qty, o.active)
        };
        if id != order_id || !active {
            return false;
        }

        let level_idx = Self::price_to_index(price);
        match side {
            Side::Bid => self.bids[level_idx].reduce_qty(remaining),
            Side::Ask => self.asks[level_idx].reduce_qty(remaining),
        }

        let order = pool.get_mut(idx);
        order.active = false;
        order.remaining_qty = 0;
        self.id_map[slot] = NULL_INDEX;
        self.cancel_count += 1;
        true
    }

    /// Cross the book while the best bid price is at or above the best ask
    /// price. Fills the overlapping quantity level against level, skipping
    /// drained levels by advancing the cursors. Returns total units filled.
    pub fn match_crossing(&mut self, pool: &mut OrderPool) -> u64 {
        let mut total_filled = 0u64;

        while self.best_bid_idx > 0
            && self.best_ask_idx > 0
            && self.best_bid_idx < MAX_PRICE_LEVELS
            && self.best_ask_idx < MAX_PRICE_LEVELS
        {
            if self.bids[self.best_bid_idx].price() < self.asks[self.best_ask_idx].price() {
                break;
            }

            let bid_qty = self.bids[self.best_bid_idx].total_qty();
            let ask_qty = self.asks[self.best_ask_idx].total_qty();

            if bid_qty == 0 {
                // Nothing live at this bid level; walk down.
                self.best_bid_idx -= 1;
                continue;
            }
            if ask_qty == 0 {
                // Nothing live at this ask level; walk up.
                self.best_ask_idx += 1;
                continue;
            }

            let match_qty = bid_qty.min(ask_qty);
            self.bids[self.best_bid_idx].fill(pool, match_qty);
            self.asks[self.best_ask_idx].fill(pool, match_qty);
            total_filled += match_qty as u64;
            self.match_count += 1;

            if self.bids[self.best_bid_idx].total_qty() == 0 && self.best_bid_idx > 0 {
                self.best_bid_idx -= 1;
            }
            if self.asks[self.best_ask_idx].total_qty() == 0 {
                self.best_ask_idx += 1;
            }
        }

        total_filled
    }

    /// Sweep a market order across the opposite side, best price outward,
    /// until it is drained or the book runs out. The order itself is never
    /// linked into a level. Returns total units filled.
    pub fn match_market(&mut self, pool: &mut OrderPool, order: &mut Order) -> u64 {
        let mut filled = 0u64;

        match order.side {
            Side::Bid => {
                // Market buy: consume asks at ascending prices.
                let mut i = self.best_ask_idx;
                while i < MAX_PRICE_LEVELS && order.remaining_qty > 0 {
                    let fill = self.asks[i].fill(pool, order.remaining_qty);
                    order.remaining_qty -= fill;
                    filled += fill as u64;
                    if self.asks[i].total_qty() == 0 && i == self.best_ask_idx {
                        self.best_ask_idx += 1;
                    }
                    i += 1;
                }
            }
            Side::Ask => {
                // Market sell: consume bids at descending prices. The walk
                // is a loop with an explicit stop at index zero, so the
                // cursor can never wrap below the start of the grid.
                let mut i = self.best_bid_idx;
                loop {
                    if order.remaining_qty == 0 {
                        break;
                    }
                    let fill = self.bids[i].fill(pool, order.remaining_qty);
                    order.remaining_qty -= fill;
                    filled += fill as u64;
                    if self.bids[i].total_qty() == 0 && i == self.best_bid_idx && self.best_bid_idx > 0 {
                        self.best_bid_idx -= 1;
                    }
                    if i == 0 {
                        break;
                    }
                    i -= 1;
                }
            }
        }

        if filled > 0 {
            self.match_count += 1;
        }
        filled
    }

    /// Sweep both sides: unlink every dead node, clear its id-map entry if
    /// it still owns one, and hand its slot back to the pool. O(resting
    /// orders); maintenance only.
    pub fn compact(&mut self, pool: &mut OrderPool) {
        let Self {
            bids,
            asks,
            id_map,
            reclaim,
            ..
        } = self;
        Self::compact_side(bids, pool, id_map, reclaim);
        Self::compact_side(asks, pool, id_map, reclaim);
    }

    fn compact_side(
        levels: &mut [PriceLevel],
        pool: &mut OrderPool,
        id_map: &mut [OrderIdx],
        reclaim: &mut Vec<OrderIdx>,
    ) {
        for level in levels.iter_mut() {
            if level.is_empty() {
                continue;
            }
            reclaim.clear();
            let mut cur = level.orders().head();
            while cur != NULL_INDEX {
                let o = pool.get(cur);
                let next = o.next;
                if !o.active || o.remaining_qty == 0 {
                    reclaim.push(cur);
                }
                cur = next;
            }
            if reclaim.is_empty() {
                continue;
            }
            level.compact(pool);
            for &idx in reclaim.iter() {
                let id = pool.get(idx).id;
                let slot = (id & (ID_SLOTS as u64 - 1)) as usize;
                if id_map[slot] == idx {
                    id_map[slot] = NULL_INDEX;
                }
                pool.release(idx);
            }
        }
    }

    /// Price at the bid cursor, or 0 when the cursor has walked off the
    /// grid (draining the top-most occupied level leaves it one past the
    /// end).
    #[inline]
    pub fn best_bid_price(&self) -> i64 {
        if self.best_bid_idx < MAX_PRICE_LEVELS {
            self.bids[self.best_bid_idx].price()
        } else {
            0
        }
    }

    /// Price at the ask cursor, or 0 when the cursor has walked off the
    /// grid.
    #[inline]
    pub fn best_ask_price(&self) -> i64 {
        if self.best_ask_idx < MAX_PRICE_LEVELS {
            self.asks[self.best_ask_idx].price()
        } else {
            0
        }
    }

    #[inline]
    pub fn best_bid_idx(&self) -> usize {
        self.best_bid_idx
    }

    #[inline]
    pub fn best_ask_idx(&self) -> usize {
        self.best_ask_idx
    }

    pub fn bid_level(&self, idx: usize) -> &PriceLevel {
        &self.bids[idx]
    }

    pub fn ask_level(&self, idx: usize) -> &PriceLevel {
        &self.asks[idx]
    }

    #[inline]
    pub fn match_count(&self) -> u64 {
        self.match_count
    }

    #[inline]
    pub fn cancel_count(&self) -> u64 {
        self.cancel_count
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}
