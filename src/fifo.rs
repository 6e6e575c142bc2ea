//! Intrusive FIFO of orders linked through the `next` field.
//!
//! The link lives inside `Order`, so appending never allocates and its cost
//! does not depend on how deep the queue already is. That property is the
//! whole reason a price level is not a growable vector: a level under quote
//! stuffing keeps absorbing orders at a flat cost.
//!
//! Cancelled and fully filled nodes stay linked until `compact` runs;
//! traversals skip them by checking `active` and `remaining_qty`.

use crate::order::{Order, OrderIdx, NULL_INDEX};
use crate::pool::OrderPool;

#[derive(Clone, Copy, Debug)]
pub struct OrderFifo {
    head: OrderIdx,
    tail: OrderIdx,
    count: u32,
}

impl Default for OrderFifo {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderFifo {
    pub const fn new() -> Self {
        Self {
            head: NULL_INDEX,
            tail: NULL_INDEX,
            count: 0,
        }
    }

    /// Append at the tail. O(1), zero allocation, regardless of length.
    /// The caller must guarantee the node is not linked anywhere else.
    #[inline]
    pub fn push_back(&mut self, pool: &mut OrderPool, idx: OrderIdx) {
        pool.get_mut(idx).next = NULL_INDEX;
        if self.tail == NULL_INDEX {
            self.head = idx;
        } else {
            pool.get_mut(self.tail).next = idx;
        }
        self.tail = idx;
        self.count += 1;
    }

    /// Fill up to `qty` units walking from the head in arrival order.
    /// Dead nodes are skipped; a node reaching zero remaining is deactivated.
    /// Returns the total quantity filled.
    pub fn fill(&mut self, pool: &mut OrderPool, mut qty: u32) -> u32 {
        let mut filled = 0;
        let mut cur = self.head;
        while cur != NULL_INDEX && qty > 0 {
            let order = pool.get_mut(cur);
            if order.active && order.remaining_qty > 0 {
                let take = order.remaining_qty.min(qty);
                order.remaining_qty -= take;
                qty -= take;
                filled += take;
                if order.remaining_qty == 0 {
                    order.active = false;
                }
            }
            cur = order.next;
        }
        filled
    }

    /// Unlink every inactive or zero-quantity node. O(length); maintenance
    /// only, never on the message path. Unlinked nodes keep their payload;
    /// the caller decides when their slots go back to the pool.
    pub fn compact(&mut self, pool: &mut OrderPool) {
        let mut prev = NULL_INDEX;
        let mut cur = self.head;
        while cur != NULL_INDEX {
            let order = pool.get(cur);
            let next = order.next;
            if !order.active || order.remaining_qty == 0 {
                if prev == NULL_INDEX {
                    self.head = next;
                } else {
                    pool.get_mut(prev).next = next;
                }
                if cur == self.tail {
                    self.tail = prev;
                }
                pool.get_mut(cur).next = NULL_INDEX;
                self.count -= 1;
            } else {
                prev = cur;
            }
            cur = next;
        }
    }

    /// Walk the list, dead nodes included.
    pub fn iter<'p>(&self, pool: &'p OrderPool<'p>) -> impl Iterator<Item = &'p Order> + 'p {
        let mut cur = self.head;
        std::iter::from_fn(move || {
            if cur == NULL_INDEX {
                return None;
            }
            let order = pool.get(cur);
            cur = order.next;
            Some(order)
        })
    }

    #[inline]
    pub fn head(&self) -> OrderIdx {
        self.head
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == NULL_INDEX
    }
}
