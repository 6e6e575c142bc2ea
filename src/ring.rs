//! Wait-free SPSC ring between the gateway and the matcher.
//!
//! One writer, one reader, no CAS. The two counters grow monotonically and
//! are masked into the power-of-two slot array; each lives on its own cache
//! line so the producer and consumer cores never ping-pong a line between
//! them. Elements are carried by copy (`T: Copy`, the moral equivalent of
//! the trivially-copyable bound the layout depends on).
//!
//! Ordering protocol:
//! - producer: relaxed load of its own `tail`, acquire load of `head` for
//!   the fullness check, slot write, release store of `tail`
//! - consumer: relaxed load of its own `head`, acquire load of `tail` for
//!   the emptiness check, slot read, release store of `head`
//!
//! The consumer's acquire of `tail` pairs with the producer's release, so a
//! slot write is visible before the index that publishes it. Fullness uses
//! unsigned difference (`tail - head > mask`), correct across counter wrap;
//! all `capacity` slots are usable.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

use crate::arena::Arena;
use crate::error::EngineError;

struct Slot<T>(UnsafeCell<MaybeUninit<T>>);

pub struct SpscRing<'a, T: Copy> {
    /// Written by the consumer only.
    head: CachePadded<AtomicU64>,
    /// Written by the producer only.
    tail: CachePadded<AtomicU64>,
    slots: &'a [Slot<T>],
    mask: u64,
}

// Safety: a slot is accessed by at most one thread at a time. The producer
// writes a slot strictly before its release store of `tail`; the consumer
// reads it strictly after its acquire load of `tail`, and the slot is not
// reused until the consumer's release store of `head` is observed by the
// producer's acquire load. Handles created by `split` enforce a single
// writer and a single reader.
unsafe impl<T: Copy + Send> Sync for SpscRing<'_, T> {}
unsafe impl<T: Copy + Send> Send for SpscRing<'_, T> {}

impl<'a, T: Copy> SpscRing<'a, T> {
    /// Carve the slot array from the arena. Capacity must be a power of two.
    pub fn new(arena: &'a Arena, capacity: usize) -> Result<Self, EngineError> {
        if !capacity.is_power_of_two() {
            return Err(EngineError::CapacityNotPowerOfTwo(capacity));
        }
        let slots =
            arena.alloc_slice_with(capacity, || Slot(UnsafeCell::new(MaybeUninit::uninit())))?;
        Ok(Self {
            head: CachePadded::new(AtomicU64::new(0)),
            tail: CachePadded::new(AtomicU64::new(0)),
            slots,
            mask: (capacity - 1) as u64,
        })
    }

    /// Hand out the single-writer and single-reader endpoints. The exclusive
    /// borrow guarantees no other handles exist for its duration.
    pub fn split(&mut self) -> (Producer<'_, T>, Consumer<'_, T>) {
        let ring: &SpscRing<'_, T> = self;
        (Producer { ring }, Consumer { ring })
    }

    /// Number of queued elements. Racy by nature; exact only when quiescent.
    #[inline]
    pub fn len(&self) -> usize {
        let t = self.tail.load(Ordering::Relaxed);
        let h = self.head.load(Ordering::Relaxed);
        t.wrapping_sub(h) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        (self.mask + 1) as usize
    }
}

/// Writing endpoint. `!Clone`; exactly one may exist.
pub struct Producer<'r, T: Copy> {
    ring: &'r SpscRing<'r, T>,
}

impl<T: Copy> Producer<'_, T> {
    /// Copy `value` into the next slot. On a full ring the value is handed
    /// back unchanged so the caller can apply back-pressure and retry.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), T> {
        let ring = self.ring;
        let tail = ring.tail.load(Ordering::Relaxed);
        let head = ring.head.load(Ordering::Acquire);
        if tail.wrapping_sub(head) > ring.mask {
            return Err(value);
        }
        let slot = &ring.slots[(tail & ring.mask) as usize];
        // Safety: this slot is not visible to the consumer until the release
        // store below, and the fullness check proves the consumer is done
        // with its previous occupant.
        unsafe { (*slot.0.get()).write(value) };
        ring.tail.store(tail.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        let head = self.ring.head.load(Ordering::Acquire);
        tail.wrapping_sub(head) > self.ring.mask
    }
}

/// Reading endpoint. `!Clone`; exactly one may exist.
pub struct Consumer<'r, T: Copy> {
    ring: &'r SpscRing<'r, T>,
}

impl<T: Copy> Consumer<'_, T> {
    /// Move the oldest element out, or `None` on an empty ring.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let ring = self.ring;
        let head = ring.head.load(Ordering::Relaxed);
        let tail = ring.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        let slot = &ring.slots[(head & ring.mask) as usize];
        // Safety: the acquire load of `tail` makes the producer's slot write
        // visible, and the producer will not reuse the slot before observing
        // the head advance below.
        let value = unsafe { (*slot.0.get()).assume_init_read() };
        ring.head.store(head.wrapping_add(1), Ordering::Release);
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_power_of_two_rejected() {
        let arena = Arena::new(4096).unwrap();
        assert!(matches!(
            SpscRing::<u64>::new(&arena, 6),
            Err(EngineError::CapacityNotPowerOfTwo(6))
        ));
    }

    #[test]
    fn push_pop_fifo() {
        let arena = Arena::new(4096).unwrap();
        let mut ring = SpscRing::new(&arena, 8).unwrap();
        let (mut tx, mut rx) = ring.split();

        for v in 0u64..5 {
            tx.push(v).unwrap();
        }
        for v in 0u64..5 {
            assert_eq!(rx.pop(), Some(v));
        }
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn full_ring_applies_back_pressure() {
        let arena = Arena::new(4096).unwrap();
        let mut ring = SpscRing::new(&arena, 4).unwrap();
        let (mut tx, mut rx) = ring.split();

        for v in 0u64..4 {
            assert!(tx.push(v).is_ok());
        }
        // Fifth push reports full and returns the value unchanged.
        assert_eq!(tx.push(99), Err(99));
        assert!(tx.is_full());

        assert_eq!(rx.pop(), Some(0));
        assert!(tx.push(99).is_ok());

        let drained: Vec<u64> = std::iter::from_fn(|| rx.pop()).collect();
        assert_eq!(drained, vec![1, 2, 3, 99]);
    }

    #[test]
    fn counters_survive_wraparound_volume() {
        let arena = Arena::new(4096).unwrap();
        let mut ring = SpscRing::new(&arena, 2).unwrap();
        let (mut tx, mut rx) = ring.split();

        // Many times around the mask; indices stay coherent.
        for v in 0u64..1000 {
            tx.push(v).unwrap();
            assert_eq!(rx.pop(), Some(v));
        }
        assert_eq!(rx.pop(), None);
        drop(tx);
        drop(rx);
        assert!(ring.is_empty());
    }
}
