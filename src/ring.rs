//! Single-producer/single-consumer ring buffer.
//!
//! Capacity is a power of two so the index mask replaces a modulo. `head`
//! and `tail` are monotonically increasing counters (never wrapped to the
//! buffer range until the final `& mask`), each on its own cache line so
//! producer and consumer stores don't false-share.

use crate::error::BookError;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU64, Ordering};

#[repr(align(64))]
struct CachePadded<T>(T);

pub struct SpscRing<T> {
    buffer: Box<[UnsafeCell<MaybeUninit<T>>]>,
    mask: u64,
    head: CachePadded<AtomicU64>,
    tail: CachePadded<AtomicU64>,
}

// SAFETY: push is only ever called from the producer and pop only from the
// consumer; the atomics at the publish points establish the happens-before
// edges that make handing `T` across threads sound.
unsafe impl<T: Send> Send for SpscRing<T> {}
unsafe impl<T: Send> Sync for SpscRing<T> {}

impl<T> SpscRing<T> {
    pub fn new(capacity: usize) -> Result<Self, BookError> {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(BookError::RingCapacityNotPowerOfTwo { capacity });
        }

        let mut buffer = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            buffer.push(UnsafeCell::new(MaybeUninit::uninit()));
        }

        Ok(Self {
            buffer: buffer.into_boxed_slice(),
            mask: (capacity - 1) as u64,
            head: CachePadded(AtomicU64::new(0)),
            tail: CachePadded(AtomicU64::new(0)),
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Producer side. `false` if the ring is full — `item` is handed back.
    pub fn push(&self, item: T) -> Result<(), T> {
        let head = self.head.0.load(Ordering::Relaxed);
        let next_head = head + 1;
        let tail = self.tail.0.load(Ordering::Acquire);

        if next_head - tail > self.capacity() as u64 {
            return Err(item);
        }

        let idx = (head & self.mask) as usize;
        // SAFETY: this slot is not readable by the consumer until the
        // `head.store(Release)` below publishes it, and no other producer
        // exists to race this write.
        unsafe {
            (*self.buffer[idx].get()).write(item);
        }
        self.head.0.store(next_head, Ordering::Release);
        Ok(())
    }

    /// Consumer side. `None` if the ring is empty.
    pub fn pop(&self) -> Option<T> {
        let tail = self.tail.0.load(Ordering::Relaxed);
        let head = self.head.0.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        let idx = (tail & self.mask) as usize;
        // SAFETY: `head` was loaded with Acquire after the producer's
        // Release store that published this slot, so the write above is
        // visible; no other consumer exists to race this read.
        let item = unsafe { (*self.buffer[idx].get()).assume_init_read() };
        self.tail.0.store(tail + 1, Ordering::Release);
        Some(item)
    }

    /// Approximate occupancy — only exact when called from a thread that
    /// cannot race a concurrent push/pop (e.g. by the sole producer or
    /// sole consumer, or after both threads have joined).
    pub fn len(&self) -> usize {
        let head = self.head.0.load(Ordering::Acquire);
        let tail = self.tail.0.load(Ordering::Acquire);
        (head - tail) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Drop for SpscRing<T> {
    fn drop(&mut self) {
        let mut tail = *self.tail.0.get_mut();
        let head = *self.head.0.get_mut();
        while tail != head {
            let idx = (tail & self.mask) as usize;
            unsafe {
                (*self.buffer[idx].get()).assume_init_drop();
            }
            tail += 1;
        }
    }
}
