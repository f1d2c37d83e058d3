//! Dense price-level table: one `PriceLevel` per tick, per side.
//!
//! `level_index(p) = p - min_price`. Each level is a singly linked FIFO
//! threaded through `OrderNode::next`; append is O(1) at the tail, removal
//! by handle is an O(level depth) scan from the head (spec Section 4.2 —
//! acceptable because per-level queues are short in the target workload).

use crate::pool::{NodeHandle, NodePool, INVALID};
use crate::types::Price;

/// One slot in a side's dense array. Cache-line aligned like `OrderNode`.
#[repr(align(64))]
#[derive(Copy, Clone, Debug)]
pub struct PriceLevel {
    pub head: NodeHandle,
    pub tail: NodeHandle,
    pub price: Price,
    pub total_qty: i64,
}

impl Default for PriceLevel {
    fn default() -> Self {
        Self {
            head: INVALID,
            tail: INVALID,
            price: Price::define(0),
            total_qty: 0,
        }
    }
}

impl PriceLevel {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == INVALID
    }

    /// Append `handle` to the tail of this level's FIFO.
    pub fn push_back(&mut self, handle: NodeHandle, price: Price, pool: &mut NodePool) {
        if self.is_empty() {
            self.head = handle;
            self.tail = handle;
            self.price = price;
        } else {
            pool.get_mut(self.tail).next = handle;
            self.tail = handle;
        }
    }

    /// Unlink `handle` from this level's FIFO. Caller guarantees `handle`
    /// is actually present; returns `false` if the scan did not find it
    /// (a contract violation — should not occur under correct callers).
    pub fn unlink(&mut self, handle: NodeHandle, pool: &mut NodePool) -> bool {
        let mut prev = INVALID;
        let mut cur = self.head;

        while cur != INVALID {
            if cur == handle {
                break;
            }
            prev = cur;
            cur = pool.get(cur).next;
        }

        if cur == INVALID {
            return false;
        }

        let next = pool.get(cur).next;
        if prev == INVALID {
            self.head = next;
        } else {
            pool.get_mut(prev).next = next;
        }
        if self.tail == handle {
            self.tail = prev;
        }
        true
    }
}

/// One side's dense array of `PriceLevel`, indexed by `price - min_price`.
pub struct LevelTable {
    min_price: i64,
    levels: Vec<PriceLevel>,
}

impl LevelTable {
    pub fn new(min_price: i64, max_price: i64) -> Self {
        let num_levels = (max_price - min_price + 1) as usize;
        Self {
            min_price,
            levels: vec![PriceLevel::default(); num_levels],
        }
    }

    #[inline]
    pub fn index_of(&self, price: Price) -> usize {
        (price.value() - self.min_price) as usize
    }

    #[inline]
    pub fn get(&self, price: Price) -> &PriceLevel {
        &self.levels[self.index_of(price)]
    }

    #[inline]
    pub fn get_mut(&mut self, price: Price) -> &mut PriceLevel {
        let idx = self.index_of(price);
        &mut self.levels[idx]
    }

    #[inline]
    pub fn at_index(&self, idx: usize) -> &PriceLevel {
        &self.levels[idx]
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }
}
