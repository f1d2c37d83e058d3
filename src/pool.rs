//! Fixed-capacity node pool with an embedded free list.
//!
//! Every resting order lives in this single pre-allocated array; inter-node
//! links are 32-bit indices, not pointers. `INVALID` is the sentinel that
//! terminates both the free list and a `PriceLevel`'s FIFO chain.

use crate::types::{OrderId, Price, Side};

pub type NodeHandle = u32;

/// `u32::MAX` never denotes a live node — `max_orders` is bounded far below it.
pub const INVALID: NodeHandle = u32::MAX;

/// A resident order. 64 bytes, cache-line aligned, so a `PriceLevel`
/// traversal touches exactly one node per cache line.
#[repr(align(64))]
#[derive(Copy, Clone, Debug)]
pub struct OrderNode {
    pub order_id: OrderId,
    pub price: Price,
    pub qty: i32,
    pub next: NodeHandle,
    pub side: Side,
}

impl OrderNode {
    fn empty() -> Self {
        Self {
            order_id: 0,
            price: Price::define(0),
            qty: 0,
            next: INVALID,
            side: Side::Bid,
        }
    }
}

const _: () = assert!(std::mem::size_of::<OrderNode>() == 64);

/// Fixed-capacity allocator for `OrderNode`s. Single-threaded: the book is
/// the pool's only owner, accessed exclusively from the consumer thread.
pub struct NodePool {
    nodes: Vec<OrderNode>,
    free_head: NodeHandle,
}

impl NodePool {
    pub fn new(capacity: usize) -> Self {
        let mut nodes = vec![OrderNode::empty(); capacity];
        for (i, node) in nodes.iter_mut().enumerate() {
            node.next = if i + 1 < capacity {
                (i + 1) as NodeHandle
            } else {
                INVALID
            };
        }
        Self {
            nodes,
            free_head: if capacity == 0 { INVALID } else { 0 },
        }
    }

    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// O(1): pop the free-list head, or `INVALID` if the pool is exhausted.
    pub fn alloc(&mut self) -> NodeHandle {
        let idx = self.free_head;
        if idx == INVALID {
            return INVALID;
        }
        self.free_head = self.nodes[idx as usize].next;
        idx
    }

    /// O(1): push `h` back onto the free list. Caller guarantees `h` is live.
    pub fn free(&mut self, h: NodeHandle) {
        debug_assert!(h != INVALID, "freeing the INVALID sentinel");
        self.nodes[h as usize].next = self.free_head;
        self.free_head = h;
    }

    #[inline]
    pub fn get(&self, h: NodeHandle) -> &OrderNode {
        &self.nodes[h as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, h: NodeHandle) -> &mut OrderNode {
        &mut self.nodes[h as usize]
    }

    /// Number of slots currently on the free list — O(capacity), test-only.
    #[cfg(test)]
    pub fn free_count(&self) -> usize {
        let mut n = 0;
        let mut cur = self.free_head;
        while cur != INVALID {
            n += 1;
            cur = self.nodes[cur as usize].next;
        }
        n
    }

    /// Head of the free list, for invariant checks that want to walk it.
    #[cfg(test)]
    pub fn free_head_for_test(&self) -> NodeHandle {
        self.free_head
    }
}
