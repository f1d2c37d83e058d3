//! The order book engine: bounded price range, fixed-capacity node pool,
//! O(1) best-price maintenance for the common case. Every operation here is
//! on the hot path (spec Section 4.3).

use crate::error::BookError;
use crate::level::LevelTable;
use crate::pool::{NodeHandle, NodePool, INVALID};
use crate::types::{MarketUpdate, OrderId, Price, Side, UpdateKind};

/// A copy of a `PriceLevel`'s observable state, returned from `best_bid`/
/// `best_ask` so callers don't borrow the book.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LevelSnapshot {
    pub price: Price,
    pub total_qty: i64,
}

pub struct OrderBook {
    min_price: i64,
    max_price: i64,
    max_orders: usize,

    bids: LevelTable,
    asks: LevelTable,
    pool: NodePool,
    id_index: Vec<NodeHandle>,

    best_bid_price: i64,
    best_ask_price: i64,

    /// Observability-only counter: Adds dropped because the pool was
    /// exhausted. Not part of any invariant; never read by the core itself.
    pub adds_dropped: u64,
}

impl OrderBook {
    pub fn new(min_price: i64, max_price: i64, max_orders: usize) -> Result<Self, BookError> {
        if min_price > max_price {
            return Err(BookError::InvalidPriceRange { min_price, max_price });
        }
        if max_orders == 0 {
            return Err(BookError::ZeroCapacity);
        }

        Ok(Self {
            min_price,
            max_price,
            max_orders,
            bids: LevelTable::new(min_price, max_price),
            asks: LevelTable::new(min_price, max_price),
            pool: NodePool::new(max_orders),
            id_index: vec![INVALID; max_orders],
            // Boundary sentinels: an empty bid side reports "no bid below
            // min_price"; an empty ask side reports "no ask above max_price".
            best_bid_price: min_price - 1,
            best_ask_price: max_price + 1,
            adds_dropped: 0,
        })
    }

    #[inline]
    fn in_range(&self, price: Price) -> bool {
        let p = price.value();
        p >= self.min_price && p <= self.max_price
    }

    #[inline]
    fn levels(&self, side: Side) -> &LevelTable {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    #[inline]
    fn levels_mut(&mut self, side: Side) -> &mut LevelTable {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    /// Apply one market update. Malformed input (out-of-window price,
    /// out-of-range order id) is silently dropped — no error signaled.
    pub fn apply_update(&mut self, u: &MarketUpdate) {
        if !self.in_range(u.price) || (u.order_id as usize) >= self.max_orders {
            return;
        }

        match u.kind {
            UpdateKind::Add => self.insert(u),
            UpdateKind::Modify => self.modify(u),
            UpdateKind::Cancel => self.cancel(u),
        }
    }

    fn insert(&mut self, u: &MarketUpdate) {
        let handle = self.pool.alloc();
        if handle == INVALID {
            self.adds_dropped += 1;
            return;
        }

        {
            let node = self.pool.get_mut(handle);
            node.order_id = u.order_id;
            node.price = u.price;
            node.qty = u.qty.value() as i32;
            node.side = u.side;
            node.next = INVALID;
        }

        let level = self.levels_mut(u.side).get_mut(u.price);
        level.push_back(handle, u.price, &mut self.pool);
        level.total_qty += u.qty.value();

        match u.side {
            Side::Bid => {
                if u.price.value() > self.best_bid_price {
                    self.best_bid_price = u.price.value();
                }
            }
            Side::Ask => {
                if u.price.value() < self.best_ask_price {
                    self.best_ask_price = u.price.value();
                }
            }
        }

        self.id_index[u.order_id as usize] = handle;
    }

    fn modify(&mut self, u: &MarketUpdate) {
        let handle = self.id_index[u.order_id as usize];
        if handle == INVALID {
            return;
        }

        let (side, old_price, old_qty) = {
            let node = self.pool.get(handle);
            (node.side, node.price, node.qty)
        };

        if u.price == old_price {
            // Quantity-only modify: u.side is ignored in favor of the
            // stored node's side.
            let delta = u.qty.value() - old_qty as i64;
            self.pool.get_mut(handle).qty = u.qty.value() as i32;
            self.levels_mut(side).get_mut(old_price).total_qty += delta;
            return;
        }

        // Price change: unlink from the old level, append to the new one.
        let removed = {
            let old_level = self.levels_mut(side).get_mut(old_price);
            let removed = old_level.unlink(handle, &mut self.pool);
            if removed {
                old_level.total_qty -= old_qty as i64;
            }
            removed
        };
        if !removed {
            // Should not occur under correct callers; drop silently.
            return;
        }

        self.refresh_best_after_worsening_edit(side, old_price);

        self.pool.get_mut(handle).price = u.price;
        self.pool.get_mut(handle).qty = u.qty.value() as i32;
        self.pool.get_mut(handle).next = INVALID;

        let new_level = self.levels_mut(side).get_mut(u.price);
        new_level.push_back(handle, u.price, &mut self.pool);
        new_level.total_qty += u.qty.value();

        match side {
            Side::Bid => {
                if u.price.value() > self.best_bid_price {
                    self.best_bid_price = u.price.value();
                }
            }
            Side::Ask => {
                if u.price.value() < self.best_ask_price {
                    self.best_ask_price = u.price.value();
                }
            }
        }
    }

    fn cancel(&mut self, u: &MarketUpdate) {
        // u.price, u.qty, u.side are advisory only; the stored node is
        // authoritative.
        let handle = self.id_index[u.order_id as usize];
        if handle == INVALID {
            return;
        }

        let (side, price, qty) = {
            let node = self.pool.get(handle);
            (node.side, node.price, node.qty)
        };

        let removed = {
            let level = self.levels_mut(side).get_mut(price);
            let removed = level.unlink(handle, &mut self.pool);
            if removed {
                level.total_qty -= qty as i64;
            }
            removed
        };
        if !removed {
            return;
        }

        self.refresh_best_after_worsening_edit(side, price);

        self.pool.free(handle);
        self.id_index[u.order_id as usize] = INVALID;
    }

    /// Called after an edit that may have just emptied the best level on
    /// `side` at `vacated_price`. Rescans toward the worsening direction
    /// only if `vacated_price` was in fact the cached best.
    fn refresh_best_after_worsening_edit(&mut self, side: Side, vacated_price: Price) {
        match side {
            Side::Bid => {
                if vacated_price.value() != self.best_bid_price {
                    return;
                }
                let mut p = self.best_bid_price;
                while p >= self.min_price {
                    let idx = (p - self.min_price) as usize;
                    if !self.bids.at_index(idx).is_empty() {
                        self.best_bid_price = p;
                        return;
                    }
                    p -= 1;
                }
                self.best_bid_price = self.min_price - 1;
            }
            Side::Ask => {
                if vacated_price.value() != self.best_ask_price {
                    return;
                }
                let mut p = self.best_ask_price;
                while p <= self.max_price {
                    let idx = (p - self.min_price) as usize;
                    if !self.asks.at_index(idx).is_empty() {
                        self.best_ask_price = p;
                        return;
                    }
                    p += 1;
                }
                self.best_ask_price = self.max_price + 1;
            }
        }
    }

    /// Scans from `best_bid_price` downward, returns the first non-empty
    /// level and advances the hint to it. `false` if no bid exists.
    pub fn best_bid(&mut self) -> Option<LevelSnapshot> {
        if self.best_bid_price < self.min_price {
            return None;
        }
        let mut p = self.best_bid_price;
        while p >= self.min_price {
            let idx = (p - self.min_price) as usize;
            let level = self.bids.at_index(idx);
            if !level.is_empty() {
                self.best_bid_price = p;
                return Some(LevelSnapshot {
                    price: Price::define(p),
                    total_qty: level.total_qty,
                });
            }
            p -= 1;
        }
        self.best_bid_price = self.min_price - 1;
        None
    }

    /// Symmetric to `best_bid`, scanning upward from `best_ask_price`.
    pub fn best_ask(&mut self) -> Option<LevelSnapshot> {
        if self.best_ask_price > self.max_price {
            return None;
        }
        let mut p = self.best_ask_price;
        while p <= self.max_price {
            let idx = (p - self.min_price) as usize;
            let level = self.asks.at_index(idx);
            if !level.is_empty() {
                self.best_ask_price = p;
                return Some(LevelSnapshot {
                    price: Price::define(p),
                    total_qty: level.total_qty,
                });
            }
            p += 1;
        }
        self.best_ask_price = self.max_price + 1;
        None
    }

    /// Aggregate quantity resting at `price` on `side`; zero if out of
    /// range or empty. A free byproduct of the dense array, not a hot-path
    /// operation.
    pub fn depth_at(&self, price: Price, side: Side) -> i64 {
        if !self.in_range(price) {
            return 0;
        }
        self.levels(side).get(price).total_qty
    }

    pub fn is_order_live(&self, order_id: OrderId) -> bool {
        (order_id as usize) < self.max_orders && self.id_index[order_id as usize] != INVALID
    }

    pub fn max_orders(&self) -> usize {
        self.max_orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Quantity;

    fn add(ob: &mut OrderBook, id: u64, side: Side, price: i64, qty: i64) {
        ob.apply_update(&MarketUpdate::new(
            0,
            UpdateKind::Add,
            id,
            Price::define(price),
            Quantity::define(qty),
            side,
        ));
    }

    fn modify(ob: &mut OrderBook, id: u64, price: i64, qty: i64) {
        ob.apply_update(&MarketUpdate::new(
            0,
            UpdateKind::Modify,
            id,
            Price::define(price),
            Quantity::define(qty),
            Side::Bid, // ignored when price is unchanged; irrelevant otherwise for these tests
        ));
    }

    fn cancel(ob: &mut OrderBook, id: u64) {
        ob.apply_update(&MarketUpdate::new(
            0,
            UpdateKind::Cancel,
            id,
            Price::define(0),
            Quantity::define(0),
            Side::Bid,
        ));
    }

    #[test]
    fn scenario_1_basic_insert_query() {
        let mut ob = OrderBook::new(90, 110, 1000).unwrap();
        add(&mut ob, 1, Side::Bid, 100, 10);

        let snap = ob.best_bid().expect("bid exists");
        assert_eq!(snap.price, Price::define(100));
        assert_eq!(snap.total_qty, 10);
    }

    #[test]
    fn scenario_2_quantity_only_modify() {
        let mut ob = OrderBook::new(90, 110, 1000).unwrap();
        add(&mut ob, 1, Side::Bid, 100, 10);
        modify(&mut ob, 1, 100, 7);

        let snap = ob.best_bid().unwrap();
        assert_eq!(snap.price, Price::define(100));
        assert_eq!(snap.total_qty, 7);
    }

    #[test]
    fn scenario_3_price_change_modify_better_price() {
        let mut ob = OrderBook::new(90, 110, 1000).unwrap();
        add(&mut ob, 1, Side::Bid, 100, 10);
        modify(&mut ob, 1, 101, 10);

        let snap = ob.best_bid().unwrap();
        assert_eq!(snap.price, Price::define(101));
        assert_eq!(snap.total_qty, 10);
    }

    #[test]
    fn scenario_4_cancel_empties_book() {
        let mut ob = OrderBook::new(90, 110, 1000).unwrap();
        add(&mut ob, 1, Side::Bid, 100, 10);
        cancel(&mut ob, 1);

        assert!(ob.best_bid().is_none());
    }

    #[test]
    fn scenario_5_fifo_aggregation() {
        let mut ob = OrderBook::new(90, 110, 1000).unwrap();
        add(&mut ob, 1, Side::Bid, 100, 10);
        add(&mut ob, 2, Side::Bid, 100, 5);

        let snap = ob.best_bid().unwrap();
        assert_eq!(snap.price, Price::define(100));
        assert_eq!(snap.total_qty, 15);
    }

    #[test]
    fn scenario_6_node_recycling() {
        let mut ob = OrderBook::new(90, 110, 3).unwrap();
        add(&mut ob, 1, Side::Bid, 100, 10);
        cancel(&mut ob, 1);
        add(&mut ob, 2, Side::Bid, 101, 5);

        let snap = ob.best_bid().unwrap();
        assert_eq!(snap.price, Price::define(101));
        assert_eq!(snap.total_qty, 5);
        assert_eq!(ob.pool.free_count(), 2);
    }

    #[test]
    fn out_of_window_price_is_dropped() {
        let mut ob = OrderBook::new(90, 110, 1000).unwrap();
        add(&mut ob, 1, Side::Bid, 50, 10);
        assert!(ob.best_bid().is_none());
    }

    #[test]
    fn out_of_range_order_id_is_dropped() {
        let mut ob = OrderBook::new(90, 110, 10).unwrap();
        add(&mut ob, 999, Side::Bid, 100, 10);
        assert!(ob.best_bid().is_none());
    }

    #[test]
    fn modify_unknown_id_is_dropped() {
        let mut ob = OrderBook::new(90, 110, 10).unwrap();
        modify(&mut ob, 42, 100, 5);
        assert!(ob.best_bid().is_none());
    }

    #[test]
    fn cancel_ignores_advisory_fields_and_uses_stored_node() {
        let mut ob = OrderBook::new(90, 110, 10).unwrap();
        add(&mut ob, 1, Side::Ask, 105, 20);
        // The advisory fields in the cancel below (price=0, side=Bid) do
        // not match the stored node; cancel must still find it via the id
        // index and use the node's authoritative price/side.
        cancel(&mut ob, 1);
        assert!(ob.best_ask().is_none());
    }

    #[test]
    fn pool_exhaustion_drops_add_and_counts_it() {
        let mut ob = OrderBook::new(90, 110, 1).unwrap();
        add(&mut ob, 0, Side::Bid, 100, 10);
        add(&mut ob, 1, Side::Bid, 101, 5);
        assert_eq!(ob.adds_dropped, 1);
        let snap = ob.best_bid().unwrap();
        assert_eq!(snap.price, Price::define(100));
    }

    #[test]
    fn best_ask_symmetric_scan() {
        let mut ob = OrderBook::new(90, 110, 10).unwrap();
        add(&mut ob, 1, Side::Ask, 105, 10);
        add(&mut ob, 2, Side::Ask, 102, 5);

        let snap = ob.best_ask().unwrap();
        assert_eq!(snap.price, Price::define(102));
        assert_eq!(snap.total_qty, 5);
    }

    #[test]
    fn round_trip_add_then_cancel_restores_empty_book() {
        let mut ob = OrderBook::new(90, 110, 10).unwrap();
        assert!(ob.best_bid().is_none());
        add(&mut ob, 1, Side::Bid, 100, 10);
        cancel(&mut ob, 1);
        assert!(ob.best_bid().is_none());
        assert_eq!(ob.depth_at(Price::define(100), Side::Bid), 0);
    }

    #[test]
    fn round_trip_modify_then_modify_back_restores_state() {
        let mut ob = OrderBook::new(90, 110, 10).unwrap();
        add(&mut ob, 1, Side::Bid, 100, 10);
        modify(&mut ob, 1, 105, 20);
        modify(&mut ob, 1, 100, 10);

        let snap = ob.best_bid().unwrap();
        assert_eq!(snap.price, Price::define(100));
        assert_eq!(snap.total_qty, 10);
        assert_eq!(ob.depth_at(Price::define(105), Side::Bid), 0);
    }

    #[test]
    fn rejects_invalid_price_range() {
        assert_eq!(
            OrderBook::new(110, 90, 10).unwrap_err(),
            BookError::InvalidPriceRange { min_price: 110, max_price: 90 }
        );
    }

    #[test]
    fn rejects_zero_capacity() {
        assert_eq!(OrderBook::new(0, 10, 0).unwrap_err(), BookError::ZeroCapacity);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::pool::INVALID;
    use crate::types::Quantity;
    use proptest::prelude::*;
    use std::collections::HashSet;

    const MIN_PRICE: i64 = 0;
    const MAX_PRICE: i64 = 19;
    const MAX_ORDERS: usize = 16;

    #[derive(Clone, Debug)]
    enum Op {
        Add { id: u64, side_is_bid: bool, price: i64, qty: i64 },
        Modify { id: u64, price: i64, qty: i64 },
        Cancel { id: u64 },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        let id = 0..(MAX_ORDERS as u64 * 2); // some ids deliberately out of range
        let price = MIN_PRICE..=MAX_PRICE;
        let qty = 1i64..20;
        prop_oneof![
            (id.clone(), any::<bool>(), price.clone(), qty.clone())
                .prop_map(|(id, side_is_bid, price, qty)| Op::Add { id, side_is_bid, price, qty }),
            (id.clone(), price.clone(), qty.clone())
                .prop_map(|(id, price, qty)| Op::Modify { id, price, qty }),
            id.prop_map(|id| Op::Cancel { id }),
        ]
    }

    fn assert_invariants(ob: &OrderBook) {
        // Id-mapping agreement + per-level aggregate consistency + partition.
        let mut live_handles: HashSet<u32> = HashSet::new();

        for (id, &handle) in ob.id_index.iter().enumerate() {
            if handle == INVALID {
                continue;
            }
            let node = ob.pool.get(handle);
            assert_eq!(node.order_id, id as u64, "id-mapping agreement");
            assert!(live_handles.insert(handle), "handle claimed by two ids");
        }

        for (table, side) in [(&ob.bids, Side::Bid), (&ob.asks, Side::Ask)] {
            for idx in 0..table.len() {
                let level = table.at_index(idx);
                let mut sum = 0i64;
                let mut cur = level.head;
                let mut steps = 0;
                while cur != INVALID {
                    let node = ob.pool.get(cur);
                    assert_eq!(node.side, side);
                    sum += node.qty as i64;
                    cur = node.next;
                    steps += 1;
                    assert!(steps <= MAX_ORDERS + 1, "cycle in level FIFO");
                }
                assert_eq!(level.total_qty, sum, "aggregate consistency at level {idx}");
                assert_eq!(level.is_empty(), level.head == INVALID);
                if level.is_empty() {
                    assert_eq!(level.tail, INVALID);
                }
            }
        }

        // Free list and live nodes partition the pool: every slot is
        // either in the free list or reachable from exactly one level.
        let free = {
            let mut set = HashSet::new();
            let mut cur = ob.pool.free_head_for_test();
            while cur != INVALID {
                assert!(set.insert(cur), "free list cycle or duplicate");
                cur = ob.pool.get(cur).next;
            }
            set
        };
        for h in 0..ob.max_orders as u32 {
            let in_free = free.contains(&h);
            let in_live = live_handles.contains(&h);
            assert!(in_free ^ in_live, "node {h} is both or neither free and live");
        }

        // Best-price bound: hint must be an upper bound on the bid side.
        for idx in 0..ob.bids.len() {
            let level = ob.bids.at_index(idx);
            if !level.is_empty() {
                assert!(level.price.value() <= ob.best_bid_price);
            }
        }
        for idx in 0..ob.asks.len() {
            let level = ob.asks.at_index(idx);
            if !level.is_empty() {
                assert!(level.price.value() >= ob.best_ask_price);
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn invariants_hold_after_every_update(ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut ob = OrderBook::new(MIN_PRICE, MAX_PRICE, MAX_ORDERS).unwrap();
            for op in ops {
                let u = match op {
                    Op::Add { id, side_is_bid, price, qty } => MarketUpdate::new(
                        0, UpdateKind::Add, id, Price::define(price), Quantity::define(qty),
                        if side_is_bid { Side::Bid } else { Side::Ask },
                    ),
                    Op::Modify { id, price, qty } => MarketUpdate::new(
                        0, UpdateKind::Modify, id, Price::define(price), Quantity::define(qty), Side::Bid,
                    ),
                    Op::Cancel { id } => MarketUpdate::new(
                        0, UpdateKind::Cancel, id, Price::define(0), Quantity::define(0), Side::Bid,
                    ),
                };
                ob.apply_update(&u);
                assert_invariants(&ob);
            }
        }
    }
}
