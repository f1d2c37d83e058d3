//! Strategy contract consulted by the event loop on every market update
//! and timer tick.
//!
//! `poll_signal` is the only path a signal leaves a strategy by — there is
//! no second, parallel push straight to an output ring. A strategy that
//! wants to emit eagerly from `on_market_update` or `on_timer` buffers the
//! signal internally and surfaces it the next time the loop polls.

use crate::types::MarketUpdate;
use smallvec::SmallVec;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StrategySignal {
    pub price: i64,
    pub qty: i64,
}

pub trait Strategy {
    fn on_market_update(&mut self, mu: &MarketUpdate);

    /// Optional periodic callback. Default: no-op.
    fn on_timer(&mut self, _timestamp_ns: u64) {}

    /// Called once per loop iteration; `true` if `out` was written.
    fn poll_signal(&mut self, out: &mut StrategySignal) -> bool;
}

/// Emits one signal at the last-seen price every `every_n` market updates
/// or timer ticks, counted together.
pub struct DemoStrategy {
    every_n: u64,
    count: u64,
    last_price: i64,
    // Most ticks never queue a signal; inline capacity of 4 avoids a heap
    // allocation in that common case while still absorbing a burst of
    // back-to-back `every_n` boundaries before `poll_signal` drains it.
    pending: SmallVec<[StrategySignal; 4]>,
}

impl DemoStrategy {
    pub fn new(every_n: u64) -> Self {
        assert!(every_n > 0, "every_n must be nonzero");
        Self { every_n, count: 0, last_price: 0, pending: SmallVec::new() }
    }

    fn tick(&mut self) {
        self.count += 1;
        if self.count % self.every_n == 0 {
            self.pending.push(StrategySignal { price: self.last_price, qty: 1 });
        }
    }
}

impl Strategy for DemoStrategy {
    fn on_market_update(&mut self, mu: &MarketUpdate) {
        self.last_price = mu.price.value();
        self.tick();
    }

    fn on_timer(&mut self, _timestamp_ns: u64) {
        self.tick();
    }

    fn poll_signal(&mut self, out: &mut StrategySignal) -> bool {
        if let Some(sig) = self.pending.pop() {
            *out = sig;
            true
        } else {
            false
        }
    }
}
