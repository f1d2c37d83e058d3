//! Drains market data into the book and strategy, drains strategy signals
//! through the risk gate into the output ring, and fires the strategy's
//! timer on a fixed interval with no catch-up (a tick that arrives late
//! does not fire twice to make up for it).

use crate::book::OrderBook;
use crate::clock::Clock;
use crate::risk::RiskGate;
use crate::ring::SpscRing;
use crate::strategy::{Strategy, StrategySignal};
use std::sync::atomic::{AtomicBool, Ordering};

/// How `EventLoop::run` decides when to return.
pub enum RunPolicy<'a> {
    /// Process until the market-data ring is empty and a full cycle
    /// produces no further signal or book activity, then return. Suited to
    /// backtests and the integration test harness.
    Quiescent,
    /// Process until `stop_flag` is set, polling continuously in between.
    /// Suited to a live feed where the ring may always have more to give.
    Continuous { stop_flag: &'a AtomicBool },
}

pub struct EventLoop<'a, S: Strategy, C: Clock> {
    md_queue: &'a SpscRing<crate::types::MarketUpdate>,
    out_queue: &'a SpscRing<StrategySignal>,
    book: OrderBook,
    strategy: S,
    risk: RiskGate,
    clock: C,

    timer_interval_ns: u64,
    last_timer_ts_ns: u64,

    pub updates_processed: u64,
    pub signals_emitted: u64,
    pub signals_rejected: u64,
}

impl<'a, S: Strategy, C: Clock> EventLoop<'a, S, C> {
    pub fn new(
        md_queue: &'a SpscRing<crate::types::MarketUpdate>,
        out_queue: &'a SpscRing<StrategySignal>,
        book: OrderBook,
        strategy: S,
        risk: RiskGate,
        clock: C,
        timer_interval_ns: u64,
    ) -> Self {
        let last_timer_ts_ns = clock.now_ns();
        Self {
            md_queue,
            out_queue,
            book,
            strategy,
            risk,
            clock,
            timer_interval_ns,
            last_timer_ts_ns,
            updates_processed: 0,
            signals_emitted: 0,
            signals_rejected: 0,
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn run(&mut self, policy: RunPolicy<'_>) {
        match policy {
            RunPolicy::Quiescent => loop {
                let drained = self.handle_market_data();
                let emitted = self.handle_strategy_output();
                let fired = self.maybe_fire_timer();
                if drained == 0 && emitted == 0 && !fired {
                    break;
                }
            },
            RunPolicy::Continuous { stop_flag } => {
                while !stop_flag.load(Ordering::Acquire) {
                    self.handle_market_data();
                    self.handle_strategy_output();
                    self.maybe_fire_timer();
                }
            }
        }
    }

    /// Drains every update currently queued; returns how many were applied.
    fn handle_market_data(&mut self) -> u64 {
        let mut n = 0;
        while let Some(mu) = self.md_queue.pop() {
            self.book.apply_update(&mu);
            self.strategy.on_market_update(&mu);
            self.updates_processed += 1;
            n += 1;
        }
        n
    }

    /// Drains every pending strategy signal through the risk gate; returns
    /// how many were forwarded to the output ring.
    fn handle_strategy_output(&mut self) -> u64 {
        let mut forwarded = 0;
        let mut sig = StrategySignal { price: 0, qty: 0 };
        while self.strategy.poll_signal(&mut sig) {
            if self.risk.check(&sig) {
                // Output ring full is treated the same as the teacher's
                // backtest sink: the signal is simply not recorded.
                if self.out_queue.push(sig).is_ok() {
                    self.signals_emitted += 1;
                    forwarded += 1;
                }
            } else {
                self.signals_rejected += 1;
            }
        }
        forwarded
    }

    fn maybe_fire_timer(&mut self) -> bool {
        let now_ns = self.clock.now_ns();
        if now_ns.wrapping_sub(self.last_timer_ts_ns) >= self.timer_interval_ns {
            self.strategy.on_timer(now_ns);
            self.last_timer_ts_ns = now_ns;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::FakeClock;
    use crate::risk::RiskConfig;
    use crate::strategy::DemoStrategy;
    use crate::types::{MarketUpdate, Price, Quantity, Side, UpdateKind};

    fn update(id: u64, price: i64) -> MarketUpdate {
        MarketUpdate::new(0, UpdateKind::Add, id, Price::define(price), Quantity::define(10), Side::Bid)
    }

    #[test]
    fn quiescent_run_drains_queue_and_updates_book() {
        let md: SpscRing<MarketUpdate> = SpscRing::new(16).unwrap();
        let out: SpscRing<StrategySignal> = SpscRing::new(16).unwrap();
        md.push(update(1, 100)).unwrap();
        md.push(update(2, 101)).unwrap();

        let book = OrderBook::new(90, 110, 16).unwrap();
        let strategy = DemoStrategy::new(1000); // high threshold: no signals here
        let risk = RiskGate::new(RiskConfig { max_abs_price: 1000, max_abs_qty: 1000 });
        let clock = FakeClock::new();

        let mut el = EventLoop::new(&md, &out, book, strategy, risk, clock, 1_000_000);
        el.run(RunPolicy::Quiescent);

        assert_eq!(el.updates_processed, 2);
        assert!(md.is_empty());
    }

    #[test]
    fn signals_above_risk_bound_are_rejected_not_forwarded() {
        let md: SpscRing<MarketUpdate> = SpscRing::new(16).unwrap();
        let out: SpscRing<StrategySignal> = SpscRing::new(16).unwrap();
        md.push(update(1, 9999)).unwrap();

        let book = OrderBook::new(-10000, 10000, 16).unwrap();
        let strategy = DemoStrategy::new(1); // emits every update
        let risk = RiskGate::new(RiskConfig { max_abs_price: 100, max_abs_qty: 100 });
        let clock = FakeClock::new();

        let mut el = EventLoop::new(&md, &out, book, strategy, risk, clock, 1_000_000);
        el.run(RunPolicy::Quiescent);

        assert_eq!(el.signals_rejected, 1);
        assert_eq!(el.signals_emitted, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn signal_within_bound_flows_through_to_out_queue() {
        let md: SpscRing<MarketUpdate> = SpscRing::new(16).unwrap();
        let out: SpscRing<StrategySignal> = SpscRing::new(16).unwrap();
        md.push(update(1, 50)).unwrap();

        let book = OrderBook::new(-1000, 1000, 16).unwrap();
        let strategy = DemoStrategy::new(1);
        let risk = RiskGate::new(RiskConfig { max_abs_price: 1000, max_abs_qty: 1000 });
        let clock = FakeClock::new();

        let mut el = EventLoop::new(&md, &out, book, strategy, risk, clock, 1_000_000);
        el.run(RunPolicy::Quiescent);

        assert_eq!(el.signals_emitted, 1);
        assert_eq!(out.pop(), Some(StrategySignal { price: 50, qty: 1 }));
    }

    #[test]
    fn timer_does_not_fire_before_interval_elapses() {
        let md: SpscRing<MarketUpdate> = SpscRing::new(4).unwrap();
        let out: SpscRing<StrategySignal> = SpscRing::new(4).unwrap();

        let book = OrderBook::new(0, 10, 4).unwrap();
        let strategy = DemoStrategy::new(1);
        let risk = RiskGate::new(RiskConfig { max_abs_price: 1000, max_abs_qty: 1000 });
        let clock = FakeClock::new();

        let mut el = EventLoop::new(&md, &out, book, strategy, risk, clock, 1_000);
        // No queued updates and the interval hasn't elapsed: a quiescent
        // run must return immediately without firing the timer.
        el.run(RunPolicy::Quiescent);
        assert_eq!(el.updates_processed, 0);
    }

    #[test]
    fn continuous_run_stops_once_flag_is_set() {
        let md: SpscRing<MarketUpdate> = SpscRing::new(4).unwrap();
        let out: SpscRing<StrategySignal> = SpscRing::new(4).unwrap();

        let book = OrderBook::new(0, 10, 4).unwrap();
        let strategy = DemoStrategy::new(1000);
        let risk = RiskGate::new(RiskConfig { max_abs_price: 1000, max_abs_qty: 1000 });
        let clock = FakeClock::new();

        let stop = AtomicBool::new(true); // already stopped: loop body must not spin forever
        let mut el = EventLoop::new(&md, &out, book, strategy, risk, clock, 1_000_000);
        el.run(RunPolicy::Continuous { stop_flag: &stop });
        assert_eq!(el.updates_processed, 0);
    }

    #[test]
    fn scenario_8_end_to_end_event_loop_through_feed_handler() {
        use crate::feed::FeedHandler;
        use crate::wire::encode_record;

        let md: SpscRing<MarketUpdate> = SpscRing::new(16).unwrap();
        let out: SpscRing<StrategySignal> = SpscRing::new(16).unwrap();
        let feed = FeedHandler::new(&md);

        let raw_updates = [
            update(1, 100),
            update(2, 99),
            MarketUpdate::new(3, UpdateKind::Modify, 1, Price::define(100), Quantity::define(7), Side::Bid),
            MarketUpdate::new(4, UpdateKind::Cancel, 2, Price::define(0), Quantity::define(0), Side::Bid),
        ];
        let mut bytes = Vec::new();
        for u in &raw_updates {
            bytes.extend_from_slice(&encode_record(u));
        }
        let (decoded, leftover) = feed.on_batch(&bytes);
        assert_eq!(decoded, raw_updates.len());
        assert_eq!(leftover, 0);

        let book = OrderBook::new(90, 110, 16).unwrap();
        let strategy = DemoStrategy::new(1); // emits a signal on every update
        let risk_config = RiskConfig { max_abs_price: 1000, max_abs_qty: 1000 };
        let risk = RiskGate::new(risk_config);
        let clock = FakeClock::new();

        let mut el = EventLoop::new(&md, &out, book, strategy, risk, clock, 1_000_000);
        el.run(RunPolicy::Quiescent);

        assert_eq!(el.updates_processed, raw_updates.len() as u64);

        let verifier = RiskGate::new(risk_config);
        let mut observed = 0u64;
        while let Some(sig) = out.pop() {
            assert!(verifier.check(&sig), "signal {sig:?} exceeded the configured risk bounds");
            observed += 1;
        }
        assert_eq!(observed, el.signals_emitted);
    }
}
