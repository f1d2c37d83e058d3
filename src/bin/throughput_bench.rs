//! Replays a wire-format feed file through the full engine pipeline: a
//! `FeedHandler` decodes and pushes records into the MD ring, and an
//! `EventLoop` under `RunPolicy::Quiescent` drains it against a real
//! `OrderBook`, a `DemoStrategy` and a `RiskGate`, reporting throughput and
//! per-iteration latency percentiles.
//!
//! Usage: throughput_bench <replay_file> [--csv <out_file>] [--config <path>]

use lob_core::clock::SystemClock;
use lob_core::feed::FeedHandler;
use lob_core::perf::report::write_percentile_row;
use lob_core::perf::LatencyTracker;
use lob_core::ring::SpscRing;
use lob_core::strategy::DemoStrategy;
use lob_core::types::MarketUpdate;
use lob_core::wire::{decode_record, RECORD_LEN};
use lob_core::{EngineConfig, EventLoop, OrderBook, RiskConfig, RiskGate, RunPolicy};
use std::env;
use std::fs;
use std::process::ExitCode;
use std::time::Instant;

fn load_config(config_path: Option<&String>) -> Result<EngineConfig, String> {
    let config = match config_path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| format!("failed to read config at {path}: {e}"))?;
            EngineConfig::from_json(&text).map_err(|e| format!("failed to parse config at {path}: {e}"))?
        }
        None => EngineConfig::default(),
    };
    config.validate().map_err(|e| format!("invalid config: {e}"))?;
    Ok(config)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <replay_file> [--csv <out_file>] [--config <path>]", args[0]);
        return ExitCode::FAILURE;
    }

    let filename = &args[1];
    let csv_path = args.iter().position(|a| a == "--csv").and_then(|i| args.get(i + 1));
    let config_path = args.iter().position(|a| a == "--config").and_then(|i| args.get(i + 1));

    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let bytes = match fs::read(filename) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("failed to read {filename}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let md_queue: SpscRing<MarketUpdate> =
        SpscRing::new(config.md_ring_capacity).expect("config was validated to carry a power-of-two capacity");
    let out_queue: SpscRing<_> =
        SpscRing::new(config.out_ring_capacity).expect("config was validated to carry a power-of-two capacity");
    let feed = FeedHandler::new(&md_queue);

    let book = OrderBook::new(config.min_price, config.max_price, config.max_orders)
        .expect("config was validated against the same constraints OrderBook::new checks");
    let strategy = DemoStrategy::new(config.strategy_every_n);
    let risk = RiskGate::new(RiskConfig { max_abs_price: config.max_abs_price, max_abs_qty: config.max_abs_qty });
    let clock = SystemClock::new();
    let mut event_loop = EventLoop::new(&md_queue, &out_queue, book, strategy, risk, clock, config.timer_interval_ns);

    let mut tracker = LatencyTracker::new(bytes.len() / RECORD_LEN + 1);
    let mut decoded = 0usize;
    let mut offset = 0usize;

    let t0 = Instant::now();
    while let Some((update, consumed)) = decode_record(&bytes[offset..]) {
        offset += consumed;
        decoded += 1;

        while !feed.on_update(update) {
            std::hint::spin_loop();
        }
        // One push, one quiescent pass: this times the whole per-message
        // pipeline (book update, strategy callback, risk check, out-ring
        // push) rather than `apply_update` in isolation.
        tracker.record(|| event_loop.run(RunPolicy::Quiescent));
    }
    let elapsed = t0.elapsed();

    let leftover = bytes.len() - offset;
    if leftover > 0 {
        eprintln!("warning: {leftover} trailing bytes did not form a complete record");
    }

    let seconds = elapsed.as_secs_f64();
    if seconds > 0.0 && decoded > 0 {
        let mps = decoded as f64 / seconds;
        println!("Replayed {decoded} messages in {seconds:.6} seconds");
        println!("Throughput: {mps:.0} messages/sec");
        println!(
            "updates_processed={} signals_emitted={} signals_rejected={}",
            event_loop.updates_processed, event_loop.signals_emitted, event_loop.signals_rejected
        );
    } else {
        println!("No messages processed or zero elapsed time.");
    }

    if let Some(p) = tracker.precentiles() {
        println!(
            "event loop iteration latency (cycles): min={} p50={} p95={} p99={} p999={} p9999={} max={}",
            p.min, p.p50, p.p95, p.p99, p.p999, p.p9999, p.max
        );

        if let Some(path) = csv_path {
            match fs::File::create(path) {
                Ok(file) => {
                    let mut writer = csv::Writer::from_writer(file);
                    if let Err(e) = write_percentile_row(&mut writer, "event_loop_iteration", &p) {
                        eprintln!("failed to write csv: {e}");
                        return ExitCode::FAILURE;
                    }
                    println!("Wrote percentile report to {}", path);
                }
                Err(e) => {
                    eprintln!("failed to create {path}: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}
