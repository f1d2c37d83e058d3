//! Writes a file of wire-format records for replay by `throughput_bench`
//! or any other consumer of `lob_core::wire`.
//!
//! Usage: generate_feed <output_file> <num_messages> [--distribution uniform|zipf] [--config <path>]

use lob_core::types::{MarketUpdate, OrderId, Price, Quantity, Side, UpdateKind};
use lob_core::wire::encode_record;
use lob_core::EngineConfig;
use rand::Rng;
use rand_distr::{Distribution, Zipf};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

/// Classic Zipf exponent (s=1): rank 1 dominates, the rest trail off as
/// 1/rank — the same shape as the teacher's own `examples/scenario_zipfian.rs`.
const ZIPF_EXPONENT: f64 = 1.0;

#[derive(Copy, Clone)]
enum PriceDistribution {
    Uniform,
    Zipf,
}

impl PriceDistribution {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "uniform" => Some(Self::Uniform),
            "zipf" => Some(Self::Zipf),
            _ => None,
        }
    }
}

/// Rank 1 lands on the mid price; each higher rank fans out alternately
/// above and below it, clamped back into `[min_price, max_price]` — a
/// generalization of `scenario_zipfian.rs`'s `generate_zipfian_price` to an
/// arbitrary window instead of a hardcoded mid/range.
fn zipfian_price(rng: &mut impl Rng, zipf: &Zipf<f64>, min_price: i64, max_price: i64) -> i64 {
    let mid = (min_price + max_price) / 2;
    let rank = zipf.sample(rng) as i64;
    let magnitude = rank / 2;
    let offset = if rank % 2 == 0 { magnitude } else { -magnitude };
    (mid + offset).clamp(min_price, max_price)
}

fn load_config(config_path: Option<&String>) -> Result<EngineConfig, String> {
    let config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| format!("failed to read config at {path}: {e}"))?;
            EngineConfig::from_json(&text).map_err(|e| format!("failed to parse config at {path}: {e}"))?
        }
        None => EngineConfig::default(),
    };
    config.validate().map_err(|e| format!("invalid config: {e}"))?;
    Ok(config)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage: {} <output_file> <num_messages> [--distribution uniform|zipf] [--config <path>]",
            args[0]
        );
        return ExitCode::FAILURE;
    }

    let filename = &args[1];
    let num: u64 = match args[2].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("num_messages must be a non-negative integer");
            return ExitCode::FAILURE;
        }
    };

    let distribution = match args.iter().position(|a| a == "--distribution").and_then(|i| args.get(i + 1)) {
        Some(s) => match PriceDistribution::parse(s) {
            Some(d) => d,
            None => {
                eprintln!("--distribution must be 'uniform' or 'zipf'");
                return ExitCode::FAILURE;
            }
        },
        None => PriceDistribution::Uniform,
    };

    let config_path = args.iter().position(|a| a == "--config").and_then(|i| args.get(i + 1));
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let file = match File::create(filename) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("failed to open output file: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut out = BufWriter::new(file);

    let mut rng = rand::rng();
    let num_price_levels = (config.max_price - config.min_price + 1) as f64;
    let zipf = Zipf::new(num_price_levels.max(1.0), ZIPF_EXPONENT).expect("fixed, valid Zipf parameters");

    for i in 0..num {
        let ts = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos() as u64;
        let kind = match rng.random_range(0..3) {
            0 => UpdateKind::Add,
            1 => UpdateKind::Modify,
            _ => UpdateKind::Cancel,
        };
        let side = if rng.random_bool(0.5) { Side::Bid } else { Side::Ask };
        let price = match distribution {
            PriceDistribution::Uniform => rng.random_range(config.min_price..=config.max_price),
            PriceDistribution::Zipf => zipfian_price(&mut rng, &zipf, config.min_price, config.max_price),
        };
        let qty = rng.random_range(1..=100);
        let order_id = i % config.max_orders as u64;

        let update = MarketUpdate::new(
            ts,
            kind,
            order_id as OrderId,
            Price::define(price),
            Quantity::define(qty),
            side,
        );

        if let Err(e) = out.write_all(&encode_record(&update)) {
            eprintln!("write failed: {e}");
            return ExitCode::FAILURE;
        }
    }

    if let Err(e) = out.flush() {
        eprintln!("flush failed: {e}");
        return ExitCode::FAILURE;
    }

    println!("Generated {num} messages into {filename}");
    ExitCode::SUCCESS
}
