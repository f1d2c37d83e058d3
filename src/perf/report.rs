//! Writes a `Percentiles` summary as a CSV row, for benchmark output that
//! needs to be diffed across runs rather than eyeballed on a terminal.

use super::latency::Percentiles;
use csv::Writer;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct PercentileRow {
    label: String,
    min: u64,
    max: u64,
    mean: f64,
    p50: u64,
    p95: u64,
    p99: u64,
    p999: u64,
    p9999: u64,
}

/// Appends one labeled row per call; `writer` stays open across calls so a
/// caller can build up a multi-row report (one label per workload).
pub fn write_percentile_row<W: Write>(
    writer: &mut Writer<W>,
    label: &str,
    p: &Percentiles,
) -> csv::Result<()> {
    writer.serialize(PercentileRow {
        label: label.to_string(),
        min: p.min,
        max: p.max,
        mean: p.mean,
        p50: p.p50,
        p95: p.p95,
        p99: p.p99,
        p999: p.p999,
        p9999: p.p9999,
    })?;
    writer.flush()?;
    Ok(())
}

pub fn percentiles_to_csv_string(label: &str, p: &Percentiles) -> csv::Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    write_percentile_row(&mut writer, label, p)?;
    let bytes = writer.into_inner().map_err(|e| csv::Error::from(io::Error::from(e.into_error())))?;
    Ok(String::from_utf8(bytes).expect("csv writer only emits valid utf-8"))
}
