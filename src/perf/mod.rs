pub mod hw_counters;
pub mod latency;
mod rdtsc;
pub mod report;

pub use latency::{cycles_to_ns, estimate_cpu_frequency, get_cpu_frequency, LatencyTracker, Percentiles};
pub use rdtsc::rdtsc;
