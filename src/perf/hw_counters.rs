//! Hardware performance counters, read through the Linux `perf_event_open`
//! syscall. Gated to `target_os = "linux"`: the `perf-event` crate has
//! nothing to bind to elsewhere.

#[cfg(target_os = "linux")]
mod linux_impl {
    use perf_event::events::Hardware;
    use perf_event::{Builder, Counter};
    use std::io;

    /// Instructions-retired and cache-miss counters sampled around a single
    /// closure invocation, analogous to `LatencyTracker::record` but for
    /// CPU events instead of wall-clock cycles.
    pub struct HwCounters {
        instructions: Counter,
        cache_misses: Counter,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HwSample {
        pub instructions: u64,
        pub cache_misses: u64,
    }

    impl HwCounters {
        pub fn new() -> io::Result<Self> {
            let instructions = Builder::new(Hardware::INSTRUCTIONS).build()?;
            let cache_misses = Builder::new(Hardware::CACHE_MISSES).build()?;
            Ok(Self { instructions, cache_misses })
        }

        pub fn sample<F, R>(&mut self, op: F) -> io::Result<(R, HwSample)>
        where
            F: FnOnce() -> R,
        {
            self.instructions.reset()?;
            self.cache_misses.reset()?;
            self.instructions.enable()?;
            self.cache_misses.enable()?;

            let result = op();

            self.instructions.disable()?;
            self.cache_misses.disable()?;
            let sample = HwSample {
                instructions: self.instructions.read()?,
                cache_misses: self.cache_misses.read()?,
            };
            Ok((result, sample))
        }
    }
}

#[cfg(target_os = "linux")]
pub use linux_impl::{HwCounters, HwSample};

#[cfg(not(target_os = "linux"))]
pub struct HwCounters;

#[cfg(not(target_os = "linux"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwSample {
    pub instructions: u64,
    pub cache_misses: u64,
}

#[cfg(not(target_os = "linux"))]
impl HwCounters {
    pub fn new() -> std::io::Result<Self> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "hardware counters are only available on Linux",
        ))
    }

    pub fn sample<F, R>(&mut self, op: F) -> std::io::Result<(R, HwSample)>
    where
        F: FnOnce() -> R,
    {
        Ok((op(), HwSample { instructions: 0, cache_misses: 0 }))
    }
}
