//! Engine configuration, loaded from JSON at startup. Everything the book,
//! the rings and the risk gate need to be constructed lives here so a
//! deployment can be tuned without a rebuild.

use crate::error::BookError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub min_price: i64,
    pub max_price: i64,
    pub max_orders: usize,

    pub md_ring_capacity: usize,
    pub out_ring_capacity: usize,

    pub max_abs_price: i64,
    pub max_abs_qty: i64,

    pub timer_interval_ns: u64,
    pub strategy_every_n: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_price: 0,
            max_price: 1_000_000,
            max_orders: 1 << 16,
            md_ring_capacity: 1 << 16,
            out_ring_capacity: 1 << 12,
            max_abs_price: 1_000_000,
            max_abs_qty: 1_000_000,
            timer_interval_ns: 1_000_000,
            strategy_every_n: 100,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), BookError> {
        if self.min_price > self.max_price {
            return Err(BookError::InvalidPriceRange {
                min_price: self.min_price,
                max_price: self.max_price,
            });
        }
        if self.max_orders == 0 {
            return Err(BookError::ZeroCapacity);
        }
        if self.md_ring_capacity == 0 || !self.md_ring_capacity.is_power_of_two() {
            return Err(BookError::RingCapacityNotPowerOfTwo { capacity: self.md_ring_capacity });
        }
        if self.out_ring_capacity == 0 || !self.out_ring_capacity.is_power_of_two() {
            return Err(BookError::RingCapacityNotPowerOfTwo { capacity: self.out_ring_capacity });
        }
        Ok(())
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
