//! Pure, stateless bounds check applied to every signal before it reaches
//! the output ring. No position tracking, no per-symbol limits — the
//! engine can grow those later without touching the gate's contract.

use crate::strategy::StrategySignal;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RiskConfig {
    pub max_abs_price: i64,
    pub max_abs_qty: i64,
}

pub struct RiskGate {
    config: RiskConfig,
}

impl RiskGate {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn check(&self, sig: &StrategySignal) -> bool {
        sig.qty.abs() <= self.config.max_abs_qty && sig.price.abs() <= self.config.max_abs_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> RiskGate {
        RiskGate::new(RiskConfig { max_abs_price: 1000, max_abs_qty: 100 })
    }

    #[test]
    fn signal_within_bounds_passes() {
        assert!(gate().check(&StrategySignal { price: 500, qty: 50 }));
    }

    #[test]
    fn qty_over_bound_is_rejected() {
        assert!(!gate().check(&StrategySignal { price: 500, qty: 101 }));
    }

    #[test]
    fn price_over_bound_is_rejected() {
        assert!(!gate().check(&StrategySignal { price: 1001, qty: 1 }));
    }

    #[test]
    fn negative_values_use_absolute_bound() {
        assert!(gate().check(&StrategySignal { price: -1000, qty: -100 }));
        assert!(!gate().check(&StrategySignal { price: -1001, qty: 0 }));
    }

    #[test]
    fn boundary_values_pass() {
        assert!(gate().check(&StrategySignal { price: 1000, qty: 100 }));
    }
}
