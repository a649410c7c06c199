//! Crossover strategy parameters.

use crate::domain::indicator::IndicatorPeriods;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub risk_reward_ratio: f64,
    /// Bars with volume at or below this are skipped. `None` disables the gate.
    pub volume_threshold: Option<f64>,
}

impl StrategyConfig {
    pub fn periods(&self) -> IndicatorPeriods {
        IndicatorPeriods {
            fast: self.fast_period,
            slow: self.slow_period,
        }
    }

    /// Whether a bar with `volume` passes the volume gate.
    pub fn passes_volume_gate(&self, volume: f64) -> bool {
        self.volume_threshold.is_none_or(|threshold| volume > threshold)
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            fast_period: 3,
            slow_period: 8,
            risk_reward_ratio: 1.5,
            volume_threshold: None,
        }
    }
}
