//! Structured events emitted by the decision engine.

use std::fmt;

use crate::domain::signal::{Side, TradeIntent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Bar volume at or below the configured threshold.
    VolumeBelowThreshold,
    /// Fast and slow EMA are equal.
    NoCrossover,
    /// Stop/target distances not strictly positive, so no ordered bracket.
    DegenerateBracket,
    /// Position size is not a finite number.
    InvalidQuantity,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::VolumeBelowThreshold => write!(f, "volume below threshold"),
            SkipReason::NoCrossover => write!(f, "no crossover"),
            SkipReason::DegenerateBracket => write!(f, "degenerate bracket"),
            SkipReason::InvalidQuantity => write!(f, "invalid quantity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TradeEvent {
    SignalEmitted {
        index: usize,
        intent: TradeIntent,
    },
    TradeRejected {
        index: usize,
        side: Side,
        reason: String,
    },
    BarSkipped {
        index: usize,
        reason: SkipReason,
    },
    InsufficientHistory {
        bars: usize,
        minimum: usize,
    },
    TradingHalted {
        index: usize,
        balance: f64,
        threshold: f64,
    },
    RunCompleted {
        final_balance: f64,
        intents: usize,
        rejected: usize,
    },
}

impl TradeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TradeEvent::SignalEmitted { .. } => "signal_emitted",
            TradeEvent::TradeRejected { .. } => "trade_rejected",
            TradeEvent::BarSkipped { .. } => "bar_skipped",
            TradeEvent::InsufficientHistory { .. } => "insufficient_history",
            TradeEvent::TradingHalted { .. } => "trading_halted",
            TradeEvent::RunCompleted { .. } => "run_completed",
        }
    }
}
