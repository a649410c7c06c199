//! Per-bar crossover decision loop.
//!
//! Bars are evaluated strictly in order from `slow_period`. Each bar:
//! 1. Stop the run if the account is halted
//! 2. Compute the indicator snapshot
//! 3. Apply the optional volume gate
//! 4. Pick a side from the EMA crossover
//! 5. Derive stop/target distances from volatility
//! 6. Size and emit a trade intent
//! 7. Submit it to the execution port without waiting for fills

use crate::domain::account::{AccountState, SharedAccount};
use crate::domain::error::TraderError;
use crate::domain::events::{SkipReason, TradeEvent};
use crate::domain::indicator::compute_indicators;
use crate::domain::series::CandleSeries;
use crate::domain::signal::{crossover, Bracket, TradeIntent};
use crate::domain::strategy::StrategyConfig;
use crate::ports::event_port::EventSink;
use crate::ports::execution_port::{ExecutionPort, SubmitOutcome};

/// Outcome of evaluating one bar.
#[derive(Debug, Clone, PartialEq)]
pub enum BarDecision {
    Trade(TradeIntent),
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Candles in the series.
    pub bars: usize,
    /// Bars that passed the halt check and were evaluated.
    pub evaluated: usize,
    /// Every intent emitted, including ones the gateway rejected.
    pub intents: Vec<TradeIntent>,
    pub rejected: usize,
    /// Bar index at which the drawdown halt stopped the run.
    pub halted_at: Option<usize>,
    pub final_balance: f64,
}

impl RunSummary {
    fn empty(bars: usize) -> Self {
        RunSummary {
            bars,
            evaluated: 0,
            intents: Vec::new(),
            rejected: 0,
            halted_at: None,
            final_balance: 0.0,
        }
    }

    pub fn accepted(&self) -> usize {
        self.intents.len() - self.rejected
    }
}

pub struct DecisionEngine<'a> {
    config: StrategyConfig,
    sink: &'a dyn EventSink,
    gateway: &'a dyn ExecutionPort,
}

impl<'a> DecisionEngine<'a> {
    pub fn new(
        config: StrategyConfig,
        sink: &'a dyn EventSink,
        gateway: &'a dyn ExecutionPort,
    ) -> Self {
        DecisionEngine {
            config,
            sink,
            gateway,
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Evaluate bar `index` against one account snapshot without emitting
    /// events or submitting anything.
    pub fn decide(
        &self,
        series: &CandleSeries,
        index: usize,
        account: &AccountState,
    ) -> Result<BarDecision, TraderError> {
        let snapshot = compute_indicators(series, index, self.config.periods())?;
        let candle = series.get(index).ok_or(TraderError::BarOutOfRange {
            index,
            len: series.len(),
        })?;

        if !self.config.passes_volume_gate(candle.volume) {
            return Ok(BarDecision::Skip(SkipReason::VolumeBelowThreshold));
        }

        let Some(side) = crossover(&snapshot) else {
            return Ok(BarDecision::Skip(SkipReason::NoCrossover));
        };

        let bracket = Bracket::from_volatility(snapshot.volatility, self.config.risk_reward_ratio);
        if !bracket.is_tradeable() {
            return Ok(BarDecision::Skip(SkipReason::DegenerateBracket));
        }

        let quantity = account.position_size();
        if !quantity.is_finite() {
            return Ok(BarDecision::Skip(SkipReason::InvalidQuantity));
        }

        // Distances too small to move the price still collapse the bracket.
        match TradeIntent::bracketed(side, candle.close, &bracket, quantity) {
            Ok(intent) => Ok(BarDecision::Trade(intent)),
            Err(TraderError::InvalidIntent { .. }) => {
                Ok(BarDecision::Skip(SkipReason::DegenerateBracket))
            }
            Err(e) => Err(e),
        }
    }

    /// Process every evaluable bar of `series` in order.
    ///
    /// A series shorter than `slow_period + 1` is a no-op run. A halted
    /// account ends the run at the first bar where the halt is observed.
    /// Each bar reads the account once, so the halt check and the sizing
    /// always see the same balance.
    pub fn run(
        &self,
        series: &CandleSeries,
        account: &SharedAccount,
    ) -> Result<RunSummary, TraderError> {
        let periods = self.config.periods();
        let mut summary = RunSummary::empty(series.len());

        if series.len() < periods.min_bars() {
            self.sink.emit(&TradeEvent::InsufficientHistory {
                bars: series.len(),
                minimum: periods.min_bars(),
            });
            return Ok(self.complete(summary, account));
        }

        for index in periods.first_index()..series.len() {
            let state = account.snapshot();
            if state.is_halted() {
                self.sink.emit(&TradeEvent::TradingHalted {
                    index,
                    balance: state.balance(),
                    threshold: state.halt_threshold().unwrap_or_default(),
                });
                summary.halted_at = Some(index);
                break;
            }

            summary.evaluated += 1;
            match self.decide(series, index, &state)? {
                BarDecision::Skip(reason) => {
                    self.sink.emit(&TradeEvent::BarSkipped { index, reason });
                }
                BarDecision::Trade(intent) => {
                    self.sink.emit(&TradeEvent::SignalEmitted {
                        index,
                        intent: intent.clone(),
                    });
                    if let SubmitOutcome::Rejected { reason } = self.gateway.submit(&intent) {
                        summary.rejected += 1;
                        self.sink.emit(&TradeEvent::TradeRejected {
                            index,
                            side: intent.side(),
                            reason,
                        });
                    }
                    summary.intents.push(intent);
                }
            }
        }

        Ok(self.complete(summary, account))
    }

    fn complete(&self, mut summary: RunSummary, account: &SharedAccount) -> RunSummary {
        summary.final_balance = account.balance();
        self.sink.emit(&TradeEvent::RunCompleted {
            final_balance: summary.final_balance,
            intents: summary.intents.len(),
            rejected: summary.rejected,
        });
        summary
    }
}
