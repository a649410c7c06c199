//! Event sink that forwards engine events to `tracing`.

use tracing::{debug, info, warn};

use crate::domain::events::TradeEvent;
use crate::ports::event_port::EventSink;

/// Writes each event as a structured `tracing` record tagged with the run's
/// symbol.
pub struct TracingEventSink {
    symbol: String,
}

impl TracingEventSink {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

impl EventSink for TracingEventSink {
    fn emit(&self, event: &TradeEvent) {
        let symbol = self.symbol.as_str();
        match event {
            TradeEvent::SignalEmitted { index, intent } => info!(
                symbol,
                index,
                side = %intent.side(),
                entry = intent.entry_price(),
                stop = intent.stop_loss_price(),
                target = intent.take_profit_price(),
                quantity = intent.quantity(),
                "Signal emitted"
            ),
            TradeEvent::TradeRejected {
                index,
                side,
                reason,
            } => warn!(symbol, index, side = %side, reason = %reason, "Trade rejected"),
            TradeEvent::BarSkipped { index, reason } => {
                debug!(symbol, index, reason = %reason, "Bar skipped")
            }
            TradeEvent::InsufficientHistory { bars, minimum } => warn!(
                symbol,
                bars,
                minimum,
                "Not enough candles to evaluate any bar"
            ),
            TradeEvent::TradingHalted {
                index,
                balance,
                threshold,
            } => warn!(
                symbol,
                index,
                balance,
                threshold,
                "Drawdown limit reached, stopping trading"
            ),
            TradeEvent::RunCompleted {
                final_balance,
                intents,
                rejected,
            } => info!(symbol, final_balance, intents, rejected, "Run completed"),
        }
    }
}
