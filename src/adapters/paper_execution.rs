//! Paper execution gateway.
//!
//! Accepts intents without contacting a venue, records them, and can write
//! the accepted intents to a CSV journal.

use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;

use crate::domain::error::TraderError;
use crate::domain::signal::{Side, TradeIntent};
use crate::ports::execution_port::{ExecutionPort, SubmitOutcome};

#[derive(Debug, Serialize)]
struct JournalRow {
    seq: usize,
    side: Side,
    entry_price: f64,
    stop_loss_price: f64,
    take_profit_price: f64,
    quantity: f64,
}

#[derive(Default)]
pub struct PaperExecutionAdapter {
    max_quantity: Option<f64>,
    accepted: Mutex<Vec<TradeIntent>>,
}

impl PaperExecutionAdapter {
    pub fn new(max_quantity: Option<f64>) -> Self {
        Self {
            max_quantity,
            accepted: Mutex::new(Vec::new()),
        }
    }

    pub fn accepted(&self) -> Vec<TradeIntent> {
        self.accepted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn check(&self, intent: &TradeIntent) -> Result<(), String> {
        let quantity = intent.quantity();
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err("quantity must be positive".to_string());
        }
        if let Some(max) = self.max_quantity {
            if quantity > max {
                return Err(format!("quantity {quantity} exceeds maximum {max}"));
            }
        }
        Ok(())
    }

    /// Write every accepted intent to `path` as CSV.
    pub fn write_journal(&self, path: &Path) -> Result<(), TraderError> {
        let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
        for (seq, intent) in self.accepted().iter().enumerate() {
            writer
                .serialize(JournalRow {
                    seq: seq + 1,
                    side: intent.side(),
                    entry_price: intent.entry_price(),
                    stop_loss_price: intent.stop_loss_price(),
                    take_profit_price: intent.take_profit_price(),
                    quantity: intent.quantity(),
                })
                .map_err(csv_error)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> TraderError {
    TraderError::Io(std::io::Error::other(e))
}

impl ExecutionPort for PaperExecutionAdapter {
    fn submit(&self, intent: &TradeIntent) -> SubmitOutcome {
        match self.check(intent) {
            Ok(()) => {
                self.accepted
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(intent.clone());
                SubmitOutcome::Accepted
            }
            Err(reason) => SubmitOutcome::Rejected { reason },
        }
    }
}
