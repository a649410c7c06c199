#![allow(dead_code)]

use chrono::DateTime;
pub use emacross::domain::candle::Candle;
use emacross::domain::account::{AccountState, RiskConfig, SharedAccount};
use emacross::domain::error::TraderError;
use emacross::domain::series::CandleSeries;
use emacross::domain::signal::TradeIntent;
use emacross::domain::strategy::StrategyConfig;
use emacross::ports::data_port::MarketDataPort;
use emacross::ports::execution_port::{ExecutionPort, SubmitOutcome};
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, TraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TraderError::DataUnavailable {
                symbol: symbol.to_string(),
                interval: interval.to_string(),
                reason: reason.clone(),
            });
        }
        let candles = self.data.get(symbol).cloned().unwrap_or_default();
        let skip = candles.len().saturating_sub(limit);
        Ok(candles[skip..].to_vec())
    }
}

/// Gateway that records every intent and runs a fill callback on accept.
pub struct RecordingGateway<'a> {
    pub submitted: RefCell<Vec<TradeIntent>>,
    pub reject_with: Option<String>,
    pub on_fill: Option<Box<dyn Fn(&TradeIntent) + 'a>>,
}

impl<'a> RecordingGateway<'a> {
    pub fn accepting() -> Self {
        Self {
            submitted: RefCell::new(Vec::new()),
            reject_with: None,
            on_fill: None,
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject_with: Some(reason.to_string()),
            ..Self::accepting()
        }
    }

    pub fn with_fill(mut self, on_fill: impl Fn(&TradeIntent) + 'a) -> Self {
        self.on_fill = Some(Box::new(on_fill));
        self
    }
}

impl ExecutionPort for RecordingGateway<'_> {
    fn submit(&self, intent: &TradeIntent) -> SubmitOutcome {
        self.submitted.borrow_mut().push(intent.clone());
        if let Some(reason) = &self.reject_with {
            return SubmitOutcome::Rejected {
                reason: reason.clone(),
            };
        }
        if let Some(fill) = &self.on_fill {
            fill(intent);
        }
        SubmitOutcome::Accepted
    }
}

/// Candle `i` minutes after a fixed epoch with the given close and range.
pub fn make_candle(i: usize, close: f64, range: f64, volume: f64) -> Candle {
    Candle {
        open_time: DateTime::from_timestamp(1_700_000_000 + i as i64 * 60, 0).unwrap(),
        open: close,
        high: close + range / 2.0,
        low: close - range / 2.0,
        close,
        volume,
    }
}

pub fn make_candles(closes: &[f64], range: f64, volume: f64) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_candle(i, close, range, volume))
        .collect()
}

pub fn make_series(closes: &[f64], range: f64) -> CandleSeries {
    CandleSeries::from_candles(make_candles(closes, range, 5_000.0)).unwrap()
}

/// 100, 101, ... for `count` bars.
pub fn rising_closes(count: usize) -> Vec<f64> {
    (0..count).map(|i| 100.0 + i as f64).collect()
}

pub fn sample_strategy() -> StrategyConfig {
    StrategyConfig {
        fast_period: 3,
        slow_period: 8,
        risk_reward_ratio: 1.2,
        volume_threshold: None,
    }
}

pub fn sample_risk() -> RiskConfig {
    RiskConfig {
        initial_balance: 10_000.0,
        risk_per_trade: 0.5,
        max_drawdown: Some(0.1),
    }
}

pub fn sample_account() -> SharedAccount {
    SharedAccount::new(AccountState::new(sample_risk()))
}
