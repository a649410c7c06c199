//! One trading run: fetch candles, build the series, run the engine.

use std::fmt;
use std::str::FromStr;

use crate::domain::account::SharedAccount;
use crate::domain::engine::{DecisionEngine, RunSummary};
use crate::domain::error::TraderError;
use crate::domain::series::CandleSeries;
use crate::ports::data_port::MarketDataPort;

/// What to fetch from the market data port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketRequest {
    pub symbol: String,
    pub interval: String,
    pub limit: usize,
}

impl Default for MarketRequest {
    fn default() -> Self {
        MarketRequest {
            symbol: "BTCUSDT".to_string(),
            interval: "1m".to_string(),
            limit: 250,
        }
    }
}

/// Where candles come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    /// `<SYMBOL>_<interval>.csv` files in a data directory.
    #[default]
    Csv,
    /// Binance spot klines over HTTP.
    Binance,
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(DataSource::Csv),
            "binance" => Ok(DataSource::Binance),
            other => Err(format!("unknown data source '{other}', expected csv or binance")),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Csv => write!(f, "csv"),
            DataSource::Binance => write!(f, "binance"),
        }
    }
}

/// Fetch and validate the candle series for `request`.
pub fn load_series(
    data_port: &dyn MarketDataPort,
    request: &MarketRequest,
) -> Result<CandleSeries, TraderError> {
    let candles = data_port.fetch_candles(&request.symbol, &request.interval, request.limit)?;
    CandleSeries::from_candles(candles)
}

/// Run the engine over freshly fetched data. A data failure aborts before
/// any bar is evaluated.
pub fn run_session(
    data_port: &dyn MarketDataPort,
    request: &MarketRequest,
    engine: &DecisionEngine<'_>,
    account: &SharedAccount,
) -> Result<RunSummary, TraderError> {
    let series = load_series(data_port, request)?;
    engine.run(&series, account)
}
