//! Binance spot kline adapter.
//!
//! `GET {base_url}/api/v3/klines?symbol=..&interval=..&limit=..` answers with
//! an array of arrays. Only the first six fields are read:
//! `[open_time_ms, "open", "high", "low", "close", "volume", ...]`.
//! Prices and volume arrive as decimal strings.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::domain::candle::Candle;
use crate::domain::error::TraderError;
use crate::ports::data_port::MarketDataPort;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Largest `limit` the klines endpoint accepts.
pub const MAX_LIMIT: usize = 1000;

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

pub struct BinanceKlineAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BinanceKlineAdapter {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TraderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TraderError::Io(std::io::Error::other(e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::blocking::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn klines_url(&self) -> String {
        format!("{}/api/v3/klines", self.base_url)
    }
}

impl MarketDataPort for BinanceKlineAdapter {
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, TraderError> {
        let unavailable = |reason: String| TraderError::DataUnavailable {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            reason,
        };

        let limit = limit.clamp(1, MAX_LIMIT);
        let resp = self
            .client
            .get(self.klines_url())
            .query(&[
                ("symbol", symbol.to_uppercase()),
                ("interval", interval.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .map_err(|e| unavailable(format!("request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| unavailable(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<ApiError>(&body) {
                Ok(api) => format!("HTTP {status}: {} (code {})", api.msg, api.code),
                Err(_) => format!("HTTP {status}"),
            };
            return Err(unavailable(reason));
        }

        parse_klines(&body).map_err(unavailable)
    }
}

/// Parse a klines response body into candles, oldest first.
pub fn parse_klines(body: &str) -> Result<Vec<Candle>, String> {
    let rows: Vec<Vec<Value>> =
        serde_json::from_str(body).map_err(|e| format!("invalid klines response: {e}"))?;
    rows.iter()
        .enumerate()
        .map(|(index, row)| parse_row(index, row))
        .collect()
}

fn parse_row(index: usize, row: &[Value]) -> Result<Candle, String> {
    if row.len() < 6 {
        return Err(format!(
            "kline {index} has {} fields, expected at least 6",
            row.len()
        ));
    }
    let millis = row[0]
        .as_i64()
        .ok_or_else(|| format!("kline {index}: open time is not an integer"))?;
    let open_time = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| format!("kline {index}: open time {millis} out of range"))?;

    let field = |pos: usize, name: &str| {
        decimal(&row[pos]).ok_or_else(|| format!("kline {index}: {name} is not a number"))
    };
    Ok(Candle {
        open_time,
        open: field(1, "open")?,
        high: field(2, "high")?,
        low: field(3, "low")?,
        close: field(4, "close")?,
        volume: field(5, "volume")?,
    })
}

fn decimal(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
