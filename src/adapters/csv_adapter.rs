//! CSV candle file adapter.
//!
//! Reads `<base_path>/<SYMBOL>_<interval>.csv` with the header
//! `open_time,open,high,low,close,volume`, where `open_time` is epoch
//! milliseconds.

use crate::domain::candle::Candle;
use crate::domain::error::TraderError;
use crate::ports::data_port::MarketDataPort;
use chrono::DateTime;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct CandleRow {
    open_time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvCandleAdapter {
    base_path: PathBuf,
}

impl CsvCandleAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol.to_uppercase(), interval))
    }
}

impl MarketDataPort for CsvCandleAdapter {
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

        let path = self.csv_path(symbol, interval);
        let content = fs::read_to_string(&path)
            .map_err(|e| unavailable(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for (line, result) in rdr.deserialize::<CandleRow>().enumerate() {
            let row = result.map_err(|e| unavailable(format!("CSV parse error: {}", e)))?;
            let open_time = DateTime::from_timestamp_millis(row.open_time).ok_or_else(|| {
                unavailable(format!(
                    "invalid open_time {} on row {}",
                    row.open_time,
                    line + 1
                ))
            })?;
            candles.push(Candle {
                open_time,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        candles.sort_by_key(|c| c.open_time);
        let skip = candles.len().saturating_sub(limit);
        Ok(candles.split_off(skip))
    }
}
