//! OHLCV candle representation.

use chrono::{DateTime, Utc};

/// One aggregated price/volume bar.
///
/// `high >= max(open, close) >= min(open, close) >= low` is expected from the
/// data source but not enforced here.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns the name of the first field that is negative or not finite.
    pub fn invalid_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite() || *v < 0.0)
        .map(|(name, _)| name)
    }
}
