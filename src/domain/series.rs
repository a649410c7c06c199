//! Append-only, chronologically ordered candle series.

use crate::domain::candle::Candle;
use crate::domain::error::TraderError;

#[derive(Debug, Clone, Default)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series by appending every candle in order; stops at the first
    /// rejected candle.
    pub fn from_candles<I>(candles: I) -> Result<Self, TraderError>
    where
        I: IntoIterator<Item = Candle>,
    {
        let mut series = Self::new();
        for candle in candles {
            series.push(candle)?;
        }
        Ok(series)
    }

    /// Append a candle. Values must be finite and non-negative and the open
    /// time must be strictly after the last candle's.
    pub fn push(&mut self, candle: Candle) -> Result<(), TraderError> {
        let index = self.candles.len();
        if let Some(field) = candle.invalid_field() {
            return Err(TraderError::InvalidCandle {
                index,
                reason: format!("{field} must be finite and non-negative"),
            });
        }
        if let Some(last) = self.candles.last() {
            if candle.open_time <= last.open_time {
                return Err(TraderError::OutOfOrderCandle { index });
            }
        }
        self.candles.push(candle);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }
}
