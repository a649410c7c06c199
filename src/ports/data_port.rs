//! Market data port trait.

use crate::domain::candle::Candle;
use crate::domain::error::TraderError;

pub trait MarketDataPort {
    /// The most recent `limit` candles for `symbol`/`interval`, oldest first.
    ///
    /// Failures are reported as `TraderError::DataUnavailable`.
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, TraderError>;
}
