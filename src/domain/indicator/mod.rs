//! Indicator engine.
//!
//! - `IndicatorPeriods`: fast/slow EMA periods
//! - `IndicatorSnapshot`: fast EMA, slow EMA and volatility at one bar
//! - `compute_indicators`: pure function of the series up to an index

pub mod ema;
pub mod volatility;

use std::fmt;

use crate::domain::error::TraderError;
use crate::domain::series::CandleSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorPeriods {
    pub fast: usize,
    pub slow: usize,
}

impl IndicatorPeriods {
    /// First bar index with enough history.
    pub fn first_index(&self) -> usize {
        self.slow
    }

    /// Candles needed before any bar can be evaluated.
    pub fn min_bars(&self) -> usize {
        self.slow + 1
    }
}

impl fmt::Display for IndicatorPeriods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EMA({})/EMA({})", self.fast, self.slow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub fast_ema: f64,
    pub slow_ema: f64,
    pub volatility: f64,
}

/// Compute the snapshot for bar `index`.
///
/// Fails with `InsufficientHistory` when `index < slow` and `BarOutOfRange`
/// when `index` is past the end of the series. Only bars `index - 1` and
/// `index` are read.
pub fn compute_indicators(
    series: &CandleSeries,
    index: usize,
    periods: IndicatorPeriods,
) -> Result<IndicatorSnapshot, TraderError> {
    let minimum = periods.first_index().max(1);
    if index < minimum {
        return Err(TraderError::InsufficientHistory { index, minimum });
    }
    let candles = series.as_slice();
    let Some(candle) = candles.get(index) else {
        return Err(TraderError::BarOutOfRange {
            index,
            len: candles.len(),
        });
    };

    Ok(IndicatorSnapshot {
        fast_ema: ema::two_point_ema(candles, index, periods.fast),
        slow_ema: ema::two_point_ema(candles, index, periods.slow),
        volatility: volatility::range_volatility(candle),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::Candle;
    use approx::assert_relative_eq;
    use chrono::DateTime;

    fn rising_series(count: usize) -> CandleSeries {
        CandleSeries::from_candles((0..count).map(|i| {
            let close = 100.0 + i as f64;
            Candle {
                open_time: DateTime::from_timestamp(i as i64 * 60, 0).unwrap(),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 2_000.0,
            }
        }))
        .unwrap()
    }

    const PERIODS: IndicatorPeriods = IndicatorPeriods { fast: 3, slow: 8 };

    #[test]
    fn periods_display() {
        assert_eq!(PERIODS.to_string(), "EMA(3)/EMA(8)");
        assert_eq!(PERIODS.min_bars(), 9);
    }

    #[test]
    fn snapshot_at_first_valid_index() {
        let series = rising_series(9);
        let snap = compute_indicators(&series, 8, PERIODS).unwrap();

        assert_relative_eq!(snap.fast_ema, 107.5);
        let k = 2.0 / 9.0;
        assert_relative_eq!(snap.slow_ema, 108.0 * k + 107.0 * (1.0 - k));
        assert_relative_eq!(snap.volatility, 3.0);
        assert!(snap.fast_ema > snap.slow_ema);
    }

    #[test]
    fn premature_index_is_insufficient_history() {
        let series = rising_series(20);
        let err = compute_indicators(&series, 7, PERIODS).unwrap_err();
        assert!(matches!(
            err,
            TraderError::InsufficientHistory {
                index: 7,
                minimum: 8
            }
        ));
    }

    #[test]
    fn index_past_end_is_out_of_range() {
        let series = rising_series(9);
        let err = compute_indicators(&series, 9, PERIODS).unwrap_err();
        assert!(matches!(err, TraderError::BarOutOfRange { index: 9, len: 9 }));
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let series = rising_series(30);
        for index in 8..30 {
            let a = compute_indicators(&series, index, PERIODS).unwrap();
            let b = compute_indicators(&series, index, PERIODS).unwrap();
            assert_eq!(a.fast_ema.to_bits(), b.fast_ema.to_bits());
            assert_eq!(a.slow_ema.to_bits(), b.slow_ema.to_bits());
            assert_eq!(a.volatility.to_bits(), b.volatility.to_bits());
        }
    }

    #[test]
    fn appending_does_not_change_earlier_snapshots() {
        let short = rising_series(10);
        let long = rising_series(40);
        assert_eq!(
            compute_indicators(&short, 9, PERIODS).unwrap(),
            compute_indicators(&long, 9, PERIODS).unwrap()
        );
    }
}
