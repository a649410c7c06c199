//! Two-sample exponential moving average.
//!
//! k = 2/(n+1), EMA[i] = C[i]*k + C[i-1]*(1-k).
//! Only the current and previous close contribute; there is no running state
//! and no SMA seed, so this is not the textbook cumulative EMA.

use crate::domain::candle::Candle;

/// Smoothing factor for a period: 2/(n+1).
pub fn smoothing_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// EMA at `index` from the closes at `index` and `index - 1`.
///
/// Caller guarantees `1 <= index < candles.len()`.
pub fn two_point_ema(candles: &[Candle], index: usize, period: usize) -> f64 {
    let k = smoothing_factor(period);
    candles[index].close * k + candles[index - 1].close * (1.0 - k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn make_candles(prices: &[f64]) -> Vec<Candle> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                open_time: DateTime::from_timestamp(i as i64 * 60, 0).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn smoothing_factor_values() {
        assert!((smoothing_factor(3) - 0.5).abs() < f64::EPSILON);
        assert!((smoothing_factor(8) - 2.0 / 9.0).abs() < f64::EPSILON);
        assert!((smoothing_factor(1) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_uses_only_two_closes() {
        let candles = make_candles(&[1_000.0, 10.0, 20.0]);
        let k = smoothing_factor(3);

        let ema = two_point_ema(&candles, 2, 3);
        assert!((ema - (20.0 * k + 10.0 * (1.0 - k))).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_period_1_is_current_close() {
        let candles = make_candles(&[10.0, 20.0]);
        assert!((two_point_ema(&candles, 1, 1) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_equal_prices() {
        let candles = make_candles(&[100.0, 100.0]);
        for period in [2, 3, 8, 50] {
            assert!((two_point_ema(&candles, 1, period) - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn shorter_period_weights_current_close_more() {
        let candles = make_candles(&[100.0, 110.0]);
        let fast = two_point_ema(&candles, 1, 3);
        let slow = two_point_ema(&candles, 1, 8);
        assert!(fast > slow);
    }
}
