//! Single-bar range volatility.
//!
//! VOL[i] = (H[i] - L[i]) * 1.5. No averaging across bars.

use crate::domain::candle::Candle;

pub const RANGE_MULTIPLIER: f64 = 1.5;

pub fn range_volatility(candle: &Candle) -> f64 {
    candle.range() * RANGE_MULTIPLIER
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn candle(high: f64, low: f64) -> Candle {
        Candle {
            open_time: DateTime::from_timestamp(0, 0).unwrap(),
            open: low,
            high,
            low,
            close: high,
            volume: 0.0,
        }
    }

    #[test]
    fn scales_range() {
        assert!((range_volatility(&candle(102.0, 100.0)) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn flat_bar_has_zero_volatility() {
        assert_eq!(range_volatility(&candle(100.0, 100.0)), 0.0);
    }

    #[test]
    fn inverted_bar_goes_negative() {
        assert!(range_volatility(&candle(99.0, 100.0)) < 0.0);
    }
}
