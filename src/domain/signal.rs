//! Crossover detection, bracket levels and trade intents.

use serde::Serialize;
use std::fmt;

use crate::domain::error::TraderError;
use crate::domain::indicator::IndicatorSnapshot;

/// Multiplier from volatility to stop-loss distance.
pub const STOP_LOSS_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// fast > slow is long, fast < slow is short, anything else (equal or NaN) is
/// no signal.
pub fn crossover(snapshot: &IndicatorSnapshot) -> Option<Side> {
    if snapshot.fast_ema > snapshot.slow_ema {
        Some(Side::Long)
    } else if snapshot.fast_ema < snapshot.slow_ema {
        Some(Side::Short)
    } else {
        None
    }
}

/// Stop and target distances from the entry price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub stop_distance: f64,
    pub target_distance: f64,
}

impl Bracket {
    /// stop = 1.5 * volatility, target = stop * risk_reward_ratio.
    pub fn from_volatility(volatility: f64, risk_reward_ratio: f64) -> Self {
        let stop_distance = STOP_LOSS_MULTIPLIER * volatility;
        Bracket {
            stop_distance,
            target_distance: stop_distance * risk_reward_ratio,
        }
    }

    /// Both distances strictly positive and finite.
    pub fn is_tradeable(&self) -> bool {
        [self.stop_distance, self.target_distance]
            .iter()
            .all(|d| d.is_finite() && *d > 0.0)
    }

    /// (stop_loss_price, take_profit_price) around `entry` for `side`.
    pub fn levels(&self, side: Side, entry: f64) -> (f64, f64) {
        match side {
            Side::Long => (entry - self.stop_distance, entry + self.target_distance),
            Side::Short => (entry + self.stop_distance, entry - self.target_distance),
        }
    }
}

/// A sized entry with stop-loss and take-profit levels.
///
/// Long: stop < entry < target. Short: stop > entry > target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeIntent {
    side: Side,
    entry_price: f64,
    stop_loss_price: f64,
    take_profit_price: f64,
    quantity: f64,
}

impl TradeIntent {
    pub fn new(
        side: Side,
        entry_price: f64,
        stop_loss_price: f64,
        take_profit_price: f64,
        quantity: f64,
    ) -> Result<Self, TraderError> {
        let ordered = match side {
            Side::Long => stop_loss_price < entry_price && entry_price < take_profit_price,
            Side::Short => stop_loss_price > entry_price && entry_price > take_profit_price,
        };
        if !ordered {
            return Err(TraderError::InvalidIntent {
                reason: format!(
                    "{side} bracket out of order: stop {stop_loss_price}, entry {entry_price}, target {take_profit_price}"
                ),
            });
        }
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(TraderError::InvalidIntent {
                reason: format!("quantity must be finite and non-negative, got {quantity}"),
            });
        }
        Ok(TradeIntent {
            side,
            entry_price,
            stop_loss_price,
            take_profit_price,
            quantity,
        })
    }

    /// Build an intent at `entry` using bracket distances.
    pub fn bracketed(
        side: Side,
        entry: f64,
        bracket: &Bracket,
        quantity: f64,
    ) -> Result<Self, TraderError> {
        let (stop, target) = bracket.levels(side, entry);
        Self::new(side, entry, stop, target, quantity)
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    pub fn stop_loss_price(&self) -> f64 {
        self.stop_loss_price
    }

    pub fn take_profit_price(&self) -> f64 {
        self.take_profit_price
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }
}

impl fmt::Display for TradeIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} @ {} | SL: {} | TP: {}",
            self.side, self.quantity, self.entry_price, self.stop_loss_price, self.take_profit_price
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn snapshot(fast: f64, slow: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            fast_ema: fast,
            slow_ema: slow,
            volatility: 3.0,
        }
    }

    #[test]
    fn crossover_long() {
        assert_eq!(crossover(&snapshot(101.0, 100.0)), Some(Side::Long));
    }

    #[test]
    fn crossover_short() {
        assert_eq!(crossover(&snapshot(99.0, 100.0)), Some(Side::Short));
    }

    #[test]
    fn crossover_equal_is_none() {
        assert_eq!(crossover(&snapshot(100.0, 100.0)), None);
    }

    #[test]
    fn crossover_nan_is_none() {
        assert_eq!(crossover(&snapshot(f64::NAN, 100.0)), None);
    }

    #[test]
    fn bracket_distances() {
        let bracket = Bracket::from_volatility(3.0, 1.2);
        assert_relative_eq!(bracket.stop_distance, 4.5);
        assert_relative_eq!(bracket.target_distance, 5.4);
        assert!(bracket.is_tradeable());
    }

    #[test]
    fn zero_volatility_is_not_tradeable() {
        assert!(!Bracket::from_volatility(0.0, 1.5).is_tradeable());
        assert!(!Bracket::from_volatility(-1.0, 1.5).is_tradeable());
        assert!(!Bracket::from_volatility(2.0, 0.0).is_tradeable());
    }

    #[test]
    fn long_levels() {
        let bracket = Bracket::from_volatility(3.0, 1.2);
        let intent = TradeIntent::bracketed(Side::Long, 108.0, &bracket, 50.0).unwrap();
        assert_eq!(intent.side(), Side::Long);
        assert_relative_eq!(intent.entry_price(), 108.0);
        assert_relative_eq!(intent.stop_loss_price(), 103.5);
        assert_relative_eq!(intent.take_profit_price(), 113.4);
        assert_relative_eq!(intent.quantity(), 50.0);
    }

    #[test]
    fn short_levels_are_mirrored() {
        let bracket = Bracket::from_volatility(2.0, 1.5);
        let intent = TradeIntent::bracketed(Side::Short, 100.0, &bracket, 10.0).unwrap();
        assert_relative_eq!(intent.stop_loss_price(), 103.0);
        assert_relative_eq!(intent.take_profit_price(), 95.5);
    }

    #[test]
    fn new_rejects_unordered_long() {
        let err = TradeIntent::new(Side::Long, 100.0, 101.0, 105.0, 1.0).unwrap_err();
        assert!(matches!(err, TraderError::InvalidIntent { .. }));
    }

    #[test]
    fn new_rejects_unordered_short() {
        assert!(TradeIntent::new(Side::Short, 100.0, 99.0, 95.0, 1.0).is_err());
    }

    #[test]
    fn new_rejects_negative_quantity() {
        assert!(TradeIntent::new(Side::Long, 100.0, 99.0, 101.0, -1.0).is_err());
    }

    #[test]
    fn display_format() {
        let intent = TradeIntent::new(Side::Long, 100.0, 95.0, 110.0, 2.0).unwrap();
        assert_eq!(intent.to_string(), "LONG 2 @ 100 | SL: 95 | TP: 110");
    }
}
