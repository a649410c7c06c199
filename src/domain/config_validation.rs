//! Configuration validation.
//!
//! Validates all config fields before a run starts. Absent optional keys are
//! fine; present keys must parse and be in range.

use crate::domain::error::TraderError;
use crate::domain::session::DataSource;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    validate_market_config(config)?;
    validate_strategy_config(config)?;
    validate_risk_config(config)?;
    validate_execution_config(config)?;
    Ok(())
}

pub fn validate_market_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    validate_symbol(config)?;
    if let Some(interval) = config.get_string("market", "interval") {
        if interval.trim().is_empty() {
            return Err(TraderError::config_invalid(
                "market",
                "interval",
                "interval must not be empty",
            ));
        }
    }
    if let Some(limit) = integer(config, "market", "limit")? {
        if limit < 1 {
            return Err(TraderError::config_invalid(
                "market",
                "limit",
                "limit must be at least 1",
            ));
        }
    }
    if let Some(source) = present(config, "market", "source") {
        source
            .parse::<DataSource>()
            .map_err(|reason| TraderError::config_invalid("market", "source", reason))?;
    }
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let fast = integer(config, "strategy", "fast_period")?.unwrap_or(3);
    let slow = integer(config, "strategy", "slow_period")?.unwrap_or(8);
    if fast < 1 {
        return Err(TraderError::config_invalid(
            "strategy",
            "fast_period",
            "fast_period must be at least 1",
        ));
    }
    if slow <= fast {
        return Err(TraderError::config_invalid(
            "strategy",
            "slow_period",
            "slow_period must be greater than fast_period",
        ));
    }

    let ratio = number(config, "strategy", "risk_reward_ratio")?.unwrap_or(1.5);
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(TraderError::config_invalid(
            "strategy",
            "risk_reward_ratio",
            "risk_reward_ratio must be positive",
        ));
    }

    if let Some(threshold) = number(config, "strategy", "volume_threshold")? {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(TraderError::config_invalid(
                "strategy",
                "volume_threshold",
                "volume_threshold must be non-negative",
            ));
        }
    }
    Ok(())
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let balance = number(config, "risk", "initial_balance")?.unwrap_or(10_000.0);
    if !balance.is_finite() || balance <= 0.0 {
        return Err(TraderError::config_invalid(
            "risk",
            "initial_balance",
            "initial_balance must be positive",
        ));
    }

    let risk = number(config, "risk", "risk_per_trade")?.unwrap_or(0.5);
    if !(risk > 0.0 && risk <= 100.0) {
        return Err(TraderError::config_invalid(
            "risk",
            "risk_per_trade",
            "risk_per_trade must be between 0 and 100",
        ));
    }

    if let Some(drawdown) = number(config, "risk", "max_drawdown")? {
        if !(drawdown > 0.0 && drawdown < 1.0) {
            return Err(TraderError::config_invalid(
                "risk",
                "max_drawdown",
                "max_drawdown must be between 0 and 1",
            ));
        }
    }
    Ok(())
}

pub fn validate_execution_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    if let Some(max) = number(config, "execution", "max_quantity")? {
        if !max.is_finite() || max <= 0.0 {
            return Err(TraderError::config_invalid(
                "execution",
                "max_quantity",
                "max_quantity must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), TraderError> {
    match config.get_string("market", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(TraderError::ConfigMissing {
            section: "market".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn present(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, TraderError> {
    present(config, section, key)
        .map(|v| {
            v.parse::<f64>().map_err(|_| {
                TraderError::config_invalid(section, key, format!("{key} must be a number"))
            })
        })
        .transpose()
}

fn integer(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, TraderError> {
    present(config, section, key)
        .map(|v| {
            v.parse::<i64>().map_err(|_| {
                TraderError::config_invalid(section, key, format!("{key} must be an integer"))
            })
        })
        .transpose()
}
