//! Domain error types.

/// Top-level error type for emacross.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("insufficient history at bar {index}: need index >= {minimum}")]
    InsufficientHistory { index: usize, minimum: usize },

    #[error("bar {index} out of range for series of {len} candles")]
    BarOutOfRange { index: usize, len: usize },

    #[error("market data unavailable for {symbol} {interval}: {reason}")]
    DataUnavailable {
        symbol: String,
        interval: String,
        reason: String,
    },

    #[error("trade rejected: {reason}")]
    TradeRejected { reason: String },

    #[error("invalid candle at position {index}: {reason}")]
    InvalidCandle { index: usize, reason: String },

    #[error("candle at position {index} is not after the previous candle")]
    OutOfOrderCandle { index: usize },

    #[error("invalid trade intent: {reason}")]
    InvalidIntent { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TraderError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) => 1,
            TraderError::ConfigParse { .. }
            | TraderError::ConfigMissing { .. }
            | TraderError::ConfigInvalid { .. } => 2,
            TraderError::DataUnavailable { .. } => 3,
            TraderError::InvalidCandle { .. } | TraderError::OutOfOrderCandle { .. } => 4,
            TraderError::InsufficientHistory { .. } | TraderError::BarOutOfRange { .. } => 5,
            TraderError::TradeRejected { .. } | TraderError::InvalidIntent { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_section_and_key() {
        let err = TraderError::config_invalid("risk", "max_drawdown", "must be between 0 and 1");
        assert_eq!(
            err.to_string(),
            "invalid config value [risk] max_drawdown: must be between 0 and 1"
        );
    }

    #[test]
    fn display_data_unavailable() {
        let err = TraderError::DataUnavailable {
            symbol: "BTCUSDT".into(),
            interval: "1m".into(),
            reason: "file not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "market data unavailable for BTCUSDT 1m: file not found"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TraderError = io.into();
        assert!(matches!(err, TraderError::Io(_)));
    }
}
