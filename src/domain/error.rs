//! Domain error types.

/// Top-level error type for mocktrader.
#[derive(Debug, thiserror::Error)]
pub enum MocktraderError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no price data for {ticker}")]
    NoData { ticker: String },

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

    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },

    #[error("invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: f64, requested: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MocktraderError> for std::process::ExitCode {
    fn from(err: &MocktraderError) -> Self {
        let code: u8 = match err {
            MocktraderError::Io(_) => 1,
            MocktraderError::ConfigParse { .. }
            | MocktraderError::ConfigMissing { .. }
            | MocktraderError::ConfigInvalid { .. } => 2,
            MocktraderError::Storage { .. } => 3,
            MocktraderError::InvalidOrder { .. }
            | MocktraderError::InvalidAmount { .. }
            | MocktraderError::InsufficientFunds { .. } => 4,
            MocktraderError::Data { .. } | MocktraderError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        let err = MocktraderError::ConfigMissing {
            section: "strategy".into(),
            key: "kind".into(),
        };
        assert_eq!(err.to_string(), "missing config key [strategy] kind");

        let err = MocktraderError::NoData {
            ticker: "AAPL".into(),
        };
        assert_eq!(err.to_string(), "no price data for AAPL");

        let err = MocktraderError::InsufficientFunds {
            balance: 500.0,
            requested: 1000.0,
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: balance 500, requested 1000"
        );
    }

    #[test]
    fn io_error_converts() {
        let err: MocktraderError = std::io::Error::other("boom").into();
        assert!(matches!(err, MocktraderError::Io(_)));
    }
}
