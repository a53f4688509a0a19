//! Domain error types.

/// Top-level error type for laddersim.
#[derive(Debug, thiserror::Error)]
pub enum LaddersimError {
    #[error("store error: {reason}")]
    Store { reason: String },

    #[error("store query error: {reason}")]
    StoreQuery { reason: String },

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

    #[error("invalid rule: {reason}")]
    RuleInvalid { reason: String },

    #[error("unknown trigger reference: {value}")]
    UnknownReference { value: String },

    #[error("unknown trigger direction: {value}")]
    UnknownDirection { value: String },

    #[error("no candle data for {instrument}")]
    NoData { instrument: String },

    #[error("candle data error: {reason}")]
    CandleData { reason: String },

    #[error("position value must be positive, got {value}")]
    InvalidPositionValue { value: f64 },

    #[error("no open position for {instrument}")]
    NoOpenPosition { instrument: String },

    #[error("notification error for {username}: {reason}")]
    Notify { username: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&LaddersimError> for std::process::ExitCode {
    fn from(err: &LaddersimError) -> Self {
        let code: u8 = match err {
            LaddersimError::Io(_) => 1,
            LaddersimError::ConfigParse { .. }
            | LaddersimError::ConfigMissing { .. }
            | LaddersimError::ConfigInvalid { .. } => 2,
            LaddersimError::Store { .. } | LaddersimError::StoreQuery { .. } => 3,
            LaddersimError::RuleInvalid { .. }
            | LaddersimError::UnknownReference { .. }
            | LaddersimError::UnknownDirection { .. } => 4,
            LaddersimError::NoData { .. } | LaddersimError::CandleData { .. } => 5,
            LaddersimError::InvalidPositionValue { .. }
            | LaddersimError::NoOpenPosition { .. } => 6,
            LaddersimError::Notify { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}
