//! Domain error types.

/// Top-level error type for gridtrader.
#[derive(Debug, thiserror::Error)]
pub enum GridtraderError {
    #[error("invalid grid parameter {param}: {reason}")]
    Config { param: String, reason: String },

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

    #[error("buy requires {required:.2} but only {available:.2} cash available")]
    InsufficientCash { required: f64, available: f64 },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&GridtraderError> for std::process::ExitCode {
    fn from(err: &GridtraderError) -> Self {
        let code: u8 = match err {
            GridtraderError::Io(_) => 1,
            GridtraderError::ConfigParse { .. }
            | GridtraderError::ConfigMissing { .. }
            | GridtraderError::ConfigInvalid { .. }
            | GridtraderError::Config { .. } => 2,
            GridtraderError::InsufficientCash { .. } => 3,
            GridtraderError::Data { .. } | GridtraderError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
