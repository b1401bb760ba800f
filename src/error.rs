//! Error types.
//!
//! Two layers:
//!
//! - [`ForecastError`] is the typed error returned by the library (ingest,
//!   fitting, persistence, viewer loading).
//! - [`AppError`] is what the binary reports: a message plus a process exit code.
//!
//! Exit codes:
//! - `2` input/schema/configuration problems
//! - `3` not enough data for the configured model order
//! - `4` numerical or terminal failures
//! - `5` output could not be written

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ArimaOrder;

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors produced by the forecasting pipeline and the viewer.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    /// Required columns are absent or the header cannot be interpreted.
    #[error("schema mismatch: {0}")]
    Schema(String),

    /// A data row could not be parsed (1-based CSV line number).
    #[error("line {line}: {message}")]
    InvalidRow { line: usize, message: String },

    #[error(
        "insufficient data for ARIMA{order}: need at least {needed} training observations, got {got}"
    )]
    InsufficientData {
        order: ArimaOrder,
        needed: usize,
        got: usize,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("computation error: {0}")]
    Computation(String),

    #[error("failed to write '{}': {message}", path.display())]
    Output { path: PathBuf, message: String },
}

impl ForecastError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }

    /// Process exit code used when this error terminates the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingFile(_)
            | Self::Io { .. }
            | Self::Csv { .. }
            | Self::Schema(_)
            | Self::InvalidRow { .. }
            | Self::InvalidParameter(_) => 2,
            Self::InsufficientData { .. } => 3,
            Self::Computation(_) => 4,
            Self::Output { .. } => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
