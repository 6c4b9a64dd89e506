//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Storage(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("{0}")]
    Export(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a workbook (decode/encode) error
    pub fn workbook(msg: impl Into<String>) -> Self {
        Self::Workbook(msg.into())
    }

    /// Create an export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Self::Workbook(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Workbook(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Workbook(err.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of one import run, shaped for direct display by a UI layer.
///
/// `success == false` only for structural failures (unreadable or empty file,
/// nothing importable). Row-level problems land in `errors` and leave
/// `success` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub imported_count: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ImportResult {
    /// Create a successful result
    pub fn ok(imported_count: usize) -> Self {
        Self {
            success: true,
            imported_count,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Create a failed result with a single message
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            imported_count: 0,
            errors: vec![error.into()],
            warnings: Vec::new(),
        }
    }

    /// Append a warning
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Append row-level errors
    pub fn with_errors(mut self, errors: impl IntoIterator<Item = String>) -> Self {
        self.errors.extend(errors);
        self
    }
}
