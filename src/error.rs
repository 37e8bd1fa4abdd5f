//! Error types for testreport

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for testreport operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for testreport
#[derive(Error, Debug)]
pub enum Error {
    /// A report file could not be interpreted as a run report.
    #[error("Invalid report {path}: {reason}")]
    InvalidReport { path: PathBuf, reason: String },

    /// Configuration file error or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to parse input data.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A screenshot or browser log could not be captured.
    #[error("Capture failed: {0}")]
    Capture(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error with custom message.
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(e: tempfile::PersistError) -> Self {
        Error::Io(e.error)
    }
}
