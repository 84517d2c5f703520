//! Error types for durakv
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Absence (missing key, missing or empty queue) is not an error: read
//! operations return `Option` and conditional mutations return `Option`/`bool`.

use std::io;
use thiserror::Error;

/// Result type alias for durakv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for durakv
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (log append, snapshot write/rename, file read)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Data corruption detected
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// A log record is missing fields required by its kind
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Caller supplied unusable input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    /// Whether this error came from the filesystem
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}
