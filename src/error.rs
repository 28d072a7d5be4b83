//! Error types for the categorizer
//!
//! Library code returns [`Error`] through the crate-wide [`Result`] alias.
//! Classifier failures keep their own kind so the API layer can report them
//! separately from storage problems.

use crate::classifier::ClassifierError;
use thiserror::Error;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// Request data failed validation (empty answer, blank question)
    #[error("{0}")]
    InvalidInput(String),

    /// The external classifier failed or returned unusable data
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Store read or write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Convenience Result type
pub type Result<T> = std::result::Result<T, Error>;
