//! Error types for the Concise application.

use thiserror::Error;

/// A shared error type for the entire Concise workspace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConciseError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected user input (oversized attachment, unsupported file type)
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConciseError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<std::io::Error> for ConciseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

/// A type alias for `Result<T, ConciseError>`.
pub type Result<T> = std::result::Result<T, ConciseError>;
