// src/error.rs

//! Crate-wide error type
//!
//! Errors carry a human-readable message. `Error::kind()` groups the variants
//! into the three classes callers act on: configuration problems (surfaced,
//! never retried), I/O problems (network, filesystem, malformed data) and
//! validation problems (a batch of messages shown together).

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error class a caller can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Io,
    Validation,
}

#[derive(Debug, Error)]
pub enum Error {
    /// Repository not registered, invalid action, missing template file
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Download error: {0}")]
    DownloadError(String),

    /// Content that is not valid structured data
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Initialization error: {0}")]
    InitError(String),

    /// Every problem found, in the order it was detected
    #[error("Validation failed:\n{}", .0.join("\n"))]
    ValidationError(Vec<String>),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IoError(_) | Self::DownloadError(_) | Self::ParseError(_) => ErrorKind::Io,
            Self::ValidationError(_) => ErrorKind::Validation,
            Self::ConfigurationError(_)
            | Self::NotFoundError(_)
            | Self::InitError(_) => ErrorKind::Configuration,
        }
    }

    /// Validation messages, empty for every other variant
    pub fn messages(&self) -> &[String] {
        match self {
            Self::ValidationError(messages) => messages,
            _ => &[],
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}
