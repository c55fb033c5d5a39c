//! Common error types for ossdisk.

use thiserror::Error;

/// Top-level error type for ossdisk operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote object-storage service or its SDK reported a failure.
    ///
    /// Network failures, permission denials, missing objects and throttling
    /// all land here; callers are not expected to tell them apart.
    #[error("Remote error: {0}")]
    Remote(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
