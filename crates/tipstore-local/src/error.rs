//! Error types for local storage operations.

use thiserror::Error;

/// Errors that can occur while reading or writing local storage.
#[derive(Debug, Error)]
pub enum LocalError {
    /// A stored value is not valid JSON for the expected type.
    #[error("corrupt entry under {key}: {reason}")]
    Parse { key: String, reason: String },

    /// Serialization of a value failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The backend is unusable (poisoned lock, bad key, ...).
    #[error("backend error: {0}")]
    Backend(String),

    /// I/O error during file-based operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for local storage operations.
pub type Result<T> = std::result::Result<T, LocalError>;
