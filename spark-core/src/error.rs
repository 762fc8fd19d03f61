//! Error types for core canvas operations.

use thiserror::Error;

/// Result type for core canvas operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core canvas operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Snapshot serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O error while persisting the offline snapshot.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
