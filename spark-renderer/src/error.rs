//! Error types for rendering operations.

use thiserror::Error;

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// GPU initialization failed.
    #[error("GPU initialization failed: {0}")]
    GpuInit(String),

    /// The renderer was used after disposal.
    #[error("Renderer already disposed")]
    Disposed,

    /// Invalid surface dimensions.
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}
