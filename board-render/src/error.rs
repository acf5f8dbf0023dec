//! Error types for rendering operations.

use thiserror::Error;

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rasterizing.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested surface dimensions are not representable.
    #[error("invalid surface size {width}x{height}")]
    InvalidSurfaceSize {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// A background image could not be decoded.
    #[error("failed to decode background image: {0}")]
    ImageDecode(String),
}
