//! Error types for stroke validation.

use thiserror::Error;

/// Errors raised when an inbound stroke fails trust-boundary validation.
#[derive(Debug, Error)]
pub enum StrokeError {
    /// The stroke carries no points.
    #[error("stroke has no points")]
    EmptyPoints,
}
