//! Client error types.

use thiserror::Error;

/// Errors surfaced by the board client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport task has shut down; no more messages can be sent.
    #[error("transport closed")]
    TransportClosed,

    /// The local surface could not be created.
    #[error(transparent)]
    Render(#[from] board_render::RenderError),
}
