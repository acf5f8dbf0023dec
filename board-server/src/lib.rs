//! # Drawboard Server Library
//!
//! Shared types and functionality for the drawboard server.
//! This library is used by both the binary and integration tests.

pub mod broadcast;
pub mod config;
pub mod health;
pub mod metrics;

pub use broadcast::{handle_board_socket, BoardState};
pub use config::ServerConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast coordinator for the shared drawing session.
    pub board: BoardState,
}

impl AppState {
    /// Create state around an existing board.
    #[must_use]
    pub fn new(board: BoardState) -> Self {
        Self { board }
    }

    /// Get a reference to the board state.
    #[must_use]
    pub fn board(&self) -> &BoardState {
        &self.board
    }
}
