//! # Drawboard Core
//!
//! Core drawing-session logic shared by the server and client crates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                board-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Stroke Model    │  Session Store           │
//! │  - Point/Tool    │  - Append-only log       │
//! │  - Styles        │  - Participant registry  │
//! │  - Validation    │  - Snapshots             │
//! ├─────────────────────────────────────────────┤
//! │  Wire Protocol                              │
//! │  - Client/Server message enums              │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod message;
pub mod session;
pub mod stroke;

pub use error::StrokeError;
pub use message::{ClientMessage, ServerMessage};
pub use session::{Participant, SessionSnapshot, SessionStore};
pub use stroke::{Point, Stroke, StrokeStyle, Tool};

/// Drawboard core version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
