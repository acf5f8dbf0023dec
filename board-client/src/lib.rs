//! # Drawboard Client
//!
//! Native client for the shared drawing board:
//!
//! - [`transport`]: persistent WebSocket connection with automatic,
//!   capped-exponential-backoff reconnection.
//! - [`replica`]: the local canvas replica - stroke history plus a raster
//!   surface, kept in sync by replaying server events.
//! - [`client`]: glue that pumps transport events into the replica and
//!   requests a full resync after every reconnect.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod replica;
pub mod transport;

pub use client::BoardClient;
pub use error::ClientError;
pub use replica::BoardReplica;
pub use transport::{RetryConfig, Transport, TransportConfig, TransportEvent, TransportHandle};
