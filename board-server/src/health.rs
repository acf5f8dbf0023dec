//! Health check endpoints.
//!
//! - `/` and `/health` - status payload for dashboards and uptime checks
//! - `/health/live` - bare liveness probe (restart if it fails)
//!
//! The broadcast core never depends on these; they exist for operators.

use axum::{http::StatusCode, Json};
use board_core::session::current_timestamp_ms;
use serde::Serialize;

/// Health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Overall status, always "ok" while the process serves requests.
    pub status: &'static str,
    /// Human-readable server description.
    pub message: &'static str,
    /// Response timestamp in Unix milliseconds.
    pub timestamp: u64,
    /// Server version.
    pub version: &'static str,
}

/// Liveness probe - is the process alive?
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Status endpoint with the payload the legacy clients poll for.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        message: "drawboard server running",
        timestamp: current_timestamp_ms(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
