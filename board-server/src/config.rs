//! Server configuration from environment variables.

use std::path::PathBuf;

/// Default listen port.
const DEFAULT_PORT: u16 = 3000;

/// Default directory for static files.
const DEFAULT_STATIC_DIR: &str = "public";

/// Runtime configuration for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: u16,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,
    /// Directory served as static files (the built web client).
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Read configuration from the environment.
    ///
    /// - `BOARD_PORT`: listen port (default 3000)
    /// - `BOARD_ALLOWED_ORIGINS`: comma-separated origin allowlist
    /// - `BOARD_STATIC_DIR`: static file directory (default `public`)
    #[must_use]
    pub fn from_env() -> Self {
        let port = std::env::var("BOARD_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let allowed_origins = std::env::var("BOARD_ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_else(|_| default_origins(port));

        let static_dir = std::env::var("BOARD_STATIC_DIR")
            .map_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from);

        Self {
            port,
            allowed_origins,
            static_dir,
        }
    }

    /// Configuration with localhost defaults, used by tests.
    #[must_use]
    pub fn localhost(port: u16) -> Self {
        Self {
            port,
            allowed_origins: default_origins(port),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

/// Split a comma-separated origin list, dropping empty entries.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Localhost origins for the configured port plus common dev-server ports.
fn default_origins(port: u16) -> Vec<String> {
    let mut origins = vec![
        format!("http://localhost:{port}"),
        format!("http://127.0.0.1:{port}"),
    ];
    for dev_port in [3000u16, 5173, 8080] {
        if dev_port != port {
            origins.push(format!("http://localhost:{dev_port}"));
            origins.push(format!("http://127.0.0.1:{dev_port}"));
        }
    }
    origins
}
