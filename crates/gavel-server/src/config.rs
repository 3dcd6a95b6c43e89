//! Server configuration.

use std::time::Duration;

use gavel_settings::GavelSettings;
use serde::{Deserialize, Serialize};

/// Configuration for the auction server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to (0 = auto-assign).
    pub port: u16,
    /// Maximum concurrent WebSocket connections.
    pub max_connections: usize,
    /// Interval between heartbeat pings, in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// How long a client may go without a pong before it is dropped,
    /// in milliseconds.
    pub heartbeat_timeout_ms: u64,
    /// Maximum inbound WebSocket message size in bytes.
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_connections: 50,
            heartbeat_interval_ms: 30_000,
            heartbeat_timeout_ms: 60_000,
            max_message_size: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Build a config from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &GavelSettings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            max_connections: settings.server.max_connections,
            heartbeat_interval_ms: settings.server.heartbeat_interval_ms,
            heartbeat_timeout_ms: settings.server.heartbeat_timeout_ms,
            max_message_size: settings.server.max_message_size_bytes,
        }
    }

    /// Heartbeat ping interval as a [`Duration`].
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Heartbeat pong deadline as a [`Duration`].
    #[must_use]
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }
}
