//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON wire
//! format used by client pages and the settings file. Each type implements
//! [`Default`] with production values, and `#[serde(default)]` allows partial
//! JSON — missing fields fall back to their default during deserialization.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Root settings type for the Gavel auction server.
///
/// Loaded from `~/.gavel/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// All field names are camelCase. Example:
///
/// ```json
/// {
///   "version": "0.1.0",
///   "server": { "port": 4000 },
///   "auction": { "maxTimeLimitSeconds": 600 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GavelSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// Server network settings.
    pub server: ServerSettings,
    /// Auction rule bounds.
    pub auction: AuctionSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for GavelSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "gavel".to_string(),
            server: ServerSettings::default(),
            auction: AuctionSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl GavelSettings {
    /// Clamp out-of-range values into their valid bounds, warning on each
    /// adjustment. Never fails: a bad settings file degrades to usable
    /// values rather than refusing to start.
    pub fn validate(&mut self) {
        if self.server.max_connections == 0 {
            warn!("maxConnections of 0 would refuse every client, clamping to 1");
            self.server.max_connections = 1;
        }
        if self.server.heartbeat_timeout_ms < self.server.heartbeat_interval_ms {
            warn!(
                interval_ms = self.server.heartbeat_interval_ms,
                timeout_ms = self.server.heartbeat_timeout_ms,
                "heartbeat timeout below interval, clamping to 2x interval"
            );
            self.server.heartbeat_timeout_ms = self.server.heartbeat_interval_ms * 2;
        }
        if self.auction.min_time_limit_seconds == 0 {
            warn!("minTimeLimitSeconds of 0 disallowed, clamping to 1");
            self.auction.min_time_limit_seconds = 1;
        }
        if self.auction.max_time_limit_seconds < self.auction.min_time_limit_seconds {
            warn!(
                min = self.auction.min_time_limit_seconds,
                max = self.auction.max_time_limit_seconds,
                "maxTimeLimitSeconds below minTimeLimitSeconds, clamping to min"
            );
            self.auction.max_time_limit_seconds = self.auction.min_time_limit_seconds;
        }
    }
}

/// Server network and runtime settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// HTTP + WebSocket port.
    pub port: u16,
    /// Maximum simultaneous WebSocket connections.
    pub max_connections: usize,
    /// WebSocket heartbeat ping interval in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Time without a pong before a connection is considered dead, in
    /// milliseconds.
    pub heartbeat_timeout_ms: u64,
    /// Maximum inbound WebSocket message size in bytes.
    pub max_message_size_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_connections: 100,
            heartbeat_interval_ms: 30_000,
            heartbeat_timeout_ms: 60_000,
            max_message_size_bytes: 65_536,
        }
    }
}

/// Auction rule bounds applied when starting an auction.
///
/// These are clamps, not rejections: a start command with a time limit
/// outside the bounds is adjusted into range and proceeds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuctionSettings {
    /// Shortest allowed auction duration in seconds.
    pub min_time_limit_seconds: u64,
    /// Longest allowed auction duration in seconds.
    pub max_time_limit_seconds: u64,
    /// Maximum retained bid-history entries per auction (0 = unbounded).
    pub history_limit: usize,
}

impl Default for AuctionSettings {
    fn default() -> Self {
        Self {
            min_time_limit_seconds: 1,
            max_time_limit_seconds: 3600,
            history_limit: 0,
        }
    }
}

/// Log verbosity level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose.
    Trace,
    /// Debug-level.
    Debug,
    /// Default level.
    #[default]
    Info,
    /// Warnings only.
    Warn,
    /// Errors only (least verbose).
    Error,
}

impl LogLevel {
    /// Convert to a tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level emitted to stdout.
    pub level: LogLevel,
    /// Emit JSON-formatted log lines instead of human-readable ones.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            json: false,
        }
    }
}
