//! Prometheus metrics for the auction server.
//!
//! Metric names are collected here as constants so the full set is visible
//! in one place. Recording happens at the call sites via the `metrics`
//! macros; `GET /metrics` renders whatever the installed recorder has seen.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Counter: commands dispatched, labeled by `command`.
pub const COMMANDS_TOTAL: &str = "commands_total";

/// Counter: commands that failed dispatch, labeled by `command` and
/// `error_type`.
pub const COMMAND_ERRORS_TOTAL: &str = "command_errors_total";

/// Histogram: command handler latency in seconds, labeled by `command`.
pub const COMMAND_DURATION_SECONDS: &str = "command_duration_seconds";

/// Counter: bids submitted, labeled by `outcome`.
pub const BIDS_TOTAL: &str = "bids_total";

/// Counter: WebSocket connections accepted.
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";

/// Counter: WebSocket connections closed.
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";

/// Gauge: currently open WebSocket connections.
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";

/// Counter: connections refused because the server was at capacity.
pub const WS_CONNECTIONS_REFUSED_TOTAL: &str = "ws_connections_refused_total";

/// Histogram: connection lifetime in seconds.
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";

/// Counter: broadcast messages dropped because a client's queue was full.
pub const WS_BROADCAST_DROPS_TOTAL: &str = "ws_broadcast_drops_total";

/// Install the global Prometheus recorder and return a handle for rendering.
///
/// Must be called once at startup, before any metrics are recorded.
/// Panics if a recorder is already installed.
pub fn install_recorder() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    tracing::info!("Prometheus metrics recorder installed");
    handle
}

/// Render current metrics in the Prometheus text exposition format.
#[must_use]
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}
