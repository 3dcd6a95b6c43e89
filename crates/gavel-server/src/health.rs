//! Health check endpoint payload.

use std::time::Instant;

use serde::Serialize;

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is able to answer at all.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Current WebSocket connection count.
    pub connections: usize,
    /// Whether an auction is currently open for bids.
    pub auction_active: bool,
}

/// Build the health payload from current server state.
#[must_use]
pub fn health_check(
    start_time: Instant,
    connections: usize,
    auction_active: bool,
) -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        uptime_secs: start_time.elapsed().as_secs(),
        connections,
        auction_active,
    }
}
