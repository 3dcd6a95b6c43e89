//! Fan-out of auction events to every connected client.

use std::collections::HashMap;
use std::sync::Arc;

use gavel_protocol::ServerEvent;
use metrics::counter;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::connection::ClientConnection;

/// Queue-full drops tolerated before a client is evicted from the fan-out.
const SLOW_CLIENT_DROP_LIMIT: u64 = 64;

/// Registry of live connections with broadcast fan-out.
///
/// Events are serialized once and the resulting frame shared across all
/// recipients. A client whose outbound queue stays full long enough to
/// accumulate [`SLOW_CLIENT_DROP_LIMIT`] drops is closed and removed; the
/// session's heartbeat then tears the socket down.
pub struct BroadcastManager {
    connections: RwLock<HashMap<String, Arc<ClientConnection>>>,
}

impl BroadcastManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection for broadcasts.
    pub async fn add(&self, conn: Arc<ClientConnection>) {
        let _ = self
            .connections
            .write()
            .await
            .insert(conn.id.clone(), conn);
    }

    /// Deregister a connection, returning it if it was present.
    pub async fn remove(&self, id: &str) -> Option<Arc<ClientConnection>> {
        self.connections.write().await.remove(id)
    }

    /// Number of currently registered connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send an event to every registered connection.
    pub async fn broadcast_all(&self, event: &ServerEvent) {
        let frame = match serde_json::to_string(event) {
            Ok(json) => Arc::new(json),
            Err(err) => {
                warn!(%err, event = event.name(), "failed to serialize broadcast event");
                return;
            }
        };

        let mut slow = Vec::new();
        {
            let connections = self.connections.read().await;
            debug!(
                event = event.name(),
                recipients = connections.len(),
                "broadcasting event"
            );
            for conn in connections.values() {
                if !conn.send(frame.clone()) {
                    counter!("ws_broadcast_drops_total").increment(1);
                    warn!(conn_id = %conn.id, dropped = conn.drop_count(), "client queue full, frame dropped");
                    if conn.drop_count() >= SLOW_CLIENT_DROP_LIMIT {
                        slow.push(conn.id.clone());
                    }
                }
            }
        }

        for id in &slow {
            warn!(conn_id = %id, "evicting slow client");
            if let Some(conn) = self.remove(id).await {
                conn.close();
            }
        }
    }
}

impl Default for BroadcastManager {
    fn default() -> Self {
        Self::new()
    }
}
