//! Per-connection client state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use gavel_protocol::ServerEvent;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// State for one connected WebSocket client.
///
/// Outbound frames go through a bounded queue drained by the session's
/// forwarder task; `send` never blocks. Liveness is tracked by the
/// heartbeat: any inbound frame marks the connection alive, and the ping
/// loop clears the flag each interval.
pub struct ClientConnection {
    /// Unique connection id.
    pub id: String,
    /// When the connection was accepted.
    pub connected_at: Instant,
    tx: mpsc::Sender<Arc<String>>,
    is_alive: AtomicBool,
    closed: AtomicBool,
    last_pong: Mutex<Instant>,
    dropped_messages: AtomicU64,
}

impl ClientConnection {
    /// Create connection state around an outbound queue.
    #[must_use]
    pub fn new(id: String, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            id,
            connected_at: Instant::now(),
            tx,
            is_alive: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            last_pong: Mutex::new(Instant::now()),
            dropped_messages: AtomicU64::new(0),
        }
    }

    /// Queue a pre-serialized frame for this client.
    ///
    /// Returns `false` without blocking when the connection is closed or
    /// its queue is full; queue-full drops are counted.
    pub fn send(&self, msg: Arc<String>) -> bool {
        if self.is_closed() {
            return false;
        }
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(_) => {
                let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Serialize an event and queue it for this client.
    pub fn send_event(&self, event: &ServerEvent) -> bool {
        match serde_json::to_string(event) {
            Ok(json) => self.send(Arc::new(json)),
            Err(err) => {
                tracing::error!(conn_id = %self.id, %err, "failed to serialize event");
                false
            }
        }
    }

    /// Frames dropped so far because the queue was full.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Record proof of life (any inbound frame, or a pong).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_pong.lock() = Instant::now();
    }

    /// Take and clear the liveness flag. Returns whether the client showed
    /// life since the previous check.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Time since the client last showed life.
    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }

    /// Stop accepting outbound frames for this client.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }

    /// Whether the connection has been closed for sending.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    /// How long the connection has been open.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
