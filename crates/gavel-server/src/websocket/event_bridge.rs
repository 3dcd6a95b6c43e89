//! Bridge from coordinator events to the WebSocket fan-out.

use std::sync::Arc;

use gavel_core::AuctionEvent;
use gavel_protocol::ServerEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use super::broadcast::BroadcastManager;

/// Forwards auction events to every connected client.
///
/// Subscribes to the coordinator's broadcast channel, converts each domain
/// event to its wire form, and hands it to the [`BroadcastManager`]. Runs
/// until the coordinator is dropped.
pub struct EventBridge {
    rx: broadcast::Receiver<AuctionEvent>,
    broadcast: Arc<BroadcastManager>,
}

impl EventBridge {
    /// Create a bridge from a coordinator subscription.
    #[must_use]
    pub fn new(rx: broadcast::Receiver<AuctionEvent>, broadcast: Arc<BroadcastManager>) -> Self {
        Self { rx, broadcast }
    }

    /// Run the forwarding loop. Intended to be spawned as a task.
    #[tracing::instrument(skip_all, name = "event_bridge")]
    pub async fn run(mut self) {
        info!("event bridge started");
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    let wire = ServerEvent::from(event);
                    debug!(event = wire.name(), "bridging auction event");
                    self.broadcast.broadcast_all(&wire).await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event bridge lagged, clients may have missed updates");
                }
                Err(RecvError::Closed) => {
                    info!("auction event channel closed, event bridge exiting");
                    break;
                }
            }
        }
    }
}
