//! Per-connection dispatch context.

use std::sync::Arc;

use async_trait::async_trait;
use gavel_core::Coordinator;
use parking_lot::Mutex;

use crate::errors::CommandError;
use crate::types::ServerEvent;

/// Unicast path back to the connection a command arrived on.
///
/// The transport owns the socket; handlers only see this seam, which
/// keeps them testable without a server.
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Queue one event for this connection.
    async fn send(&self, event: ServerEvent) -> Result<(), CommandError>;
}

/// Everything a command handler can touch.
///
/// One per connection: the identity binding and reply path are
/// connection-scoped, while the coordinator is shared across all of them.
pub struct CommandContext {
    /// Shared auction state machine.
    pub coordinator: Coordinator,
    identity: Mutex<Option<String>>,
    reply: Arc<dyn ReplySender>,
}

impl CommandContext {
    /// Build the context for one connection.
    pub fn new(coordinator: Coordinator, reply: Arc<dyn ReplySender>) -> Self {
        Self {
            coordinator,
            identity: Mutex::new(None),
            reply,
        }
    }

    /// The name bound by `join-as-bidder`, if any.
    pub fn identity(&self) -> Option<String> {
        self.identity.lock().clone()
    }

    /// Bind (or rebind) this connection's bidder identity.
    pub fn bind_identity(&self, name: &str) {
        *self.identity.lock() = Some(name.to_owned());
    }

    /// Send an event to this connection only.
    pub async fn send_reply(&self, event: ServerEvent) -> Result<(), CommandError> {
        self.reply.send(event).await
    }
}
