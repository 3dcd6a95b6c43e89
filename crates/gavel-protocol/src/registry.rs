//! Command registry and async dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::{counter, histogram};
use serde_json::Value;
use tracing::{debug, warn};

use crate::context::CommandContext;
use crate::errors::CommandError;
use crate::types::CommandEnvelope;

/// Trait implemented by every command handler.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Execute the command. Broadcast effects travel through the
    /// coordinator's event stream; anything returned to the sending
    /// connection goes through the context's reply path.
    async fn handle(&self, payload: Value, ctx: &CommandContext) -> Result<(), CommandError>;
}

/// Registry mapping command names to handlers.
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Maximum time a single command handler is allowed to run.
    const HANDLER_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a command name.
    pub fn register(&mut self, command: &str, handler: impl CommandHandler + 'static) {
        let _ = self.handlers.insert(command.to_owned(), Arc::new(handler));
    }

    /// Dispatch an envelope to the matching handler.
    ///
    /// Unknown commands are dropped with a debug log; the sender gets no
    /// reply. The returned error is for the session loop's log line only.
    pub async fn dispatch(
        &self,
        envelope: CommandEnvelope,
        ctx: &CommandContext,
    ) -> Result<(), CommandError> {
        let command = envelope.command;
        counter!("commands_total", "command" => command.clone()).increment(1);

        let Some(handler) = self.handlers.get(&command) else {
            counter!("command_errors_total", "command" => command.clone(), "error_type" => "unknown_command")
                .increment(1);
            debug!(command, "dropping unknown command");
            return Err(CommandError::UnknownCommand(command));
        };

        let start = std::time::Instant::now();
        let result =
            tokio::time::timeout(Self::HANDLER_TIMEOUT, handler.handle(envelope.payload, ctx))
                .await;

        let outcome = match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                counter!("command_errors_total", "command" => command.clone(), "error_type" => err.kind())
                    .increment(1);
                Err(err)
            }
            Err(_elapsed) => {
                counter!("command_errors_total", "command" => command.clone(), "error_type" => "timeout")
                    .increment(1);
                warn!(
                    command,
                    "command handler timed out after {:?}",
                    Self::HANDLER_TIMEOUT
                );
                Err(CommandError::Timeout(command.clone()))
            }
        };

        histogram!("command_duration_seconds", "command" => command.clone())
            .record(start.elapsed().as_secs_f64());
        outcome
    }

    /// List all registered command names (sorted).
    pub fn commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check whether a command is registered.
    pub fn has_command(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
