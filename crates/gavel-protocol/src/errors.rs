//! Command-layer error type.

/// Errors surfaced while decoding or dispatching a client command.
///
/// None of these are fatal and none produce a client-visible reply on
/// their own; the session loop logs them and moves on, preserving the
/// tolerant drop-bad-input semantics of the protocol.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Frame was not a JSON object with a string `type` field.
    #[error("malformed command frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    /// The `type` field named no registered command.
    #[error("unknown command type '{0}'")]
    UnknownCommand(String),

    /// Payload did not match the command's expected shape.
    #[error("invalid payload for '{command}': {source}")]
    InvalidPayload {
        /// Command whose payload failed to decode.
        command: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The connection's outbound channel is gone; the client most likely
    /// disconnected mid-command.
    #[error("reply channel closed")]
    ReplyClosed,

    /// Handler exceeded the dispatch timeout.
    #[error("handler for '{0}' timed out")]
    Timeout(String),
}

impl CommandError {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedFrame(_) => "malformed_frame",
            Self::UnknownCommand(_) => "unknown_command",
            Self::InvalidPayload { .. } => "invalid_payload",
            Self::ReplyClosed => "reply_closed",
            Self::Timeout(_) => "timeout",
        }
    }
}
