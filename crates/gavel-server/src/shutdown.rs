//! Graceful shutdown coordination.
//!
//! A single [`CancellationToken`] is shared between the HTTP listener, the
//! event bridge, and any other background tasks. Cancelling it tells every
//! holder to finish up; [`ShutdownCoordinator::graceful_shutdown`] then
//! waits for the tasks with a deadline.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// How long to wait for in-flight work before giving up.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the cancellation token that server tasks watch.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a coordinator with a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Clone of the shared token, for handing to spawned tasks.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Signal shutdown to every token holder.
    pub fn shutdown(&self) {
        tracing::info!("shutdown initiated");
        self.token.cancel();
    }

    /// Whether shutdown has been signalled.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel the token and wait for the given tasks to finish.
    ///
    /// Waits at most `timeout` (or [`DEFAULT_SHUTDOWN_TIMEOUT`]); tasks
    /// still running after that are abandoned with a warning.
    pub async fn graceful_shutdown(
        &self,
        handles: Vec<tokio::task::JoinHandle<()>>,
        timeout: Option<Duration>,
    ) {
        self.token.cancel();
        let timeout = timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT);
        let join_all = futures::future::join_all(handles);
        if tokio::time::timeout(timeout, join_all).await.is_err() {
            tracing::warn!("graceful shutdown timed out after {timeout:?}");
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
