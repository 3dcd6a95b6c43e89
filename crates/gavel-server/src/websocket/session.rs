//! Per-connection session loop.
//!
//! Each accepted WebSocket gets one [`run_ws_session`] call that lives for
//! the duration of the connection: an outbound forwarder task drains the
//! connection's queue and drives the heartbeat, while the inbound loop
//! parses command frames and hands them to the registry. Unparseable or
//! unknown frames are logged and ignored; the connection stays up.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use gavel_core::Coordinator;
use gavel_protocol::{
    CommandContext, CommandEnvelope, CommandError, CommandRegistry, ReplySender, ServerEvent,
};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::broadcast::BroadcastManager;
use super::connection::ClientConnection;

/// Outbound frames buffered per connection before drops begin.
const OUTBOUND_QUEUE_SIZE: usize = 1024;

/// Routes handler replies into the connection's outbound queue.
struct ConnectionReplySender {
    connection: Arc<ClientConnection>,
}

#[async_trait]
impl ReplySender for ConnectionReplySender {
    async fn send(&self, event: ServerEvent) -> Result<(), CommandError> {
        if self.connection.send_event(&event) {
            Ok(())
        } else {
            Err(CommandError::ReplyClosed)
        }
    }
}

/// Drive one WebSocket connection until the client goes away.
#[tracing::instrument(skip_all, fields(client_id = %client_id))]
pub async fn run_ws_session(
    socket: WebSocket,
    client_id: String,
    registry: Arc<CommandRegistry>,
    coordinator: Coordinator,
    broadcast: Arc<BroadcastManager>,
    heartbeat_interval: Duration,
    heartbeat_timeout: Duration,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(OUTBOUND_QUEUE_SIZE);
    let connection = Arc::new(ClientConnection::new(client_id.clone(), send_tx));

    info!("client connected");
    counter!("ws_connections_total").increment(1);
    gauge!("ws_connections_active").increment(1.0);

    broadcast.add(connection.clone()).await;

    let reply: Arc<dyn ReplySender> = Arc::new(ConnectionReplySender {
        connection: connection.clone(),
    });
    let ctx = CommandContext::new(coordinator, reply);

    // Outbound half: drain the queue and run the heartbeat.
    let outbound_conn = connection.clone();
    let mut outbound = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(heartbeat_interval);
        // The first tick completes immediately; skip it.
        let _ = ping_interval.tick().await;
        loop {
            tokio::select! {
                queued = send_rx.recv() => {
                    match queued {
                        Some(frame) => {
                            if ws_tx.send(Message::Text(frame.as_str().into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ping_interval.tick() => {
                    if outbound_conn.is_closed() {
                        break;
                    }
                    if !outbound_conn.check_alive()
                        && outbound_conn.last_pong_elapsed() > heartbeat_timeout
                    {
                        warn!(conn_id = %outbound_conn.id, "client missed heartbeat, closing");
                        break;
                    }
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Inbound half: parse command frames and dispatch them.
    let inbound = async {
        while let Some(Ok(msg)) = ws_rx.next().await {
            let text = match msg {
                Message::Text(text) => text.to_string(),
                Message::Binary(data) => match std::str::from_utf8(&data) {
                    Ok(text) => text.to_string(),
                    Err(_) => {
                        debug!(len = data.len(), "ignoring non-UTF8 binary frame");
                        continue;
                    }
                },
                Message::Close(_) => {
                    debug!("client sent close frame");
                    break;
                }
                Message::Ping(_) | Message::Pong(_) => {
                    connection.mark_alive();
                    continue;
                }
            };
            // A client actively sending commands is alive even if pongs get
            // lost.
            connection.mark_alive();

            match CommandEnvelope::parse(&text) {
                Ok(envelope) => {
                    if let Err(err) = registry.dispatch(envelope, &ctx).await {
                        debug!(%err, "command not dispatched");
                    }
                }
                Err(err) => debug!(%err, "ignoring malformed frame"),
            }
        }
    };
    tokio::pin!(inbound);

    // Either half ending tears the session down: client close or socket
    // error ends the inbound side, a missed heartbeat or send failure ends
    // the outbound side.
    tokio::select! {
        () = &mut inbound => {}
        _ = &mut outbound => {}
    }

    match ctx.identity() {
        Some(bidder) => info!(bidder = %bidder, "client disconnected"),
        None => info!("client disconnected"),
    }
    counter!("ws_disconnections_total").increment(1);
    gauge!("ws_connections_active").decrement(1.0);
    histogram!("ws_connection_duration_seconds").record(connection.age().as_secs_f64());
    outbound.abort();
    let _ = broadcast.remove(&client_id).await;
}
