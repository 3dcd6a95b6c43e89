//! HTTP + WebSocket server assembly.
//!
//! [`GavelServer`] wires the command registry, the auction coordinator,
//! and the broadcast manager into an axum router. `router()` exists
//! separately from `listen()` so tests can drive the routes with tower
//! without opening a socket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use gavel_core::{AuctionPhase, Coordinator};
use gavel_protocol::CommandRegistry;
use metrics::counter;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::pages;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::broadcast::BroadcastManager;
use crate::websocket::session::run_ws_session;

/// Errors surfaced while starting the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Could not bind or inspect the listen socket.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Connection registry and event fan-out.
    pub broadcast: Arc<BroadcastManager>,
    /// Auction domain engine.
    pub coordinator: Coordinator,
    /// Command dispatch table.
    pub registry: Arc<CommandRegistry>,
    /// Server configuration.
    pub config: ServerConfig,
    /// Process start, for uptime reporting.
    pub start_time: Instant,
    /// Prometheus render handle.
    pub metrics: PrometheusHandle,
}

/// The assembled auction server.
pub struct GavelServer {
    config: ServerConfig,
    registry: Arc<CommandRegistry>,
    coordinator: Coordinator,
    broadcast: Arc<BroadcastManager>,
    shutdown: Arc<ShutdownCoordinator>,
    metrics: PrometheusHandle,
    start_time: Instant,
}

impl GavelServer {
    /// Assemble a server from its parts.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        registry: CommandRegistry,
        coordinator: Coordinator,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            coordinator,
            broadcast: Arc::new(BroadcastManager::new()),
            shutdown: Arc::new(ShutdownCoordinator::new()),
            metrics,
            start_time: Instant::now(),
        }
    }

    /// Build the axum router with all routes and layers.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = AppState {
            broadcast: self.broadcast.clone(),
            coordinator: self.coordinator.clone(),
            registry: self.registry.clone(),
            config: self.config.clone(),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };

        Router::new()
            .route("/", get(index_page))
            .route("/auctioneer", get(auctioneer_page))
            .route("/bidder", get(bidder_page))
            .route("/ws", get(ws_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind the configured address and serve until shutdown is signalled.
    ///
    /// Returns the bound address (useful with port 0) and the join handle
    /// of the serving task.
    pub async fn listen(&self) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let router = self.router();
        let token = self.shutdown.token();
        info!(addr = %local_addr, "auction server listening");

        let handle = tokio::spawn(async move {
            let serve =
                axum::serve(listener, router).with_graceful_shutdown(token.cancelled_owned());
            if let Err(err) = serve.await {
                tracing::error!(%err, "server terminated with error");
            }
        });

        Ok((local_addr, handle))
    }

    /// Connection registry shared with the event bridge.
    #[must_use]
    pub fn broadcast(&self) -> &Arc<BroadcastManager> {
        &self.broadcast
    }

    /// Shutdown coordinator for this server.
    #[must_use]
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// The auction coordinator this server serves.
    #[must_use]
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Whether a new connection must be refused.
fn at_capacity(connected: usize, max: usize) -> bool {
    connected >= max
}

async fn index_page() -> Html<&'static str> {
    Html(pages::INDEX_PAGE)
}

async fn auctioneer_page() -> Html<&'static str> {
    Html(pages::AUCTIONEER_PAGE)
}

async fn bidder_page() -> Html<&'static str> {
    Html(pages::BIDDER_PAGE)
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.broadcast.connection_count().await;
    let auction_active = state.coordinator.phase() == AuctionPhase::Active;
    Json(health::health_check(
        state.start_time,
        connections,
        auction_active,
    ))
}

async fn metrics_handler(State(state): State<AppState>) -> String {
    crate::metrics::render(&state.metrics)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let connected = state.broadcast.connection_count().await;
    if at_capacity(connected, state.config.max_connections) {
        counter!("ws_connections_refused_total").increment(1);
        warn!(
            connected,
            max = state.config.max_connections,
            "refusing connection, server at capacity"
        );
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let client_id = Uuid::now_v7().to_string();
    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| {
            run_ws_session(
                socket,
                client_id,
                state.registry.clone(),
                state.coordinator.clone(),
                state.broadcast.clone(),
                state.config.heartbeat_interval(),
                state.config.heartbeat_timeout(),
            )
        })
}
