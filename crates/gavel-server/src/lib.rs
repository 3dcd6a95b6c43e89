//! # gavel-server
//!
//! Axum HTTP + WebSocket server for live auctions.
//!
//! - Static auction pages (`/`, `/auctioneer`, `/bidder`)
//! - WebSocket gateway (`/ws`): per-connection sessions, heartbeat,
//!   command dispatch into `gavel-protocol`
//! - Event fan-out: coordinator events bridged to every connected client
//! - Operability endpoints: `/health` and Prometheus `/metrics`
//! - Graceful shutdown via a shared `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod metrics;
pub mod pages;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use server::{AppState, GavelServer, ServerError};
pub use shutdown::ShutdownCoordinator;
