//! WebSocket gateway: connection state, broadcast fan-out, the session
//! loop, and the coordinator event bridge.

pub mod broadcast;
pub mod connection;
pub mod event_bridge;
pub mod session;

pub use broadcast::BroadcastManager;
pub use connection::ClientConnection;
pub use event_bridge::EventBridge;
pub use session::run_ws_session;
