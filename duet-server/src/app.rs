use crate::config::RelayConfig;
use crate::room::{Coordinator, RoomCommand};
use crate::signaling::{ConnectionHub, ws_handler};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Shared state handed to every WebSocket handler.
pub struct AppState {
    pub hub: ConnectionHub,
    pub commands: mpsc::Sender<RoomCommand>,
}

impl AppState {
    /// Start a coordinator wired to a fresh connection hub.
    /// Must be called from within a tokio runtime.
    pub fn start(config: RelayConfig) -> (Arc<Self>, JoinHandle<Coordinator>) {
        let hub = ConnectionHub::new();
        let coordinator = Coordinator::new(Arc::new(hub.clone()), config);
        let (commands, handle) = coordinator.spawn();

        (Arc::new(Self { hub, commands }), handle)
    }
}

/// Routes for the signaling endpoint.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}
