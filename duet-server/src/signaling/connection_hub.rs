use crate::signaling::EventSink;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use duet_core::{ConnId, ServerEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

struct HubInner {
    connections: DashMap<ConnId, mpsc::UnboundedSender<Message>>,
}

/// Outbound channels of all live connections, keyed by identity.
#[derive(Clone)]
pub struct ConnectionHub {
    inner: Arc<HubInner>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                connections: DashMap::new(),
            }),
        }
    }

    pub fn register(&self, conn_id: ConnId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.insert(conn_id, tx);
    }

    pub fn unregister(&self, conn_id: &ConnId) {
        self.inner.connections.remove(conn_id);
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    pub fn send_event(&self, conn_id: &ConnId, event: &ServerEvent) {
        let Some(connection) = self.inner.connections.get(conn_id) else {
            debug!("Dropping '{}' for departed connection {}", event.name(), conn_id);
            return;
        };

        match event.to_frame() {
            Ok(frame) => {
                if connection.send(Message::Text(frame.into())).is_err() {
                    debug!("Connection {} is closing, '{}' dropped", conn_id, event.name());
                }
            }
            Err(e) => error!("Failed to serialize '{}' event: {}", event.name(), e),
        }
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for ConnectionHub {
    async fn send(&self, conn_id: &ConnId, event: ServerEvent) {
        self.send_event(conn_id, &event);
    }
}
