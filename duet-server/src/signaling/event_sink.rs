use async_trait::async_trait;
use duet_core::{ConnId, ServerEvent};

/// Outbound side of the connection layer, as seen by the coordinator.
///
/// Delivery is fire-and-forget: there is no acknowledgment, and sending to a
/// connection that has already gone away is silently dropped.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send(&self, conn_id: &ConnId, event: ServerEvent);
}
