use crate::signaling::EventSink;
use duet_core::{ConnId, ServerEvent};
use std::sync::Arc;

/// Delivers events to room members. Payloads pass through untouched.
#[derive(Clone)]
pub struct MessageRelay {
    sink: Arc<dyn EventSink>,
}

impl MessageRelay {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Send an event to one connection.
    pub async fn send(&self, conn_id: &ConnId, event: ServerEvent) {
        self.sink.send(conn_id, event).await;
    }

    /// Send an event to every listed member, in order.
    pub async fn broadcast(&self, members: &[ConnId], event: ServerEvent) {
        for member in members {
            self.sink.send(member, event.clone()).await;
        }
    }

    /// Send an event to every member except `sender`.
    /// Returns how many connections it was handed to.
    pub async fn broadcast_except(
        &self,
        members: &[ConnId],
        sender: &ConnId,
        event: ServerEvent,
    ) -> usize {
        let mut delivered = 0;
        for member in members.iter().filter(|member| *member != sender) {
            self.sink.send(member, event.clone()).await;
            delivered += 1;
        }
        delivered
    }
}
