use async_trait::async_trait;
use duet_core::{ConnId, ServerEvent};
use duet_server::EventSink;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// EventSink that records every outbound event in delivery order.
#[derive(Clone, Default)]
pub struct MockEventSink {
    sent: Arc<Mutex<Vec<(ConnId, ServerEvent)>>>,
}

impl MockEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, `log` events included.
    pub async fn all(&self) -> Vec<(ConnId, ServerEvent)> {
        self.sent.lock().await.clone()
    }

    /// Events delivered to one connection, without `log` echoes.
    pub async fn events_for(&self, conn_id: &ConnId) -> Vec<ServerEvent> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(to, event)| to == conn_id && !matches!(event, ServerEvent::Log { .. }))
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Raw entries of the `log` echoes delivered to one connection.
    pub async fn log_entries_for(&self, conn_id: &ConnId) -> Vec<Vec<Value>> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|(to, event)| match event {
                ServerEvent::Log { lines } if to == conn_id => Some(lines.clone()),
                _ => None,
            })
            .collect()
    }

    /// Text of the `log` echoes delivered to one connection.
    /// Non-string entries are rendered as JSON.
    pub async fn logs_for(&self, conn_id: &ConnId) -> Vec<String> {
        self.log_entries_for(conn_id)
            .await
            .iter()
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| match entry {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl EventSink for MockEventSink {
    async fn send(&self, conn_id: &ConnId, event: ServerEvent) {
        tracing::debug!("[MockSink] '{}' to {}", event.name(), conn_id);
        self.sent.lock().await.push((*conn_id, event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_sink_separates_logs() {
        let sink = MockEventSink::new();
        let conn_id = ConnId::new();

        sink.send(&conn_id, ServerEvent::log("hello")).await;
        sink.send(&conn_id, ServerEvent::Ready).await;

        assert_eq!(sink.events_for(&conn_id).await, vec![ServerEvent::Ready]);
        assert_eq!(
            sink.logs_for(&conn_id).await,
            vec!["Message from server: hello".to_owned()]
        );
        assert_eq!(sink.all().await.len(), 2);
    }
}
