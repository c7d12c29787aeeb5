use crate::AppState;
use crate::room::RoomCommand;
use axum::extract::State;
use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code};
use axum::response::IntoResponse;
use duet_core::{ClientEvent, ConnId, DisconnectReason};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// How long a closing connection gets to flush queued frames.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = ConnId::new();

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.hub.register(conn_id, tx.clone());
    info!(
        "New WebSocket connection: {} ({} open)",
        conn_id,
        state.hub.connection_count()
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if let Err(e) = sender.send(msg).await {
                return DisconnectReason::TransportError(e.to_string());
            }
            if closing {
                break;
            }
        }
        DisconnectReason::TransportClosed
    });

    let mut recv_task = tokio::spawn({
        let commands = state.commands.clone();

        async move {
            loop {
                let msg = match receiver.next().await {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => return DisconnectReason::TransportError(e.to_string()),
                    None => return DisconnectReason::TransportClosed,
                };

                let event = match msg {
                    Message::Text(text) => {
                        ClientEvent::from_frame(text.as_str()).map_err(|e| e.to_string())
                    }
                    Message::Binary(_) => Err("binary frames are not supported".to_owned()),
                    Message::Close(_) => return DisconnectReason::ClientClosed,
                    _ => continue,
                };

                match event {
                    Ok(event) => {
                        debug!("{} sent '{}'", conn_id, event.name());
                        let cmd = RoomCommand::from_client_event(conn_id, event);
                        if let Err(e) = commands.send(cmd).await {
                            error!("Coordinator died, dropped command from {}", e.0.conn_id());
                            return DisconnectReason::TransportError(
                                "coordinator unavailable".to_owned(),
                            );
                        }
                    }
                    Err(e) => {
                        warn!("Unauthorized event from {}: {}", conn_id, e);
                        let _ = tx.send(Message::Close(Some(CloseFrame {
                            code: close_code::POLICY,
                            reason: Utf8Bytes::from_static("unauthorized event"),
                        })));
                        return DisconnectReason::ProtocolViolation(e);
                    }
                }
            }
        }
    });

    let reason = tokio::select! {
        reason = &mut recv_task => {
            // Dropping the hub's sender lets the writer drain and stop.
            state.hub.unregister(&conn_id);
            if tokio::time::timeout(CLOSE_GRACE, &mut send_task).await.is_err() {
                send_task.abort();
            }
            reason.unwrap_or_else(|e| DisconnectReason::TransportError(e.to_string()))
        }
        reason = &mut send_task => {
            recv_task.abort();
            reason.unwrap_or_else(|e| DisconnectReason::TransportError(e.to_string()))
        }
    };

    state.hub.unregister(&conn_id);

    let cmd = RoomCommand::Disconnect { conn_id, reason };
    if let Err(e) = state.commands.send(cmd).await {
        error!("Failed to report disconnect of {}", e.0.conn_id());
    }

    info!(
        "WebSocket disconnected: {} ({} open)",
        conn_id,
        state.hub.connection_count()
    );
}
