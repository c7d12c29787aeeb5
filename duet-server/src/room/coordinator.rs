use crate::config::RelayConfig;
use crate::error::{RegistryError, RelayError};
use crate::net::ipv4_addresses;
use crate::room::relay::MessageRelay;
use crate::room::room_command::RoomCommand;
use crate::room::room_registry::{ROOM_CAPACITY, RoomRegistry};
use crate::signaling::EventSink;
use duet_core::{ConnId, DisconnectReason, RoomKey, ServerEvent};
use serde_json::Value;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Owns the room registry and applies the two-party matching rules.
///
/// Every command goes through [`Coordinator::handle`], one at a time, so a
/// disconnect is fully reconciled before the next command touches the same room.
pub struct Coordinator {
    registry: RoomRegistry,
    relay: MessageRelay,
    config: RelayConfig,
    addresses: fn() -> Vec<Ipv4Addr>,
}

impl Coordinator {
    pub fn new(sink: Arc<dyn EventSink>, config: RelayConfig) -> Self {
        Self {
            registry: RoomRegistry::new(),
            relay: MessageRelay::new(sink),
            config,
            addresses: ipv4_addresses,
        }
    }

    /// Replace the interface lookup used to answer `ipaddr`.
    pub fn with_address_source(mut self, addresses: fn() -> Vec<Ipv4Addr>) -> Self {
        self.addresses = addresses;
        self
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Spawn the event loop. The returned handle yields the coordinator back
    /// once every command sender has been dropped.
    pub fn spawn(self) -> (mpsc::Sender<RoomCommand>, JoinHandle<Self>) {
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer.max(1));
        let handle = tokio::spawn(self.run(command_rx));
        (command_tx, handle)
    }

    pub async fn run(mut self, mut command_rx: mpsc::Receiver<RoomCommand>) -> Self {
        info!("Coordinator event loop started");

        while let Some(cmd) = command_rx.recv().await {
            self.handle(cmd).await;
        }

        info!(
            "Command channel closed. Coordinator stopping with {} room(s)",
            self.registry.room_count()
        );
        self
    }

    pub async fn handle(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::JoinRequest { conn_id, room } => self.request_join(conn_id, room).await,

            RoomCommand::RelayRequest {
                conn_id,
                payload,
                room,
            } => self.relay_message(conn_id, payload, room).await,

            RoomCommand::Leave { conn_id } => self.explicit_leave(conn_id).await,

            RoomCommand::Bye { conn_id } => {
                info!("Received bye from {}", conn_id);
                if self.config.leave_on_bye {
                    self.explicit_leave(conn_id).await;
                }
            }

            RoomCommand::IpAddrRequest { conn_id } => {
                for address in (self.addresses)() {
                    self.relay
                        .send(&conn_id, ServerEvent::IpAddr { address })
                        .await;
                }
            }

            RoomCommand::Disconnect { conn_id, reason } => self.disconnect(conn_id, reason).await,
        }
    }

    async fn request_join(&mut self, conn_id: ConnId, room: RoomKey) {
        self.echo(&conn_id, format!("Received request to create or join room {}", room))
            .await;

        let current = self.registry.room_of(&conn_id).cloned();
        if current.as_ref() == Some(&room) {
            debug!("{} asked to join room '{}' again", conn_id, room);
            self.echo(
                &conn_id,
                format!("Client ID {} is already in room {}", conn_id, room),
            )
            .await;
            return;
        }

        let existing = self.registry.members(room.as_str()).to_vec();
        self.echo(
            &conn_id,
            format!("Room {} now has {} client(s)", room, existing.len()),
        )
        .await;

        // A rejected join leaves the requester's current pairing untouched.
        if existing.len() >= ROOM_CAPACITY {
            info!("{} rejected, room '{}' is full", conn_id, room);
            self.relay.send(&conn_id, ServerEvent::Full { room }).await;
            return;
        }

        if let Some(current) = current {
            info!("{} moves from room '{}' to '{}'", conn_id, current, room);
            self.leave_current_room(&conn_id).await;
        }

        match self.registry.add_member(&room, conn_id) {
            Ok(1) => {
                info!("{} created room '{}'", conn_id, room);
                self.echo(&conn_id, format!("Client ID {} created room {}", conn_id, room))
                    .await;
                self.relay
                    .send(&conn_id, ServerEvent::Created { room, conn_id })
                    .await;
            }

            Ok(_) => {
                info!("{} joined room '{}', room is paired", conn_id, room);
                self.echo(&conn_id, format!("Client ID {} joined room {}", conn_id, room))
                    .await;

                // The waiting member must hear about the join before `ready`.
                self.relay
                    .broadcast(&existing, ServerEvent::PeerJoined { room: room.clone() })
                    .await;
                self.relay
                    .send(
                        &conn_id,
                        ServerEvent::Joined {
                            room: room.clone(),
                            conn_id,
                        },
                    )
                    .await;

                let members = self.registry.members(room.as_str()).to_vec();
                self.relay.broadcast(&members, ServerEvent::Ready).await;
            }

            Err(RegistryError::RoomFull { room }) => {
                info!("{} rejected, room '{}' is full", conn_id, room);
                self.relay.send(&conn_id, ServerEvent::Full { room }).await;
            }

            Err(e) => error!("Join for {} failed: {}", conn_id, e),
        }
    }

    async fn relay_message(&mut self, conn_id: ConnId, payload: Value, room: RoomKey) {
        self.echo_entries(&conn_id, vec![Value::from("Client said: "), payload.clone()])
            .await;

        if let Err(e) = self.check_relay(&conn_id, &room) {
            warn!("Dropping message from {}: {}", conn_id, e);
            return;
        }

        let members = self.registry.members(room.as_str()).to_vec();
        let delivered = self
            .relay
            .broadcast_except(&members, &conn_id, ServerEvent::Message { payload, room })
            .await;

        if delivered == 0 {
            debug!("{} is alone in its room, message dropped", conn_id);
        }
    }

    fn check_relay(&self, conn_id: &ConnId, room: &RoomKey) -> Result<(), RelayError> {
        let members = self.registry.members(room.as_str());
        if members.is_empty() {
            return Err(RelayError::UnknownRoom { room: room.clone() });
        }
        if !members.contains(conn_id) {
            return Err(RelayError::NotAMember {
                conn_id: *conn_id,
                room: room.clone(),
            });
        }
        Ok(())
    }

    async fn disconnect(&mut self, conn_id: ConnId, reason: DisconnectReason) {
        info!("{} disconnected: {}", conn_id, reason);

        if self.leave_current_room(&conn_id).await.is_none() {
            debug!("{} held no room membership", conn_id);
        }
    }

    async fn explicit_leave(&mut self, conn_id: ConnId) {
        match self.leave_current_room(&conn_id).await {
            Some(room) => info!("{} left room '{}'", conn_id, room),
            None => debug!("{} asked to leave but is in no room", conn_id),
        }
    }

    /// Tell the other member about the departure, then drop the membership.
    /// A connection with no room is left alone, which makes repeated calls no-ops.
    async fn leave_current_room(&mut self, conn_id: &ConnId) -> Option<RoomKey> {
        let room = self.registry.room_of(conn_id)?.clone();

        let others: Vec<ConnId> = self
            .registry
            .members(room.as_str())
            .iter()
            .filter(|member| *member != conn_id)
            .copied()
            .collect();
        self.relay
            .broadcast(&others, ServerEvent::PeerLeft { conn_id: *conn_id })
            .await;

        self.registry.remove_member(room.as_str(), conn_id);
        if self.registry.member_count(room.as_str()) == 0 {
            info!("Room '{}' is empty, removed", room);
        }

        Some(room)
    }

    async fn echo(&self, conn_id: &ConnId, line: String) {
        self.echo_entries(conn_id, vec![Value::String(line)]).await;
    }

    async fn echo_entries(&self, conn_id: &ConnId, entries: Vec<Value>) {
        debug!("[{}] {:?}", conn_id, entries);
        if self.config.echo_logs {
            self.relay
                .send(conn_id, ServerEvent::log_entries(entries))
                .await;
        }
    }
}
