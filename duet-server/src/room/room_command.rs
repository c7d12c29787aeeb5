use duet_core::{ClientEvent, ConnId, DisconnectReason, RoomKey};
use serde_json::Value;

/// Everything the coordinator reacts to, funneled through one mailbox.
#[derive(Debug)]
pub enum RoomCommand {
    /// `create or join`: place the connection in a room.
    JoinRequest { conn_id: ConnId, room: RoomKey },

    /// `message`: forward an opaque payload to the other member.
    RelayRequest {
        conn_id: ConnId,
        payload: Value,
        room: RoomKey,
    },

    /// Drop room membership but keep the connection alive.
    Leave { conn_id: ConnId },

    /// `bye` notice from the client.
    Bye { conn_id: ConnId },

    /// `ipaddr`: report the server's IPv4 addresses.
    IpAddrRequest { conn_id: ConnId },

    /// The transport lost the connection.
    Disconnect {
        conn_id: ConnId,
        reason: DisconnectReason,
    },
}

impl RoomCommand {
    pub fn from_client_event(conn_id: ConnId, event: ClientEvent) -> Self {
        match event {
            ClientEvent::CreateOrJoin { room } => RoomCommand::JoinRequest { conn_id, room },
            ClientEvent::Message { payload, room } => RoomCommand::RelayRequest {
                conn_id,
                payload,
                room,
            },
            ClientEvent::IpAddr => RoomCommand::IpAddrRequest { conn_id },
            ClientEvent::Bye => RoomCommand::Bye { conn_id },
        }
    }

    pub fn conn_id(&self) -> &ConnId {
        match self {
            RoomCommand::JoinRequest { conn_id, .. }
            | RoomCommand::RelayRequest { conn_id, .. }
            | RoomCommand::Leave { conn_id }
            | RoomCommand::Bye { conn_id }
            | RoomCommand::IpAddrRequest { conn_id }
            | RoomCommand::Disconnect { conn_id, .. } => conn_id,
        }
    }
}
