use duet_core::{ConnId, RoomKey};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("room '{room}' already has two members")]
    RoomFull { room: RoomKey },

    #[error("connection {conn_id} is already a member of room '{room}'")]
    AlreadyMember { conn_id: ConnId, room: RoomKey },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("room '{room}' does not exist")]
    UnknownRoom { room: RoomKey },

    #[error("connection {conn_id} is not a member of room '{room}'")]
    NotAMember { conn_id: ConnId, room: RoomKey },
}
