use crate::error::RegistryError;
use duet_core::{ConnId, RoomKey};
use std::collections::HashMap;

/// Maximum number of members a room can hold.
pub const ROOM_CAPACITY: usize = 2;

/// Members of one room, in join order.
pub type Members = heapless::Vec<ConnId, ROOM_CAPACITY>;

/// Single source of truth for room membership.
///
/// Only non-empty rooms are stored. The forward map (room -> members) and the
/// reverse map (connection -> room) are updated together by every mutation.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomKey, Members>,
    membership: HashMap<ConnId, RoomKey>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map_or(0, |members| members.len())
    }

    pub fn members(&self, room: &str) -> &[ConnId] {
        self.rooms
            .get(room)
            .map(|members| members.as_slice())
            .unwrap_or(&[])
    }

    /// Appends `conn_id` to the room, creating it if needed.
    /// Returns the new member count.
    pub fn add_member(&mut self, room: &RoomKey, conn_id: ConnId) -> Result<usize, RegistryError> {
        if let Some(current) = self.membership.get(&conn_id) {
            return Err(RegistryError::AlreadyMember {
                conn_id,
                room: current.clone(),
            });
        }

        let members = self.rooms.entry(room.clone()).or_default();
        if members.push(conn_id).is_err() {
            return Err(RegistryError::RoomFull { room: room.clone() });
        }
        let count = members.len();

        self.membership.insert(conn_id, room.clone());
        Ok(count)
    }

    /// Removes `conn_id` from the room. Deletes the room once it is empty.
    /// Returns false if the connection was not a member.
    pub fn remove_member(&mut self, room: &str, conn_id: &ConnId) -> bool {
        let Some(members) = self.rooms.get_mut(room) else {
            return false;
        };

        let before = members.len();
        members.retain(|member| member != conn_id);
        if members.len() == before {
            return false;
        }

        if members.is_empty() {
            self.rooms.remove(room);
        }
        self.membership.remove(conn_id);
        true
    }

    pub fn room_of(&self, conn_id: &ConnId) -> Option<&RoomKey> {
        self.membership.get(conn_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn rooms(&self) -> impl Iterator<Item = (&RoomKey, &[ConnId])> {
        self.rooms.iter().map(|(key, members)| (key, members.as_slice()))
    }
}
