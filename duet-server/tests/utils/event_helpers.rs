use duet_core::{ConnId, DisconnectReason, RoomKey};
use duet_server::{Coordinator, RoomCommand};

pub fn room(key: &str) -> RoomKey {
    RoomKey::from(key)
}

pub async fn join(coordinator: &mut Coordinator, conn_id: ConnId, key: &str) {
    coordinator
        .handle(RoomCommand::JoinRequest {
            conn_id,
            room: room(key),
        })
        .await;
}

pub async fn relay(
    coordinator: &mut Coordinator,
    conn_id: ConnId,
    payload: serde_json::Value,
    key: &str,
) {
    coordinator
        .handle(RoomCommand::RelayRequest {
            conn_id,
            payload,
            room: room(key),
        })
        .await;
}

pub async fn disconnect(coordinator: &mut Coordinator, conn_id: ConnId) {
    coordinator
        .handle(RoomCommand::Disconnect {
            conn_id,
            reason: DisconnectReason::TransportClosed,
        })
        .await;
}

/// Checks that the registry's forward and reverse maps agree.
pub fn assert_registry_consistent(coordinator: &Coordinator) {
    let registry = coordinator.registry();
    for (key, members) in registry.rooms() {
        assert!(!members.is_empty(), "room '{}' kept while empty", key);
        assert!(members.len() <= 2, "room '{}' has {} members", key, members.len());
        for member in members {
            assert_eq!(registry.room_of(member), Some(key));
        }
    }
}
