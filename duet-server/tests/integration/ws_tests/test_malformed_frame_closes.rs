use duet_core::{ClientEvent, RoomKey, ServerEvent};
use duet_server::RelayConfig;

use crate::integration::init_tracing;
use crate::utils::{WsTestClient, spawn_relay};

/// WebSocket close code for a policy violation.
const POLICY_VIOLATION: u16 = 1008;

#[tokio::test]
async fn test_malformed_frame_closes_connection() {
    init_tracing();

    let addr = spawn_relay(RelayConfig::default())
        .await
        .expect("Failed to start relay");

    let mut client = WsTestClient::connect(addr).await.expect("Connect failed");
    client
        .send_raw(r#"{"not":"an event"}"#)
        .await
        .expect("Send failed");

    assert_eq!(
        client.expect_close().await.expect("No close"),
        Some(POLICY_VIOLATION)
    );
}

#[tokio::test]
async fn test_unknown_event_frees_room_slot() {
    init_tracing();

    let addr = spawn_relay(RelayConfig::default())
        .await
        .expect("Failed to start relay");
    let room = RoomKey::from("alpha");

    let mut host = WsTestClient::connect(addr).await.expect("Connect failed");
    host.emit(&ClientEvent::CreateOrJoin { room: room.clone() })
        .await
        .expect("Send failed");
    host.next_event().await.expect("No created");

    let mut rogue = WsTestClient::connect(addr).await.expect("Connect failed");
    rogue
        .emit(&ClientEvent::CreateOrJoin { room: room.clone() })
        .await
        .expect("Send failed");
    rogue.next_event().await.expect("No joined");

    assert_eq!(
        host.next_event().await.expect("No peer-joined"),
        ServerEvent::PeerJoined { room: room.clone() }
    );
    assert_eq!(host.next_event().await.expect("No ready"), ServerEvent::Ready);

    rogue
        .send_raw(r#"["shutdown server"]"#)
        .await
        .expect("Send failed");
    assert_eq!(
        rogue.expect_close().await.expect("No close"),
        Some(POLICY_VIOLATION)
    );

    match host.next_event().await.expect("No peer-left") {
        ServerEvent::PeerLeft { .. } => {}
        other => panic!("Expected peer-left, got {:?}", other),
    }
}
