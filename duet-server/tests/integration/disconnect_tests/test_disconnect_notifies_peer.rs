use duet_core::{ConnId, ServerEvent};

use crate::integration::{create_test_coordinator, init_tracing};
use crate::utils::{disconnect, join};

#[tokio::test]
async fn test_disconnect_notifies_peer() {
    init_tracing();

    let (mut coordinator, sink) = create_test_coordinator();
    let a = ConnId::new();
    let b = ConnId::new();

    join(&mut coordinator, a, "alpha").await;
    join(&mut coordinator, b, "alpha").await;
    sink.clear().await;

    disconnect(&mut coordinator, a).await;

    assert_eq!(
        sink.events_for(&b).await,
        vec![ServerEvent::PeerLeft { conn_id: a }]
    );
    assert!(sink.events_for(&a).await.is_empty());
    assert_eq!(coordinator.registry().members("alpha"), &[b]);
    assert_eq!(coordinator.registry().room_of(&a), None);
}

#[tokio::test]
async fn test_last_disconnect_deletes_room() {
    init_tracing();

    let (mut coordinator, sink) = create_test_coordinator();
    let a = ConnId::new();
    let b = ConnId::new();

    join(&mut coordinator, a, "alpha").await;
    join(&mut coordinator, b, "alpha").await;
    disconnect(&mut coordinator, a).await;
    sink.clear().await;
    disconnect(&mut coordinator, b).await;

    assert!(sink.all().await.is_empty());
    assert_eq!(coordinator.registry().member_count("alpha"), 0);
    assert_eq!(coordinator.registry().room_count(), 0);
    assert_eq!(coordinator.registry().room_of(&b), None);
}

#[tokio::test]
async fn test_freed_slot_can_be_taken() {
    init_tracing();

    let (mut coordinator, sink) = create_test_coordinator();
    let a = ConnId::new();
    let b = ConnId::new();
    let c = ConnId::new();

    join(&mut coordinator, a, "alpha").await;
    join(&mut coordinator, b, "alpha").await;
    disconnect(&mut coordinator, a).await;
    sink.clear().await;
    join(&mut coordinator, c, "alpha").await;

    assert_eq!(
        sink.events_for(&b).await,
        vec![
            ServerEvent::PeerJoined {
                room: crate::utils::room("alpha")
            },
            ServerEvent::Ready,
        ]
    );
    assert_eq!(coordinator.registry().members("alpha"), &[b, c]);
}

#[tokio::test]
async fn test_disconnect_without_room_is_noop() {
    init_tracing();

    let (mut coordinator, sink) = create_test_coordinator();
    let stranger = ConnId::new();

    disconnect(&mut coordinator, stranger).await;

    assert!(sink.all().await.is_empty());
    assert_eq!(coordinator.registry().room_count(), 0);
}
