use duet_core::{ConnId, ServerEvent};
use duet_server::{RelayConfig, RoomCommand};

use crate::integration::{create_test_coordinator, create_test_coordinator_with, init_tracing};
use crate::utils::{join, room};

#[tokio::test]
async fn test_bye_is_informational_by_default() {
    init_tracing();

    let (mut coordinator, sink) = create_test_coordinator();
    let a = ConnId::new();
    let b = ConnId::new();

    join(&mut coordinator, a, "alpha").await;
    join(&mut coordinator, b, "alpha").await;
    sink.clear().await;

    coordinator.handle(RoomCommand::Bye { conn_id: a }).await;

    assert!(sink.all().await.is_empty());
    assert_eq!(coordinator.registry().members("alpha"), &[a, b]);
}

#[tokio::test]
async fn test_bye_leaves_room_when_configured() {
    init_tracing();

    let config = RelayConfig {
        leave_on_bye: true,
        ..Default::default()
    };
    let (mut coordinator, sink) = create_test_coordinator_with(config);
    let a = ConnId::new();
    let b = ConnId::new();

    join(&mut coordinator, a, "alpha").await;
    join(&mut coordinator, b, "alpha").await;
    sink.clear().await;

    coordinator.handle(RoomCommand::Bye { conn_id: a }).await;

    assert_eq!(
        sink.events_for(&b).await,
        vec![ServerEvent::PeerLeft { conn_id: a }]
    );
    assert_eq!(coordinator.registry().room_of(&a), None);
}

#[tokio::test]
async fn test_connection_stays_usable_after_leave() {
    init_tracing();

    let (mut coordinator, sink) = create_test_coordinator();
    let a = ConnId::new();

    join(&mut coordinator, a, "alpha").await;
    coordinator.handle(RoomCommand::Leave { conn_id: a }).await;
    assert_eq!(coordinator.registry().room_count(), 0);

    sink.clear().await;
    join(&mut coordinator, a, "alpha").await;

    assert_eq!(
        sink.events_for(&a).await,
        vec![ServerEvent::Created {
            room: room("alpha"),
            conn_id: a,
        }]
    );
}
