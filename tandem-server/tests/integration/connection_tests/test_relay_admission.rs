use tandem_server::RelayConfig;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::integration::init_tracing;
use crate::utils::{TestClient, spawn_test_relay};

#[tokio::test]
async fn test_third_participant_is_turned_away() {
    init_tracing();

    let addr = spawn_test_relay(RelayConfig::default()).await;

    let alice = TestClient::connect(addr).await.expect("Alice failed to connect");
    let bob = TestClient::connect(addr).await.expect("Bob failed to connect");

    let err = TestClient::connect(addr)
        .await
        .err()
        .expect("Third participant should be rejected");

    match err.downcast_ref::<WsError>() {
        Some(WsError::Http(response)) => assert_eq!(response.status().as_u16(), 503),
        other => panic!("Expected HTTP rejection, got {:?}", other),
    }

    alice.close().await.expect("Close failed");
    bob.close().await.expect("Close failed");
}

#[tokio::test]
async fn test_foreign_origin_is_forbidden() {
    init_tracing();

    let addr = spawn_test_relay(RelayConfig::default()).await;

    let err = TestClient::connect_with_origin(addr, Some("http://evil.example"))
        .await
        .err()
        .expect("Foreign origin should be rejected");

    match err.downcast_ref::<WsError>() {
        Some(WsError::Http(response)) => assert_eq!(response.status().as_u16(), 403),
        other => panic!("Expected HTTP rejection, got {:?}", other),
    }

    let allowed = TestClient::connect_with_origin(addr, Some("http://localhost:5173"))
        .await
        .expect("Configured origin should be admitted");
    allowed.close().await.expect("Close failed");
}
