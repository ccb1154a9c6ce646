use tandem_core::SignalMessage;
use tandem_server::{HubCommand, RelayConfig};

use crate::integration::{connect, create_test_hub, init_tracing, snapshot};
use crate::utils::{TestClient, spawn_test_relay};

#[tokio::test]
async fn test_disconnect_removes_record_and_notifies_others() {
    init_tracing();

    let (hub_tx, mut delivery_rx, _signaling) = create_test_hub();

    let leaving = connect(&hub_tx).await;
    let staying = connect(&hub_tx).await;

    hub_tx
        .send(HubCommand::Disconnect {
            participant_id: leaving,
        })
        .await
        .expect("Failed to send disconnect");

    let delivered = delivery_rx.recv().await.expect("Expected a bye");
    assert_eq!(delivered.to, staying);
    assert_eq!(delivered.message.message_type(), Some("bye"));
    assert_eq!(
        delivered.message.from_id(),
        Some(leaving.to_string().as_str())
    );

    let records = snapshot(&hub_tx).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, staying);
}

#[tokio::test]
async fn test_closing_socket_sends_bye_over_the_wire() {
    init_tracing();

    let addr = spawn_test_relay(RelayConfig::default()).await;

    let alice = TestClient::connect(addr).await.expect("Alice failed to connect");
    let mut bob = TestClient::connect(addr).await.expect("Bob failed to connect");
    let alice_id = alice.participant_id;

    alice.close().await.expect("Close failed");

    let bye = bob.recv().await.expect("Bob should hear about Alice leaving");
    assert_eq!(bye.signal, SignalMessage::Bye);
    assert_eq!(bye.from, Some(alice_id));

    bob.close().await.expect("Close failed");
}
