use tandem_core::{RawSignal, SignalMessage};
use tandem_server::{HubCommand, RelayConfig};

use crate::integration::{connect, create_test_hub, init_tracing};
use crate::utils::{SILENCE_MS, TestClient, collect_deliveries, spawn_test_relay};

#[tokio::test]
async fn test_message_is_stamped_and_not_echoed() {
    init_tracing();

    let (hub_tx, mut delivery_rx, signaling) = create_test_hub();

    let sender = connect(&hub_tx).await;
    let receiver = connect(&hub_tx).await;

    let message = RawSignal::parse(r#"{"type":"offer","sdp":"v=0"}"#).unwrap();
    hub_tx
        .send(HubCommand::Message {
            participant_id: sender,
            message,
        })
        .await
        .unwrap();

    let delivered = collect_deliveries(&mut delivery_rx, SILENCE_MS).await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].to, receiver);
    assert_eq!(delivered[0].message.message_type(), Some("offer"));
    assert_eq!(
        delivered[0].message.from_id(),
        Some(sender.to_string().as_str())
    );

    assert!(signaling.delivered_to(&sender).await.is_empty());
}

#[tokio::test]
async fn test_forged_sender_is_overwritten() {
    init_tracing();

    let (hub_tx, mut delivery_rx, _signaling) = create_test_hub();

    let sender = connect(&hub_tx).await;
    let _receiver = connect(&hub_tx).await;

    let forged = RawSignal::parse(
        r#"{"type":"ready","from":"00000000-0000-0000-0000-000000000000"}"#,
    )
    .unwrap();
    hub_tx
        .send(HubCommand::Message {
            participant_id: sender,
            message: forged,
        })
        .await
        .unwrap();

    let delivered = delivery_rx.recv().await.unwrap();
    assert_eq!(
        delivered.message.from_id(),
        Some(sender.to_string().as_str())
    );
}

#[tokio::test]
async fn test_unknown_type_and_extra_fields_are_forwarded() {
    init_tracing();

    let (hub_tx, mut delivery_rx, _signaling) = create_test_hub();

    let sender = connect(&hub_tx).await;
    let _receiver = connect(&hub_tx).await;

    let message = RawSignal::parse(r#"{"type":"wave","hand":"left","count":3}"#).unwrap();
    hub_tx
        .send(HubCommand::Message {
            participant_id: sender,
            message,
        })
        .await
        .unwrap();

    let delivered = delivery_rx.recv().await.unwrap();
    assert_eq!(delivered.message.message_type(), Some("wave"));
    assert_eq!(delivered.message.get("hand"), Some(&serde_json::json!("left")));
    assert_eq!(delivered.message.get("count"), Some(&serde_json::json!(3)));
}

#[tokio::test]
async fn test_messages_from_one_sender_arrive_in_order() {
    init_tracing();

    let addr = spawn_test_relay(RelayConfig::default()).await;

    let mut alice = TestClient::connect(addr).await.unwrap();
    let mut bob = TestClient::connect(addr).await.unwrap();

    let sdps: Vec<String> = (0..20).map(|i| format!("sdp-{}", i)).collect();
    for sdp in &sdps {
        alice
            .send_signal(&SignalMessage::Offer { sdp: sdp.clone() })
            .await
            .unwrap();
    }

    for expected in &sdps {
        let envelope = bob.recv().await.expect("Missing relayed offer");
        assert_eq!(envelope.from, Some(alice.participant_id));
        assert_eq!(
            envelope.signal,
            SignalMessage::Offer {
                sdp: expected.clone()
            }
        );
    }

    assert!(alice.is_silent().await, "Sender must not receive its own messages");

    alice.close().await.unwrap();
    bob.close().await.unwrap();
}
