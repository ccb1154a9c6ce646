use tandem_core::SignalMessage;
use tandem_server::RelayConfig;

use crate::integration::init_tracing;
use crate::utils::{TestClient, spawn_test_relay};

async fn fetch_participants(addr: std::net::SocketAddr) -> serde_json::Value {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET /participants HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    let body = response
        .split("\r\n\r\n")
        .nth(1)
        .expect("Response without body");
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn test_participants_endpoint_reflects_toggles() {
    init_tracing();

    let addr = spawn_test_relay(RelayConfig::default()).await;

    let mut alice = TestClient::connect(addr).await.unwrap();
    let mut bob = TestClient::connect(addr).await.unwrap();

    alice
        .send_signal(&SignalMessage::AudioToggle { enabled: false })
        .await
        .unwrap();
    bob.recv().await.expect("Toggle should be relayed");

    let listing = fetch_participants(addr).await;
    let entries = listing.as_array().expect("Expected a JSON array");
    assert_eq!(entries.len(), 2);

    let alice_entry = entries
        .iter()
        .find(|e| e["id"] == alice.participant_id.to_string())
        .unwrap();
    assert_eq!(alice_entry["audioEnabled"], false);
    assert_eq!(alice_entry["videoEnabled"], true);

    alice.close().await.unwrap();
    bob.close().await.unwrap();
}
