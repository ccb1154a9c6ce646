use std::net::SocketAddr;
use std::time::Duration;

use tandem_client::{CallState, EngineConfig, Role, SignalingClient};
use tandem_server::{RelayConfig, serve_with_listener};
use tokio::net::TcpListener;

use crate::integration::init_tracing;
use crate::utils::{PeerBuilder, TestPeer};

async fn spawn_relay() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Err(e) = serve_with_listener(listener, RelayConfig::default()).await {
            tracing::error!("[TestRelay] stopped: {:?}", e);
        }
    });

    addr
}

async fn join(addr: SocketAddr) -> TestPeer {
    let url = format!("ws://{}/ws", addr);
    let connection = SignalingClient::connect(&url, None).await.unwrap();
    // Let the relay register the socket before anyone talks to it.
    tokio::time::sleep(Duration::from_millis(100)).await;

    PeerBuilder::new(connection.participant_id)
        .config(EngineConfig::default())
        .spawn(connection.outgoing, connection.incoming)
}

#[tokio::test]
async fn test_two_engines_negotiate_through_relay() {
    init_tracing();

    let addr = spawn_relay().await;
    let alice = join(addr).await;
    let bob = join(addr).await;

    alice.handle.start_call().await.unwrap();
    alice.wait_for(CallState::Ready).await;
    bob.handle.start_call().await.unwrap();

    alice.wait_for(CallState::Active).await;
    bob.wait_for(CallState::Active).await;

    let alice_role = alice.handle.snapshot().await.unwrap().role;
    let bob_role = bob.handle.snapshot().await.unwrap().role;
    let expected = if alice.id < bob.id {
        (Some(Role::Offerer), Some(Role::Answerer))
    } else {
        (Some(Role::Answerer), Some(Role::Offerer))
    };
    assert_eq!((alice_role, bob_role), expected);

    alice.handle.hangup().await.unwrap();
    bob.wait_for(CallState::Idle).await;
    assert_eq!(bob.live_local_tracks(), 0);
}

#[tokio::test]
async fn test_relay_disconnect_reaches_peer_as_bye() {
    init_tracing();

    let addr = spawn_relay().await;
    let alice = join(addr).await;

    let url = format!("ws://{}/ws", addr);
    let bob_connection = SignalingClient::connect(&url, None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    alice.handle.start_call().await.unwrap();
    bob_connection
        .outgoing
        .send(tandem_core::SignalMessage::Ready)
        .unwrap();

    let expected = if alice.id < bob_connection.participant_id {
        CallState::Negotiating
    } else {
        CallState::Ready
    };
    alice.wait_for(expected).await;

    // Dropping the sender closes Bob's socket; the relay announces the departure.
    drop(bob_connection);

    alice.wait_for(CallState::Idle).await;
    assert_eq!(alice.live_local_tracks(), 0);
}
