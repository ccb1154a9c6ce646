use tandem_client::CallState;
use tandem_core::{SessionDescription, SignalMessage};

use crate::integration::{init_tracing, ordered_ids};
use crate::utils::PeerBuilder;

#[tokio::test]
async fn test_higher_id_reannounces_instead_of_offering() {
    init_tracing();

    let (low, high) = ordered_ids();
    let (peer, mut relay) = PeerBuilder::new(high).spawn_alone();

    peer.handle.start_call().await.unwrap();
    assert_eq!(relay.next_sent().await, SignalMessage::Ready);

    relay.inject(low, SignalMessage::Ready).await;

    assert_eq!(relay.next_sent().await, SignalMessage::Ready);
    assert!(relay.drain().await.is_empty());
    assert_eq!(peer.factory.created_count().await, 0);
    assert_eq!(peer.handle.state(), CallState::Ready);
}

#[tokio::test]
async fn test_offer_ignored_while_context_exists() {
    init_tracing();

    let (low, high) = ordered_ids();
    let (peer, mut relay) = PeerBuilder::new(low).spawn_alone();

    peer.handle.start_call().await.unwrap();
    relay.next_sent().await;

    relay.inject(high, SignalMessage::Ready).await;
    assert!(matches!(
        relay.next_non_candidate().await,
        SignalMessage::Offer { .. }
    ));
    peer.wait_for(CallState::Negotiating).await;

    relay
        .inject(
            high,
            SignalMessage::Offer {
                sdp: "v=0\r\n".to_owned(),
            },
        )
        .await;
    relay.inject(high, SignalMessage::Ready).await;

    let sent = relay.drain().await;
    assert!(
        sent.iter().all(|m| m.kind_name() == "candidate"),
        "Unexpected reply: {:?}",
        sent
    );
    assert_eq!(peer.factory.created_count().await, 1);
}

#[tokio::test]
async fn test_second_answer_is_ignored() {
    init_tracing();

    let (low, high) = ordered_ids();
    let (peer, relay) = PeerBuilder::new(low).spawn_alone();

    peer.handle.start_call().await.unwrap();
    relay.inject(high, SignalMessage::Ready).await;
    peer.wait_for(CallState::Negotiating).await;

    let first = SessionDescription::answer("v=0\r\no=first\r\n");
    relay
        .inject(high, SignalMessage::Answer { sdp: first.sdp.clone() })
        .await;
    peer.wait_for(CallState::Active).await;

    relay
        .inject(
            high,
            SignalMessage::Answer {
                sdp: "v=0\r\no=second\r\n".to_owned(),
            },
        )
        .await;
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let created = peer.factory.created().await;
    assert_eq!(created[0].log().await.remote, Some(first));
}

#[tokio::test]
async fn test_own_messages_are_ignored() {
    init_tracing();

    let (me, _) = ordered_ids();
    let (peer, mut relay) = PeerBuilder::new(me).spawn_alone();

    peer.handle.start_call().await.unwrap();
    relay.next_sent().await;

    relay.inject(me, SignalMessage::Ready).await;
    relay
        .inject(
            me,
            SignalMessage::Offer {
                sdp: "v=0\r\n".to_owned(),
            },
        )
        .await;

    assert!(relay.drain().await.is_empty());
    assert_eq!(peer.factory.created_count().await, 0);
    assert_eq!(peer.handle.state(), CallState::Ready);
}

#[tokio::test]
async fn test_messages_ignored_without_local_media() {
    init_tracing();

    let (me, other) = ordered_ids();
    let (peer, mut relay) = PeerBuilder::new(me).spawn_alone();

    relay.inject(other, SignalMessage::Ready).await;
    relay
        .inject(
            other,
            SignalMessage::Offer {
                sdp: "v=0\r\n".to_owned(),
            },
        )
        .await;

    assert!(relay.drain().await.is_empty());
    assert_eq!(peer.factory.created_count().await, 0);
    assert_eq!(peer.handle.state(), CallState::Idle);
}
