use std::time::Duration;

use tandem_client::{
    CallNotice, CallState, ConnectivityEvent, ConnectivityState, EngineConfig,
};
use tandem_core::{IceCandidate, SignalMessage};

use crate::integration::{init_tracing, ordered_ids};
use crate::utils::{BAD_CANDIDATE, MockConnectivityFactory, PeerBuilder};

#[tokio::test]
async fn test_bad_candidate_does_not_end_negotiation() {
    init_tracing();

    let (low, high) = ordered_ids();
    let (mut peer, relay) = PeerBuilder::new(low).spawn_alone();

    peer.handle.start_call().await.unwrap();
    relay.inject(high, SignalMessage::Ready).await;
    peer.wait_for(CallState::Negotiating).await;

    relay
        .inject(
            high,
            SignalMessage::Candidate {
                candidate: IceCandidate::new(BAD_CANDIDATE),
            },
        )
        .await;

    let notice = peer
        .notice_matching(|n| matches!(n, CallNotice::CandidateRejected(_)))
        .await;
    assert!(matches!(notice, CallNotice::CandidateRejected(_)));
    assert_eq!(peer.handle.state(), CallState::Negotiating);

    relay
        .inject(
            high,
            SignalMessage::Candidate {
                candidate: IceCandidate::new("candidate:1 1 udp 1 10.0.0.2 5000 typ host"),
            },
        )
        .await;
    relay
        .inject(
            high,
            SignalMessage::Answer {
                sdp: "v=0\r\n".to_owned(),
            },
        )
        .await;

    peer.wait_for(CallState::Active).await;

    let created = peer.factory.created().await;
    assert_eq!(created[0].log().await.candidates.len(), 1);
}

#[tokio::test]
async fn test_failed_offer_returns_to_ready_keeping_media() {
    init_tracing();

    let (low, high) = ordered_ids();
    let (mut peer, mut relay) = PeerBuilder::new(low)
        .factory(MockConnectivityFactory::failing_offers())
        .spawn_alone();

    peer.handle.start_call().await.unwrap();
    relay.next_sent().await;

    relay.inject(high, SignalMessage::Ready).await;

    peer.notice_matching(|n| matches!(n, CallNotice::NegotiationFailed(_)))
        .await;

    let snapshot = peer.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CallState::Ready);
    assert_eq!(snapshot.context_id, None);
    assert!(snapshot.has_local_media);
    assert_eq!(peer.live_local_tracks(), 2);

    let created = peer.factory.created().await;
    assert!(created[0].log().await.closed);
    assert!(relay.drain().await.is_empty());
}

#[tokio::test]
async fn test_negotiation_timeout_hangs_up() {
    init_tracing();

    let (low, high) = ordered_ids();
    let config = EngineConfig {
        negotiation_timeout: Some(Duration::from_millis(150)),
        ..EngineConfig::default()
    };
    let (mut peer, mut relay) = PeerBuilder::new(low).config(config).spawn_alone();

    peer.handle.start_call().await.unwrap();
    relay.next_sent().await;
    relay.inject(high, SignalMessage::Ready).await;
    peer.wait_for(CallState::Negotiating).await;

    let notice = peer
        .notice_matching(|n| *n == CallNotice::NegotiationTimedOut)
        .await;
    assert_eq!(notice, CallNotice::NegotiationTimedOut);

    peer.wait_for(CallState::Idle).await;
    assert!(relay.drain().await.contains(&SignalMessage::Bye));
    assert_eq!(peer.live_local_tracks(), 0);
}

#[tokio::test]
async fn test_no_timeout_by_default() {
    init_tracing();

    let (low, high) = ordered_ids();
    let (peer, relay) = PeerBuilder::new(low).spawn_alone();

    peer.handle.start_call().await.unwrap();
    relay.inject(high, SignalMessage::Ready).await;
    peer.wait_for(CallState::Negotiating).await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(peer.handle.state(), CallState::Negotiating);
}

#[tokio::test]
async fn test_events_from_released_context_are_dropped() {
    init_tracing();

    let (low, high) = ordered_ids();
    let (peer, relay) = PeerBuilder::new(low).spawn_alone();

    peer.handle.start_call().await.unwrap();
    relay.inject(high, SignalMessage::Ready).await;
    peer.wait_for(CallState::Negotiating).await;

    relay.inject(high, SignalMessage::Bye).await;
    peer.wait_for(CallState::Idle).await;

    peer.handle.start_call().await.unwrap();
    relay.inject(high, SignalMessage::Ready).await;
    peer.wait_for(CallState::Negotiating).await;

    let created = peer.factory.created().await;
    assert_eq!(created.len(), 2);
    assert_ne!(created[0].context_id, created[1].context_id);

    let stale = &created[0];
    stale
        .event_tx
        .send(ConnectivityEvent::StateChanged(
            stale.context_id,
            ConnectivityState::Connected,
        ))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(peer.handle.state(), CallState::Negotiating);

    let current = &created[1];
    current
        .event_tx
        .send(ConnectivityEvent::StateChanged(
            current.context_id,
            ConnectivityState::Connected,
        ))
        .await
        .unwrap();
    peer.wait_for(CallState::Active).await;
}

#[tokio::test]
async fn test_connectivity_failure_is_reported_not_fatal() {
    init_tracing();

    let (low, high) = ordered_ids();
    let (mut peer, relay) = PeerBuilder::new(low).spawn_alone();

    peer.handle.start_call().await.unwrap();
    relay.inject(high, SignalMessage::Ready).await;
    relay
        .inject(
            high,
            SignalMessage::Answer {
                sdp: "v=0\r\n".to_owned(),
            },
        )
        .await;
    peer.wait_for(CallState::Active).await;

    let created = peer.factory.created().await;
    created[0]
        .event_tx
        .send(ConnectivityEvent::StateChanged(
            created[0].context_id,
            ConnectivityState::Failed,
        ))
        .await
        .unwrap();

    let notice = peer
        .notice_matching(|n| matches!(n, CallNotice::ConnectivityChanged(_)))
        .await;
    assert_eq!(notice, CallNotice::ConnectivityChanged(ConnectivityState::Failed));
    assert_eq!(peer.handle.state(), CallState::Active);
}
