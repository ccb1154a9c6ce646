use tandem_client::CallState;
use tandem_core::{MediaFlags, MediaKind, SignalMessage};

use crate::integration::{init_tracing, ordered_ids};
use crate::utils::PeerBuilder;

#[tokio::test]
async fn test_local_toggle_is_idempotent() {
    init_tracing();

    let (me, _) = ordered_ids();
    let (peer, mut relay) = PeerBuilder::new(me).spawn_alone();

    peer.handle.start_call().await.unwrap();
    relay.next_sent().await;

    assert!(!peer.handle.set_audio_enabled(false).await.unwrap());
    assert!(!peer.handle.set_audio_enabled(false).await.unwrap());

    assert_eq!(
        relay.drain().await,
        vec![SignalMessage::AudioToggle { enabled: false }]
    );

    let tracks = peer.media.tracks();
    for track in &tracks {
        let expected = track.kind() != MediaKind::Audio;
        assert_eq!(track.is_enabled(), expected, "track {}", track.id());
    }
}

#[tokio::test]
async fn test_toggle_negates_current_flag() {
    init_tracing();

    let (me, _) = ordered_ids();
    let (peer, mut relay) = PeerBuilder::new(me).spawn_alone();

    peer.handle.start_call().await.unwrap();
    relay.next_sent().await;

    assert!(!peer.handle.toggle_video().await.unwrap());
    assert!(peer.handle.toggle_video().await.unwrap());

    assert_eq!(
        relay.drain().await,
        vec![
            SignalMessage::VideoToggle { enabled: false },
            SignalMessage::VideoToggle { enabled: true },
        ]
    );
}

#[tokio::test]
async fn test_toggle_without_local_media_is_ignored() {
    init_tracing();

    let (me, _) = ordered_ids();
    let (peer, mut relay) = PeerBuilder::new(me).spawn_alone();

    assert!(peer.handle.set_video_enabled(false).await.unwrap());
    assert!(peer.handle.toggle_audio().await.unwrap());

    assert!(relay.drain().await.is_empty());
    assert_eq!(peer.handle.state(), CallState::Idle);
}

#[tokio::test]
async fn test_toggles_do_not_renegotiate() {
    init_tracing();

    let (low, high) = ordered_ids();
    let (peer, mut relay) = PeerBuilder::new(low).spawn_alone();

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
    relay.drain().await;

    peer.handle.set_video_enabled(false).await.unwrap();
    peer.handle.set_audio_enabled(false).await.unwrap();

    let sent = relay.drain().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|m| m.kind_name().ends_with("-toggle")));
    assert_eq!(peer.factory.created_count().await, 1);
    assert_eq!(peer.handle.state(), CallState::Active);

    peer.handle.hangup().await.unwrap();
    let snapshot = peer.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.local_flags, MediaFlags::default());
}
