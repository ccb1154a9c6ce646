use crate::connectivity::{
    Connectivity, ConnectivityEvent, ConnectivityFactory, ConnectivityState, ContextId,
};
use crate::media::MediaTrack;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tandem_core::{IceCandidate, IceServerConfig, MediaKind, SdpKind, SessionDescription};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

pub struct WebRtcConnectivity {
    pub context_id: ContextId,
    pub peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcConnectivity {
    /// Инициализация нового WebRTC соединения.
    /// event_tx: канал, в который транспорт отдает события главному циклу движка.
    pub async fn new(
        context_id: ContextId,
        ice_servers: &[IceServerConfig],
        event_tx: mpsc::Sender<ConnectivityEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        // A. Состояние соединения
        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("{}: peer connection state {:?}", context_id, s);
                    let state = match s {
                        RTCPeerConnectionState::New => ConnectivityState::New,
                        RTCPeerConnectionState::Connecting => ConnectivityState::Connecting,
                        RTCPeerConnectionState::Connected => ConnectivityState::Connected,
                        RTCPeerConnectionState::Disconnected => ConnectivityState::Disconnected,
                        RTCPeerConnectionState::Failed => ConnectivityState::Failed,
                        RTCPeerConnectionState::Closed => ConnectivityState::Closed,
                        RTCPeerConnectionState::Unspecified => return,
                    };
                    let _ = tx
                        .send(ConnectivityEvent::StateChanged(context_id, state))
                        .await;
                })
            },
        ));

        // B. Trickle ICE
        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        warn!("{}: failed to serialize local candidate: {}", context_id, e);
                        return;
                    }
                };
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                };
                let _ = tx
                    .send(ConnectivityEvent::CandidateDiscovered(context_id, candidate))
                    .await;
            })
        }));

        // C. Входящие треки
        let track_tx = event_tx;
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();

            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Audio => MediaKind::Audio,
                    RTPCodecType::Video => MediaKind::Video,
                    other => {
                        warn!("{}: remote track of unknown kind {:?}", context_id, other);
                        return;
                    }
                };
                debug!("{}: remote {} track {}", context_id, kind, track.id());

                let remote = MediaTrack::new(track.id().to_string(), kind);
                let _ = tx
                    .send(ConnectivityEvent::RemoteTrack(context_id, remote))
                    .await;
            })
        }));

        Ok(Self {
            context_id,
            peer_connection,
        })
    }

    fn to_rtc(description: SessionDescription) -> Result<RTCSessionDescription> {
        let desc = match description.kind {
            SdpKind::Offer => RTCSessionDescription::offer(description.sdp)?,
            SdpKind::Answer => RTCSessionDescription::answer(description.sdp)?,
        };
        Ok(desc)
    }
}

#[async_trait]
impl Connectivity for WebRtcConnectivity {
    /// Opus для аудио, VP8 для видео. Сэмплы пишет источник медиа.
    async fn add_track(&self, track: Arc<MediaTrack>, stream_id: &str) -> Result<()> {
        let capability = match track.kind() {
            MediaKind::Audio => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            MediaKind::Video => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
        };

        let local = Arc::new(TrackLocalStaticSample::new(
            capability,
            track.id().to_owned(),
            stream_id.to_owned(),
        ));

        self.peer_connection
            .add_track(local as Arc<dyn TrackLocal + Send + Sync>)
            .await
            .with_context(|| format!("Failed to add {} track", track.kind()))?;
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, description: SessionDescription) -> Result<()> {
        let desc = Self::to_rtc(description)?;
        self.peer_connection.set_local_description(desc).await?;
        Ok(())
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        let desc = Self::to_rtc(description)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WebRtcConnectivityFactory;

#[async_trait]
impl ConnectivityFactory for WebRtcConnectivityFactory {
    async fn create(
        &self,
        context_id: ContextId,
        ice_servers: &[IceServerConfig],
        event_tx: mpsc::Sender<ConnectivityEvent>,
    ) -> Result<Arc<dyn Connectivity>> {
        let connectivity = WebRtcConnectivity::new(context_id, ice_servers, event_tx).await?;
        Ok(Arc::new(connectivity))
    }
}
