use crate::error::RelayError;
use crate::hub::{HubCommand, ParticipantRecord};
use crate::signaling::{Admission, AdmissionSlot, SignalingOutput};
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tandem_core::utils::GENERIC_FAILURE_MESSAGE;
use tandem_core::{ParticipantId, RawSignal};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, warn};

struct SignalingInner {
    peers: DashMap<ParticipantId, mpsc::UnboundedSender<Message>>,
    admission: Admission,
}

#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) hub_cmd_tx: mpsc::Sender<HubCommand>,
}

impl SignalingService {
    pub fn new(hub_cmd_tx: mpsc::Sender<HubCommand>, max_participants: Option<usize>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                admission: Admission::new(max_participants),
            }),
            hub_cmd_tx,
        }
    }

    pub fn try_admit(&self) -> Result<AdmissionSlot, RelayError> {
        let admission = &self.inner.admission;
        admission.try_acquire().ok_or_else(|| RelayError::RelayFull {
            max: admission.max().unwrap_or_default(),
        })
    }

    pub fn connected(&self) -> usize {
        self.inner.peers.len()
    }

    pub(crate) fn add_peer(&self, participant_id: ParticipantId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(participant_id, tx);
    }

    pub(crate) fn remove_peer(&self, participant_id: &ParticipantId) {
        self.inner.peers.remove(participant_id);
    }

    pub fn send_signal(&self, participant_id: ParticipantId, msg: &RawSignal) {
        if let Some(peer) = self.inner.peers.get(&participant_id) {
            match msg.to_json() {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!("Failed to send WS message to {}: {:?}", participant_id, e);
                    }
                }
                Err(e) => error!("Failed to serialize signal message: {}", e),
            }
        } else {
            warn!(
                "Attempted to send signal to disconnected participant {}",
                participant_id
            );
        }
    }

    /// Generic failure reply. The connection stays open.
    pub fn send_error(&self, participant_id: ParticipantId) {
        self.send_signal(participant_id, &RawSignal::error(GENERIC_FAILURE_MESSAGE));
    }

    pub async fn participants(&self) -> Result<Vec<ParticipantRecord>, RelayError> {
        let (reply, rx) = oneshot::channel();
        self.hub_cmd_tx
            .send(HubCommand::Snapshot { reply })
            .await
            .map_err(|_| RelayError::HubUnavailable)?;
        rx.await.map_err(|_| RelayError::HubUnavailable)
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn deliver(&self, participant_id: ParticipantId, message: RawSignal) {
        self.send_signal(participant_id, &message);
    }
}
