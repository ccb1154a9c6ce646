use crate::engine::{CallNotice, CallState, EngineSnapshot};
use crate::error::CallError;
use tandem_core::{MediaKind, ParticipantId};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Команды от UI к движку.
#[derive(Debug)]
pub enum CallCommand {
    StartCall {
        reply: oneshot::Sender<Result<(), CallError>>,
    },
    Hangup {
        reply: oneshot::Sender<()>,
    },
    /// `enabled: None` инвертирует текущий локальный флаг.
    SetMedia {
        kind: MediaKind,
        enabled: Option<bool>,
        reply: oneshot::Sender<bool>,
    },
    Snapshot {
        reply: oneshot::Sender<EngineSnapshot>,
    },
}

/// Клонируемая ручка управления движком звонка.
#[derive(Clone)]
pub struct CallHandle {
    participant_id: ParticipantId,
    command_tx: mpsc::Sender<CallCommand>,
    state_rx: watch::Receiver<CallState>,
    notice_tx: broadcast::Sender<CallNotice>,
}

impl CallHandle {
    pub(super) fn new(
        participant_id: ParticipantId,
        command_tx: mpsc::Sender<CallCommand>,
        state_rx: watch::Receiver<CallState>,
        notice_tx: broadcast::Sender<CallNotice>,
    ) -> Self {
        Self {
            participant_id,
            command_tx,
            state_rx,
            notice_tx,
        }
    }

    pub fn participant_id(&self) -> ParticipantId {
        self.participant_id
    }

    /// Захватывает локальное медиа и объявляет готовность пиру.
    pub async fn start_call(&self) -> Result<(), CallError> {
        self.request(|reply| CallCommand::StartCall { reply }).await?
    }

    pub async fn hangup(&self) -> Result<(), CallError> {
        self.request(|reply| CallCommand::Hangup { reply }).await
    }

    /// Returns the resulting local flag.
    pub async fn set_audio_enabled(&self, enabled: bool) -> Result<bool, CallError> {
        self.set_media(MediaKind::Audio, Some(enabled)).await
    }

    pub async fn set_video_enabled(&self, enabled: bool) -> Result<bool, CallError> {
        self.set_media(MediaKind::Video, Some(enabled)).await
    }

    pub async fn toggle_audio(&self) -> Result<bool, CallError> {
        self.set_media(MediaKind::Audio, None).await
    }

    pub async fn toggle_video(&self) -> Result<bool, CallError> {
        self.set_media(MediaKind::Video, None).await
    }

    pub async fn snapshot(&self) -> Result<EngineSnapshot, CallError> {
        self.request(|reply| CallCommand::Snapshot { reply }).await
    }

    pub fn state(&self) -> CallState {
        *self.state_rx.borrow()
    }

    pub fn state_changes(&self) -> watch::Receiver<CallState> {
        self.state_rx.clone()
    }

    /// Ждет, пока движок не окажется в `target`.
    pub async fn wait_for_state(&self, target: CallState) -> Result<(), CallError> {
        let mut rx = self.state_rx.clone();
        rx.wait_for(|state| *state == target)
            .await
            .map(|_| ())
            .map_err(|_| CallError::EngineStopped)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CallNotice> {
        self.notice_tx.subscribe()
    }

    async fn set_media(&self, kind: MediaKind, enabled: Option<bool>) -> Result<bool, CallError> {
        self.request(|reply| CallCommand::SetMedia {
            kind,
            enabled,
            reply,
        })
        .await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> CallCommand,
    ) -> Result<T, CallError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(make(reply))
            .await
            .map_err(|_| CallError::EngineStopped)?;
        rx.await.map_err(|_| CallError::EngineStopped)
    }
}
