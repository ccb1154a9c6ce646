use crate::model::ice::IceCandidate;
use crate::model::media::MediaKind;
use serde::{Deserialize, Serialize};

/// Сигнальные сообщения между участниками. Сервер их не интерпретирует,
/// кроме поля `type` и `enabled` у переключателей медиа.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalMessage {
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    Candidate {
        candidate: IceCandidate,
    },
    /// Участник получил локальное медиа и готов к согласованию.
    Ready,
    Bye,
    VideoToggle {
        enabled: bool,
    },
    AudioToggle {
        enabled: bool,
    },
    /// Generic failure reply from the relay.
    Error {
        message: String,
    },
    #[serde(other)]
    Unknown,
}

impl SignalMessage {
    pub fn toggle(kind: MediaKind, enabled: bool) -> Self {
        match kind {
            MediaKind::Audio => SignalMessage::AudioToggle { enabled },
            MediaKind::Video => SignalMessage::VideoToggle { enabled },
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SignalMessage::Offer { .. } => "offer",
            SignalMessage::Answer { .. } => "answer",
            SignalMessage::Candidate { .. } => "candidate",
            SignalMessage::Ready => "ready",
            SignalMessage::Bye => "bye",
            SignalMessage::VideoToggle { .. } => "video-toggle",
            SignalMessage::AudioToggle { .. } => "audio-toggle",
            SignalMessage::Error { .. } => "error",
            SignalMessage::Unknown => "unknown",
        }
    }
}
