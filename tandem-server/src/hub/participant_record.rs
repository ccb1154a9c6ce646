use serde::Serialize;
use tandem_core::{MediaFlags, MediaKind, ParticipantId, RawSignal};

/// Состояние одного подключенного участника на стороне сервера.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    pub id: ParticipantId,
    #[serde(flatten)]
    pub flags: MediaFlags,
}

impl ParticipantRecord {
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            flags: MediaFlags::default(),
        }
    }

    pub fn video_enabled(&self) -> bool {
        self.flags.video_enabled
    }

    pub fn audio_enabled(&self) -> bool {
        self.flags.audio_enabled
    }

    /// Updates the flags from the owner's toggle message. Any other type,
    /// or a toggle without a boolean `enabled`, leaves the record untouched.
    pub fn apply(&mut self, message: &RawSignal) -> bool {
        let kind = match message.message_type() {
            Some("video-toggle") => MediaKind::Video,
            Some("audio-toggle") => MediaKind::Audio,
            _ => return false,
        };

        match message.enabled() {
            Some(enabled) => {
                self.flags.set(kind, enabled);
                true
            }
            None => false,
        }
    }
}
