use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Флаги включенности медиа одного направления. По умолчанию все включено.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFlags {
    pub video_enabled: bool,
    pub audio_enabled: bool,
}

impl Default for MediaFlags {
    fn default() -> Self {
        Self {
            video_enabled: true,
            audio_enabled: true,
        }
    }
}

impl MediaFlags {
    pub fn get(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Audio => self.audio_enabled,
            MediaKind::Video => self.video_enabled,
        }
    }

    /// Returns `true` when the flag actually changed.
    pub fn set(&mut self, kind: MediaKind, enabled: bool) -> bool {
        let slot = match kind {
            MediaKind::Audio => &mut self.audio_enabled,
            MediaKind::Video => &mut self.video_enabled,
        };
        let changed = *slot != enabled;
        *slot = enabled;
        changed
    }
}
