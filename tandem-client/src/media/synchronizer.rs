use crate::media::{MediaStream, MediaTrack};
use tandem_core::{MediaFlags, MediaKind, SignalMessage};
use tracing::debug;

/// Синхронизатор состояния медиа: флаги по (направлению, типу).
///
/// Локальные намерения выключают исходящие треки и порождают toggle-сообщение,
/// входящие toggle переключают полученные треки. Пересогласование не требуется.
#[derive(Debug, Default, Clone)]
pub struct MediaSynchronizer {
    local: MediaFlags,
    remote: MediaFlags,
}

impl MediaSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local(&self) -> MediaFlags {
        self.local
    }

    pub fn remote(&self) -> MediaFlags {
        self.remote
    }

    /// Applies a local intent to the outgoing tracks.
    /// Returns the message for the peer, or `None` when nothing changed.
    pub fn set_local(
        &mut self,
        stream: &MediaStream,
        kind: MediaKind,
        enabled: bool,
    ) -> Option<SignalMessage> {
        if !self.local.set(kind, enabled) {
            debug!("Local {} already {}", kind, on_off(enabled));
            return None;
        }

        stream.set_kind_enabled(kind, enabled);
        Some(SignalMessage::toggle(kind, enabled))
    }

    /// Applies the peer's toggle to the received tracks. Returns `true` on change.
    pub fn apply_remote(
        &mut self,
        stream: Option<&MediaStream>,
        kind: MediaKind,
        enabled: bool,
    ) -> bool {
        let changed = self.remote.set(kind, enabled);

        if let Some(stream) = stream {
            stream.set_kind_enabled(kind, enabled);
        }

        changed
    }

    /// A remote track that shows up late starts with the last announced flag.
    pub fn adopt_remote_track(&self, track: &MediaTrack) {
        track.set_enabled(self.remote.get(track.kind()));
    }

    pub fn reset(&mut self) {
        self.local = MediaFlags::default();
        self.remote = MediaFlags::default();
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
