use async_trait::async_trait;
use colored::*;
use tandem_client::{DisplaySurface, MediaError, MediaSource, MediaStream, MediaTrack};
use tandem_core::{MediaKind, ParticipantId};

/// Источник без устройств: один беззвучный аудио- и один пустой видеотрек.
pub struct SilentMediaSource {
    pub participant_id: ParticipantId,
}

#[async_trait]
impl MediaSource for SilentMediaSource {
    async fn acquire(&self) -> Result<MediaStream, MediaError> {
        let id = self.participant_id;
        Ok(MediaStream::new(format!("tandem-{}", id))
            .with_track(MediaTrack::new(format!("audio-{}", id), MediaKind::Audio))
            .with_track(MediaTrack::new(format!("video-{}", id), MediaKind::Video)))
    }
}

/// "Экран" в терминале: печатает, что сейчас показывается.
pub struct TerminalSurface {
    pub label: &'static str,
}

impl DisplaySurface for TerminalSurface {
    fn assign(&self, stream: &MediaStream) {
        let tracks: Vec<String> = stream
            .tracks()
            .iter()
            .map(|t| format!("{}{}", t.kind(), if t.is_enabled() { "" } else { " (off)" }))
            .collect();
        println!(
            "{} {} ← {} [{}]",
            "▶".cyan(),
            self.label.bold(),
            stream.id(),
            tracks.join(", ")
        );
    }

    fn clear(&self) {
        println!("{} {} cleared", "■".dimmed(), self.label.bold());
    }
}
