use crate::error::MediaError;
use crate::media::MediaStream;
use async_trait::async_trait;

/// Захват локальной камеры и микрофона.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self) -> Result<MediaStream, MediaError>;
}
