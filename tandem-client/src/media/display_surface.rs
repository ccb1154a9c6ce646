use crate::media::MediaStream;

/// Приемник для отрисовки потока (локальное превью или удаленное видео).
pub trait DisplaySurface: Send + Sync {
    fn assign(&self, stream: &MediaStream);
    fn clear(&self);
}
