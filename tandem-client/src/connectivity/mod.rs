mod connectivity_context;
mod connectivity_event;
mod webrtc_connectivity;

pub use connectivity_context::*;
pub use connectivity_event::*;
pub use webrtc_connectivity::*;

use crate::media::MediaTrack;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tandem_core::{IceCandidate, IceServerConfig, SessionDescription};
use tokio::sync::mpsc;

/// Транспорт прямого соединения между участниками.
/// Обнаружение кандидатов и входящие треки приходят через `ConnectivityEvent`.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn add_track(&self, track: Arc<MediaTrack>, stream_id: &str) -> Result<()>;

    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, description: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait ConnectivityFactory: Send + Sync {
    /// Создает транспорт для нового контекста. Все события помечаются `context_id`.
    async fn create(
        &self,
        context_id: ContextId,
        ice_servers: &[IceServerConfig],
        event_tx: mpsc::Sender<ConnectivityEvent>,
    ) -> Result<Arc<dyn Connectivity>>;
}
