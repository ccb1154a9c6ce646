use crate::connectivity::{Connectivity, ContextId};
use crate::engine::Role;
use crate::media::{MediaStream, MediaTrack};
use anyhow::Result;
use std::sync::Arc;
use tandem_core::{IceCandidate, SessionDescription};
use tracing::{debug, warn};

/// Состояние одной попытки соединения. У клиента не больше одного контекста.
pub struct ConnectivityContext {
    pub id: ContextId,
    pub role: Role,
    connectivity: Arc<dyn Connectivity>,
    pub local_description: Option<SessionDescription>,
    pub remote_description: Option<SessionDescription>,
    pub local_candidates: Vec<IceCandidate>,
    pub local_tracks: Vec<Arc<MediaTrack>>,
    pub remote_stream: MediaStream,
}

impl ConnectivityContext {
    pub fn new(id: ContextId, role: Role, connectivity: Arc<dyn Connectivity>) -> Self {
        Self {
            id,
            role,
            connectivity,
            local_description: None,
            remote_description: None,
            local_candidates: Vec::new(),
            local_tracks: Vec::new(),
            remote_stream: MediaStream::new(format!("remote-{}", id.0)),
        }
    }

    pub fn connectivity(&self) -> Arc<dyn Connectivity> {
        self.connectivity.clone()
    }

    pub async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.connectivity.add_ice_candidate(candidate).await
    }

    /// Закрывает транспорт. Локальные треки не останавливаются: ими владеет движок.
    pub async fn close(self) {
        if let Err(e) = self.connectivity.close().await {
            warn!("{}: close failed: {:?}", self.id, e);
        }
        self.remote_stream.stop_all();
        debug!("{}: released", self.id);
    }
}
