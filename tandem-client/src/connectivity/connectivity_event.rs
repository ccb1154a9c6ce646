use crate::media::MediaTrack;
use std::fmt;
use std::sync::Arc;
use tandem_core::IceCandidate;

/// Поколение контекста соединения. События от освобожденного контекста отбрасываются.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// События, которые транспорт генерирует для движка звонка.
#[derive(Debug, Clone)]
pub enum ConnectivityEvent {
    /// Найден локальный кандидат, его нужно отправить пиру.
    CandidateDiscovered(ContextId, IceCandidate),

    /// От пира пришел трек.
    RemoteTrack(ContextId, Arc<MediaTrack>),

    StateChanged(ContextId, ConnectivityState),
}

impl ConnectivityEvent {
    pub fn context_id(&self) -> ContextId {
        match self {
            ConnectivityEvent::CandidateDiscovered(id, _)
            | ConnectivityEvent::RemoteTrack(id, _)
            | ConnectivityEvent::StateChanged(id, _) => *id,
        }
    }
}
