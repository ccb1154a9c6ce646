use crate::connectivity::{ConnectivityState, ContextId};
use std::fmt;
use tandem_core::{MediaFlags, MediaKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    AwaitingLocalMedia,
    Ready,
    Negotiating,
    Active,
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallState::Idle => "idle",
            CallState::AwaitingLocalMedia => "awaiting local media",
            CallState::Ready => "ready",
            CallState::Negotiating => "negotiating",
            CallState::Active => "active",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Offerer,
    Answerer,
}

/// Уведомления для UI. Ни одно из них не меняет состояние само по себе.
#[derive(Debug, Clone, PartialEq)]
pub enum CallNotice {
    MediaAccessFailed(String),
    CandidateRejected(String),
    RemoteMediaChanged { kind: MediaKind, enabled: bool },
    PeerLeft,
    NegotiationFailed(String),
    NegotiationTimedOut,
    ConnectivityChanged(ConnectivityState),
    RelayError(String),
}

/// Снимок состояния движка.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub state: CallState,
    pub role: Option<Role>,
    pub context_id: Option<ContextId>,
    pub has_local_description: bool,
    pub has_remote_description: bool,
    pub local_candidates: usize,
    pub attached_local_tracks: usize,
    pub remote_tracks: usize,
    pub has_local_media: bool,
    pub local_flags: MediaFlags,
    pub remote_flags: MediaFlags,
}
