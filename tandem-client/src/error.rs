use crate::engine::CallState;
use thiserror::Error;

/// Ошибка захвата локального медиа (камера/микрофон).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("permission to use camera/microphone was denied")]
    PermissionDenied,
    #[error("no capture device available")]
    NoDevice,
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error("media access failed: {0}")]
    MediaAccess(#[from] MediaError),

    #[error("cannot start a call while {state}")]
    InvalidState { state: CallState },

    #[error("call was hung up before local media became available")]
    Cancelled,

    #[error("call engine has stopped")]
    EngineStopped,
}
