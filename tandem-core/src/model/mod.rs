mod envelope;
mod ice;
mod media;
mod participant;
mod signaling;

pub use envelope::{Envelope, RawSignal, RawSignalError};
pub use ice::{IceCandidate, IceServerConfig, SdpKind, SessionDescription};
pub use media::{MediaFlags, MediaKind};
pub use participant::{ParticipantId, ParticipantIdError};
pub use signaling::SignalMessage;
