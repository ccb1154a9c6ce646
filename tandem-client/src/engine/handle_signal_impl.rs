use crate::engine::{CallEngine, CallNotice};
use tandem_core::{Envelope, MediaKind, ParticipantId, SignalMessage};
use tracing::{debug, info, warn};

impl CallEngine {
    pub(super) async fn handle_signal(&mut self, envelope: Envelope) {
        let Envelope { from, signal } = envelope;

        if from == Some(self.participant_id) {
            debug!("Ignoring own '{}' looped back by relay", signal.kind_name());
            return;
        }

        if self.defers_signal(&signal) {
            debug!("Step in flight, deferring '{}'", signal.kind_name());
            self.deferred_signals.push(Envelope { from, signal });
            return;
        }

        if self.local_stream.is_none() {
            debug!("No local media yet, ignoring '{}'", signal.kind_name());
            return;
        }

        match signal {
            SignalMessage::Ready => self.on_peer_ready(from),
            SignalMessage::Offer { sdp } => self.on_offer(sdp),
            SignalMessage::Answer { sdp } => self.on_answer(sdp),

            SignalMessage::Candidate { candidate } => {
                let Some(ctx) = &self.context else {
                    debug!("Candidate without context, dropped");
                    return;
                };
                if let Err(e) = ctx.add_ice_candidate(candidate).await {
                    warn!("{}: rejected remote candidate: {:?}", ctx.id, e);
                    self.notify(CallNotice::CandidateRejected(e.to_string()));
                }
            }

            SignalMessage::Bye => {
                info!("Peer {} left the call", display_from(from));
                self.teardown().await;
                self.notify(CallNotice::PeerLeft);
            }

            SignalMessage::VideoToggle { enabled } => {
                self.on_remote_toggle(MediaKind::Video, enabled)
            }
            SignalMessage::AudioToggle { enabled } => {
                self.on_remote_toggle(MediaKind::Audio, enabled)
            }

            SignalMessage::Error { message } => {
                warn!("Relay reported an error: {}", message);
                self.notify(CallNotice::RelayError(message));
            }

            SignalMessage::Unknown => debug!("Unknown signal type ignored"),
        }
    }

    fn on_remote_toggle(&mut self, kind: MediaKind, enabled: bool) {
        let remote_stream = self.context.as_ref().map(|ctx| &ctx.remote_stream);

        if self.synchronizer.apply_remote(remote_stream, kind, enabled) {
            info!("Peer turned {} {}", kind, if enabled { "on" } else { "off" });
            self.notify(CallNotice::RemoteMediaChanged { kind, enabled });
        }
    }
}

fn display_from(from: Option<ParticipantId>) -> String {
    from.map_or_else(|| "<unknown>".to_owned(), |id| id.to_string())
}
