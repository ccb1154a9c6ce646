use crate::connectivity::{ConnectivityEvent, ConnectivityState};
use crate::engine::{CallEngine, CallNotice, CallState};
use tandem_core::SignalMessage;
use tracing::{debug, info, warn};

impl CallEngine {
    pub(super) async fn handle_connectivity(&mut self, event: ConnectivityEvent) {
        if self.step.is_some() {
            self.deferred_events.push(event);
            return;
        }

        let event_ctx = event.context_id();
        let Some(ctx) = self.context.as_mut().filter(|ctx| ctx.id == event_ctx) else {
            debug!("Dropping event from stale {}", event_ctx);
            return;
        };

        match event {
            ConnectivityEvent::CandidateDiscovered(_, candidate) => {
                ctx.local_candidates.push(candidate.clone());
                self.send(SignalMessage::Candidate { candidate });
            }

            ConnectivityEvent::RemoteTrack(_, track) => {
                self.synchronizer.adopt_remote_track(&track);
                ctx.remote_stream.add_track(track);
                self.collaborators.remote_surface.assign(&ctx.remote_stream);
            }

            ConnectivityEvent::StateChanged(_, state) => match state {
                ConnectivityState::Connected => {
                    if self.state == CallState::Negotiating {
                        info!("{}: connected", ctx.id);
                        self.deadline = None;
                        self.set_state(CallState::Active);
                    }
                }
                ConnectivityState::Failed | ConnectivityState::Disconnected => {
                    warn!("{}: connectivity {:?}", ctx.id, state);
                    self.notify(CallNotice::ConnectivityChanged(state));
                }
                other => debug!("{}: connectivity {:?}", ctx.id, other),
            },
        }
    }
}
