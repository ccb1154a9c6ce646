use crate::engine::step_impl::{StepKind, StepOutcome};
use crate::engine::{CallCommand, CallEngine, CallNotice, CallState};
use crate::error::{CallError, MediaError};
use crate::media::MediaStream;
use tandem_core::{MediaKind, SignalMessage};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

impl CallEngine {
    pub(super) async fn handle_command(&mut self, cmd: CallCommand) {
        match cmd {
            CallCommand::StartCall { reply } => self.start_call(reply),
            CallCommand::Hangup { reply } => {
                self.hang_up().await;
                let _ = reply.send(());
            }
            CallCommand::SetMedia {
                kind,
                enabled,
                reply,
            } => {
                let flag = self.set_local_media(kind, enabled);
                let _ = reply.send(flag);
            }
            CallCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    /// Захват медиа идет отдельным шагом; ответ вызывающему уходит,
    /// когда шаг завершится или будет отменен.
    fn start_call(&mut self, reply: oneshot::Sender<Result<(), CallError>>) {
        if self.state != CallState::Idle {
            let _ = reply.send(Err(CallError::InvalidState { state: self.state }));
            return;
        }

        self.set_state(CallState::AwaitingLocalMedia);
        self.start_reply = Some(reply);

        let source = self.collaborators.media_source.clone();
        self.begin_step(StepKind::LocalMedia, async move {
            StepOutcome::LocalMedia(source.acquire().await)
        });
    }

    pub(super) fn on_local_media(&mut self, result: Result<MediaStream, MediaError>) {
        let outcome = match result {
            Ok(stream) => {
                info!("Local media acquired: {} track(s)", stream.len());
                self.collaborators.local_surface.assign(&stream);
                self.local_stream = Some(stream);

                self.set_state(CallState::Ready);
                self.send(SignalMessage::Ready);
                Ok(())
            }
            Err(e) => {
                warn!("Local media unavailable: {}", e);
                self.set_state(CallState::Idle);
                self.notify(CallNotice::MediaAccessFailed(e.to_string()));
                Err(e.into())
            }
        };

        if let Some(reply) = self.start_reply.take() {
            let _ = reply.send(outcome);
        }
    }

    /// Локальный hangup: `bye` пиру, затем разбор всего состояния.
    pub(super) async fn hang_up(&mut self) {
        if self.local_stream.is_some() {
            self.send(SignalMessage::Bye);
        }
        self.teardown().await;
    }

    fn set_local_media(&mut self, kind: MediaKind, enabled: Option<bool>) -> bool {
        let current = self.synchronizer.local().get(kind);
        let target = enabled.unwrap_or(!current);

        let Some(stream) = &self.local_stream else {
            debug!("No local media, {} intent ignored", kind);
            return current;
        };

        if let Some(msg) = self.synchronizer.set_local(stream, kind, target) {
            self.send(msg);
        }

        self.synchronizer.local().get(kind)
    }
}
