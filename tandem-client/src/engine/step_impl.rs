use crate::connectivity::{Connectivity, ContextId};
use crate::engine::{CallEngine, Role};
use crate::error::{CallError, MediaError};
use crate::media::{MediaStream, MediaTrack};
use anyhow::{Result, anyhow};
use std::future::Future;
use std::sync::Arc;
use tandem_core::{SessionDescription, SignalMessage};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StepKind {
    LocalMedia,
    OpenContext,
    Describe,
    ApplyAnswer,
}

impl StepKind {
    pub(super) fn name(self) -> &'static str {
        match self {
            StepKind::LocalMedia => "acquire local media",
            StepKind::OpenContext => "create connectivity",
            StepKind::Describe => "describe session",
            StepKind::ApplyAnswer => "apply answer",
        }
    }
}

/// Долгий вызов коллабораторов, вынесенный из главного цикла.
/// Пока он идет, движок принимает команды, `bye` и дедлайн; hangup его отменяет.
pub(super) struct PendingStep {
    pub(super) kind: StepKind,
    pub(super) task: JoinHandle<StepOutcome>,
}

impl PendingStep {
    /// Во время согласования `bye` обрабатывается сразу, остальное ждет
    /// результата шага. Во время захвата медиа ничего не откладывается:
    /// без локального медиа сигналы игнорируются.
    fn defers(&self, signal: &SignalMessage) -> bool {
        self.kind != StepKind::LocalMedia && !matches!(signal, SignalMessage::Bye)
    }
}

pub(super) enum StepOutcome {
    LocalMedia(Result<MediaStream, MediaError>),
    ContextOpened {
        id: ContextId,
        role: Role,
        remote_offer: Option<String>,
        connectivity: Result<Arc<dyn Connectivity>>,
    },
    Described {
        id: ContextId,
        result: Result<Description>,
    },
    AnswerApplied {
        id: ContextId,
        result: Result<SessionDescription>,
    },
}

/// Итог описания сессии: прикрепленные треки и обе стороны SDP.
pub(super) struct Description {
    pub(super) local_tracks: Vec<Arc<MediaTrack>>,
    pub(super) remote: Option<SessionDescription>,
    pub(super) local: SessionDescription,
}

impl CallEngine {
    pub(super) fn begin_step<F>(&mut self, kind: StepKind, step: F)
    where
        F: Future<Output = StepOutcome> + Send + 'static,
    {
        debug!("Step started: {}", kind.name());
        self.step = Some(PendingStep {
            kind,
            task: tokio::spawn(step),
        });
    }

    pub(super) fn defers_signal(&self, signal: &SignalMessage) -> bool {
        self.step.as_ref().is_some_and(|step| step.defers(signal))
    }

    pub(super) async fn on_step_finished(
        &mut self,
        kind: StepKind,
        joined: Result<StepOutcome, JoinError>,
    ) {
        self.step = None;

        match joined {
            Ok(StepOutcome::LocalMedia(result)) => self.on_local_media(result),
            Ok(StepOutcome::ContextOpened {
                id,
                role,
                remote_offer,
                connectivity,
            }) => {
                self.on_context_opened(id, role, remote_offer, connectivity)
                    .await
            }
            Ok(StepOutcome::Described { id, result }) => self.on_described(id, result).await,
            Ok(StepOutcome::AnswerApplied { id, result }) => {
                self.on_answer_applied(id, result).await
            }
            Err(e) => {
                error!("Step '{}' crashed: {}", kind.name(), e);
                match kind {
                    StepKind::LocalMedia => {
                        self.on_local_media(Err(MediaError::Other(e.to_string())))
                    }
                    _ => self.negotiation_failed(kind, anyhow!("task crashed: {}", e)).await,
                }
            }
        }

        self.flush_deferred().await;
    }

    /// Прерывает незавершенный шаг. Отложенное ему больше не нужно.
    pub(super) fn cancel_step(&mut self) {
        if let Some(step) = self.step.take() {
            debug!("Cancelling '{}'", step.kind.name());
            match step.kind {
                // Транспорт мог уже появиться: его закрывают, а не бросают.
                StepKind::OpenContext => {
                    tokio::spawn(close_orphan(step.task));
                }
                _ => step.task.abort(),
            }
        }
        self.deferred_signals.clear();
        self.deferred_events.clear();

        if let Some(reply) = self.start_reply.take() {
            let _ = reply.send(Err(CallError::Cancelled));
        }
    }

    /// Проигрывает отложенное в исходном порядке. Если по пути начался
    /// новый шаг, остаток снова откладывается.
    async fn flush_deferred(&mut self) {
        let events = std::mem::take(&mut self.deferred_events);
        for event in events {
            self.handle_connectivity(event).await;
        }

        let signals = std::mem::take(&mut self.deferred_signals);
        for envelope in signals {
            self.handle_signal(envelope).await;
        }
    }
}

/// Прикрепляет локальные треки, для answerer применяет offer и выставляет
/// собственное описание.
pub(super) async fn describe(
    connectivity: Arc<dyn Connectivity>,
    role: Role,
    stream: MediaStream,
    remote_offer: Option<String>,
) -> Result<Description> {
    let mut local_tracks = Vec::with_capacity(stream.len());
    for track in stream.tracks() {
        connectivity.add_track(track.clone(), stream.id()).await?;
        local_tracks.push(track.clone());
    }

    let remote = match remote_offer {
        Some(sdp) => {
            let offer = SessionDescription::offer(sdp);
            connectivity.set_remote_description(offer.clone()).await?;
            Some(offer)
        }
        None => None,
    };

    let local = match role {
        Role::Offerer => connectivity.create_offer().await?,
        Role::Answerer => connectivity.create_answer().await?,
    };
    connectivity.set_local_description(local.clone()).await?;

    Ok(Description {
        local_tracks,
        remote,
        local,
    })
}

async fn close_orphan(task: JoinHandle<StepOutcome>) {
    if let Ok(StepOutcome::ContextOpened {
        id,
        connectivity: Ok(connectivity),
        ..
    }) = task.await
    {
        if let Err(e) = connectivity.close().await {
            warn!("{}: close failed: {:?}", id, e);
        }
        debug!("{}: closed after cancellation", id);
    }
}

pub(super) async fn wait_step(
    step: &mut Option<PendingStep>,
) -> (StepKind, Result<StepOutcome, JoinError>) {
    match step {
        Some(step) => (step.kind, (&mut step.task).await),
        None => std::future::pending().await,
    }
}
