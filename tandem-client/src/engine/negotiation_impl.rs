use crate::connectivity::{Connectivity, ConnectivityContext, ContextId};
use crate::engine::step_impl::{Description, StepKind, StepOutcome, describe};
use crate::engine::{CallEngine, CallNotice, CallState, Role};
use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use tandem_core::{ParticipantId, SessionDescription, SignalMessage};
use tokio::time::Instant;
use tracing::{debug, error, info};

impl CallEngine {
    /// Пир готов. Offer создает только участник с меньшим id; второй
    /// повторяет `ready`, чтобы пир, подключившийся позже, его услышал.
    ///
    /// Это отход от правила "offer создает получатель `ready`": при
    /// последовательном подключении offer может прийти и от того, кто
    /// подключился позже, если его id меньше. Зато при одновременном
    /// старте offer всегда ровно один.
    pub(super) fn on_peer_ready(&mut self, from: Option<ParticipantId>) {
        if self.context.is_some() {
            debug!("Context already exists, ignoring ready");
            return;
        }
        if self.state != CallState::Ready {
            debug!("Not ready ({}), ignoring peer ready", self.state);
            return;
        }

        if let Some(peer) = from.filter(|peer| *peer < self.participant_id) {
            info!("Peer {} will offer, re-announcing readiness", peer);
            self.send(SignalMessage::Ready);
            return;
        }

        self.open_context(Role::Offerer, None);
    }

    pub(super) fn on_offer(&mut self, sdp: String) {
        if self.context.is_some() {
            debug!("Context already exists, ignoring offer");
            return;
        }
        if self.state != CallState::Ready {
            debug!("Not ready ({}), ignoring offer", self.state);
            return;
        }

        self.open_context(Role::Answerer, Some(sdp));
    }

    pub(super) fn on_answer(&mut self, sdp: String) {
        let Some(ctx) = self.context.as_ref() else {
            debug!("Answer without context, ignored");
            return;
        };
        if ctx.remote_description.is_some() {
            debug!("{}: remote description already set, ignoring answer", ctx.id);
            return;
        }

        let id = ctx.id;
        let connectivity = ctx.connectivity();
        self.begin_step(StepKind::ApplyAnswer, async move {
            let answer = SessionDescription::answer(sdp);
            let result = connectivity
                .set_remote_description(answer.clone())
                .await
                .map(|_| answer);
            StepOutcome::AnswerApplied { id, result }
        });
    }

    /// Новый контекст создается шагом; дедлайн согласования взводится сразу.
    fn open_context(&mut self, role: Role, remote_offer: Option<String>) {
        self.last_context_id += 1;
        let id = ContextId(self.last_context_id);

        self.deadline = self
            .config
            .negotiation_timeout
            .map(|timeout| Instant::now() + timeout);

        let factory = self.collaborators.connectivity.clone();
        let ice_servers = self.config.ice_servers.clone();
        let event_tx = self.event_tx.clone();

        self.begin_step(StepKind::OpenContext, async move {
            let connectivity = factory
                .create(id, &ice_servers, event_tx)
                .await
                .with_context(|| format!("Failed to create {}", id));

            StepOutcome::ContextOpened {
                id,
                role,
                remote_offer,
                connectivity,
            }
        });
    }

    pub(super) async fn on_context_opened(
        &mut self,
        id: ContextId,
        role: Role,
        remote_offer: Option<String>,
        connectivity: Result<Arc<dyn Connectivity>>,
    ) {
        let connectivity = match connectivity {
            Ok(connectivity) => connectivity,
            Err(e) => return self.negotiation_failed(StepKind::OpenContext, e).await,
        };

        info!("{}: created as {:?}", id, role);
        self.context = Some(ConnectivityContext::new(id, role, connectivity.clone()));

        let Some(stream) = self.local_stream.clone() else {
            let e = anyhow!("Local media released during negotiation");
            return self.negotiation_failed(StepKind::OpenContext, e).await;
        };

        self.begin_step(StepKind::Describe, async move {
            let result = describe(connectivity, role, stream, remote_offer).await;
            StepOutcome::Described { id, result }
        });
    }

    pub(super) async fn on_described(&mut self, id: ContextId, result: Result<Description>) {
        if !self.is_current_context(id) {
            debug!("Description for stale {} dropped", id);
            return;
        }

        let description = match result {
            Ok(description) => description,
            Err(e) => return self.negotiation_failed(StepKind::Describe, e).await,
        };

        let Some(ctx) = self.context.as_mut() else {
            return;
        };
        ctx.local_tracks = description.local_tracks;
        ctx.remote_description = description.remote;
        ctx.local_description = Some(description.local.clone());
        debug!("{}: attached {} local track(s)", ctx.id, ctx.local_tracks.len());

        let role = ctx.role;
        let sdp = description.local.sdp;
        match role {
            Role::Offerer => {
                info!("Sending offer");
                self.send(SignalMessage::Offer { sdp });
            }
            Role::Answerer => {
                info!("Sending answer");
                self.send(SignalMessage::Answer { sdp });
            }
        }

        self.set_state(CallState::Negotiating);
    }

    pub(super) async fn on_answer_applied(
        &mut self,
        id: ContextId,
        result: Result<SessionDescription>,
    ) {
        if !self.is_current_context(id) {
            debug!("Answer for stale {} dropped", id);
            return;
        }

        match result {
            Ok(answer) => {
                if let Some(ctx) = self.context.as_mut() {
                    ctx.remote_description = Some(answer);
                }
                info!("Answer applied, waiting for connectivity");
            }
            Err(e) => self.negotiation_failed(StepKind::ApplyAnswer, e).await,
        }
    }

    fn is_current_context(&self, id: ContextId) -> bool {
        self.context.as_ref().is_some_and(|ctx| ctx.id == id)
    }

    /// Шаг согласования упал: контекст закрывается, локальное медиа остается.
    pub(super) async fn negotiation_failed(&mut self, step: StepKind, e: anyhow::Error) {
        error!("Failed to {}: {:?}", step.name(), e);

        self.deadline = None;
        if let Some(ctx) = self.context.take() {
            ctx.close().await;
        }
        self.collaborators.remote_surface.clear();

        self.set_state(CallState::Ready);
        self.notify(CallNotice::NegotiationFailed(format!("{}: {}", step.name(), e)));
    }
}
