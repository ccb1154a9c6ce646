use crate::connectivity::{ConnectivityContext, ConnectivityEvent, ConnectivityFactory};
use crate::error::CallError;
use crate::media::{DisplaySurface, MediaSource, MediaStream, MediaSynchronizer};
use step_impl::{PendingStep, wait_step};
use std::sync::Arc;
use std::time::Duration;
use tandem_core::utils::DEFAULT_STUN_ADDR;
use tandem_core::{Envelope, IceServerConfig, ParticipantId, SignalMessage};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{info, warn};

mod call_state;
mod handle;
mod handle_command_impl;
mod handle_connectivity_impl;
mod handle_signal_impl;
mod negotiation_impl;
mod step_impl;
mod teardown_impl;

pub use call_state::*;
pub use handle::*;

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const EVENT_CHANNEL_CAPACITY: usize = 128;
const NOTICE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// `None`: согласование может длиться сколько угодно.
    pub negotiation_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_ADDR)],
            negotiation_timeout: None,
        }
    }
}

/// Внешние зависимости движка: захват медиа, транспорт и поверхности отрисовки.
#[derive(Clone)]
pub struct CallCollaborators {
    pub media_source: Arc<dyn MediaSource>,
    pub connectivity: Arc<dyn ConnectivityFactory>,
    pub local_surface: Arc<dyn DisplaySurface>,
    pub remote_surface: Arc<dyn DisplaySurface>,
}

/// Машина состояний согласования одного участника.
///
/// Актор: один цикл обрабатывает команды, входящие сигналы, события транспорта
/// и дедлайн согласования строго по очереди. Долгие вызовы коллабораторов
/// идут отдельным шагом (`PendingStep`), который hangup может прервать.
pub struct CallEngine {
    participant_id: ParticipantId,
    config: EngineConfig,
    collaborators: CallCollaborators,

    state: CallState,
    local_stream: Option<MediaStream>,
    /// Не более одного контекста. `None` в IDLE.
    context: Option<ConnectivityContext>,
    last_context_id: u64,
    synchronizer: MediaSynchronizer,
    deadline: Option<Instant>,

    step: Option<PendingStep>,
    start_reply: Option<oneshot::Sender<Result<(), CallError>>>,
    /// Сигналы и события, пришедшие во время шага. Проигрываются после него.
    deferred_signals: Vec<Envelope>,
    deferred_events: Vec<ConnectivityEvent>,

    signal_tx: mpsc::UnboundedSender<SignalMessage>,
    signal_rx: mpsc::Receiver<Envelope>,
    command_rx: mpsc::Receiver<CallCommand>,
    event_tx: mpsc::Sender<ConnectivityEvent>,
    event_rx: mpsc::Receiver<ConnectivityEvent>,
    state_tx: watch::Sender<CallState>,
    notice_tx: broadcast::Sender<CallNotice>,
}

impl CallEngine {
    pub fn new(
        participant_id: ParticipantId,
        config: EngineConfig,
        collaborators: CallCollaborators,
        signal_tx: mpsc::UnboundedSender<SignalMessage>,
        signal_rx: mpsc::Receiver<Envelope>,
    ) -> (Self, CallHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(CallState::Idle);
        let (notice_tx, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);

        let handle = CallHandle::new(participant_id, command_tx, state_rx, notice_tx.clone());

        let engine = Self {
            participant_id,
            config,
            collaborators,
            state: CallState::Idle,
            local_stream: None,
            context: None,
            last_context_id: 0,
            synchronizer: MediaSynchronizer::new(),
            deadline: None,
            step: None,
            start_reply: None,
            deferred_signals: Vec::new(),
            deferred_events: Vec::new(),
            signal_tx,
            signal_rx,
            command_rx,
            event_tx,
            event_rx,
            state_tx,
            notice_tx,
        };

        (engine, handle)
    }

    /// Создает движок и запускает его цикл в отдельной задаче.
    pub fn spawn(
        participant_id: ParticipantId,
        config: EngineConfig,
        collaborators: CallCollaborators,
        signal_tx: mpsc::UnboundedSender<SignalMessage>,
        signal_rx: mpsc::Receiver<Envelope>,
    ) -> CallHandle {
        let (engine, handle) = Self::new(participant_id, config, collaborators, signal_tx, signal_rx);
        tokio::spawn(engine.run());
        handle
    }

    pub async fn run(mut self) {
        info!("Call engine started for {}", self.participant_id);

        loop {
            let deadline = self.deadline;

            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => {
                        info!("All call handles dropped");
                        self.hang_up().await;
                        break;
                    }
                },

                envelope = self.signal_rx.recv() => match envelope {
                    Some(envelope) => self.handle_signal(envelope).await,
                    None => {
                        warn!("Signaling stream ended, tearing down");
                        self.teardown().await;
                        break;
                    }
                },

                Some(event) = self.event_rx.recv() => self.handle_connectivity(event).await,

                (kind, joined) = wait_step(&mut self.step) => self.on_step_finished(kind, joined).await,

                _ = wait_deadline(deadline) => self.on_negotiation_timeout().await,
            }
        }

        info!("Call engine for {} finished", self.participant_id);
    }

    fn set_state(&mut self, state: CallState) {
        if self.state != state {
            info!("Call state: {} -> {}", self.state, state);
        }
        self.state = state;
        self.state_tx.send_replace(state);
    }

    fn send(&self, msg: SignalMessage) {
        let kind = msg.kind_name();
        if self.signal_tx.send(msg).is_err() {
            warn!("Signaling channel closed, dropped '{}'", kind);
        }
    }

    fn notify(&self, notice: CallNotice) {
        // Нет подписчиков, это не ошибка.
        let _ = self.notice_tx.send(notice);
    }

    fn snapshot(&self) -> EngineSnapshot {
        let ctx = self.context.as_ref();

        EngineSnapshot {
            state: self.state,
            role: ctx.map(|c| c.role),
            context_id: ctx.map(|c| c.id),
            has_local_description: ctx.is_some_and(|c| c.local_description.is_some()),
            has_remote_description: ctx.is_some_and(|c| c.remote_description.is_some()),
            local_candidates: ctx.map_or(0, |c| c.local_candidates.len()),
            attached_local_tracks: ctx.map_or(0, |c| c.local_tracks.len()),
            remote_tracks: ctx.map_or(0, |c| c.remote_stream.len()),
            has_local_media: self.local_stream.is_some(),
            local_flags: self.synchronizer.local(),
            remote_flags: self.synchronizer.remote(),
        }
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
