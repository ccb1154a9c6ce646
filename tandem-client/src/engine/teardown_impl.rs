use crate::engine::{CallEngine, CallNotice, CallState};
use tandem_core::SignalMessage;
use tracing::{info, warn};

impl CallEngine {
    /// Возврат в IDLE из любого состояния: транспорт закрыт, локальные треки
    /// остановлены, поверхности очищены, флаги медиа сброшены.
    pub(super) async fn teardown(&mut self) {
        self.cancel_step();
        self.deadline = None;

        if let Some(ctx) = self.context.take() {
            ctx.close().await;
        }

        if let Some(stream) = self.local_stream.take() {
            stream.stop_all();
        }

        self.collaborators.local_surface.clear();
        self.collaborators.remote_surface.clear();
        self.synchronizer.reset();

        if self.state != CallState::Idle {
            info!("Call torn down");
        }
        self.set_state(CallState::Idle);
    }

    pub(super) async fn on_negotiation_timeout(&mut self) {
        self.deadline = None;

        // Дедлайн взводится при открытии контекста, так что READY здесь
        // означает незавершенный шаг согласования.
        if !matches!(self.state, CallState::Ready | CallState::Negotiating) {
            return;
        }

        warn!("Negotiation timed out, hanging up");
        self.send(SignalMessage::Bye);
        self.teardown().await;
        self.notify(CallNotice::NegotiationTimedOut);
    }
}
