use async_trait::async_trait;
use tandem_core::{ParticipantId, RawSignal};

/// Трейт, который должна реализовать внешняя система (WebSocket сервер),
/// чтобы хаб мог доставлять сообщения участникам.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Доставить сообщение (уже со штампом `from`) конкретному участнику.
    async fn deliver(&self, participant_id: ParticipantId, message: RawSignal);
}
