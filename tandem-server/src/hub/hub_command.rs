use crate::hub::ParticipantRecord;
use tandem_core::{ParticipantId, RawSignal};
use tokio::sync::oneshot;

/// Команды, поступающие в хаб от WebSocket-соединений.
#[derive(Debug)]
pub enum HubCommand {
    /// Новый участник подключился.
    Connect { participant_id: ParticipantId },

    /// Сигнальное сообщение от участника, которое нужно разослать остальным.
    Message {
        participant_id: ParticipantId,
        message: RawSignal,
    },

    /// WebSocket соединение разорвано.
    Disconnect { participant_id: ParticipantId },

    Snapshot {
        reply: oneshot::Sender<Vec<ParticipantRecord>>,
    },
}
