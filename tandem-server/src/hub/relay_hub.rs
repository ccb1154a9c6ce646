use crate::hub::{HubCommand, ParticipantRecord};
use crate::signaling::SignalingOutput;
use std::collections::HashMap;
use std::sync::Arc;
use tandem_core::{ParticipantId, RawSignal};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Актор сигнального хаба.
/// Владеет записями участников и рассылает каждое сообщение всем, кроме отправителя.
pub struct RelayHub {
    /// Записи подключенных участников. Ключ есть тогда и только тогда, когда участник подключен.
    records: HashMap<ParticipantId, ParticipantRecord>,

    command_rx: mpsc::Receiver<HubCommand>,

    output: Arc<dyn SignalingOutput>,
}

impl RelayHub {
    pub fn new(command_rx: mpsc::Receiver<HubCommand>, output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            records: HashMap::new(),
            command_rx,
            output,
        }
    }

    pub async fn run(mut self) {
        info!("Relay hub event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Relay hub finished");
    }

    async fn handle_command(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Connect { participant_id } => self.on_connect(participant_id),
            HubCommand::Message {
                participant_id,
                message,
            } => self.on_message(participant_id, message).await,
            HubCommand::Disconnect { participant_id } => self.on_disconnect(participant_id).await,
            HubCommand::Snapshot { reply } => {
                let _ = reply.send(self.records().cloned().collect());
            }
        }
    }

    /// Creates the record with default flags. Nothing is sent to anyone.
    pub fn on_connect(&mut self, participant_id: ParticipantId) {
        info!("Participant connected: {}", participant_id);

        if self
            .records
            .insert(participant_id, ParticipantRecord::new(participant_id))
            .is_some()
        {
            warn!("Participant {} connected twice, record reset", participant_id);
        }
    }

    pub async fn on_message(&mut self, participant_id: ParticipantId, mut message: RawSignal) {
        message.stamp_from(participant_id);

        match self.records.get_mut(&participant_id) {
            Some(record) => {
                if record.apply(&message) {
                    debug!(
                        "Participant {} flags: video={}, audio={}",
                        participant_id,
                        record.video_enabled(),
                        record.audio_enabled()
                    );
                }
            }
            None => warn!("Message from participant without record: {}", participant_id),
        }

        self.broadcast_from(participant_id, message).await;
    }

    /// Removes the record, then tells everyone left that the participant is gone.
    pub async fn on_disconnect(&mut self, participant_id: ParticipantId) {
        info!("Participant disconnected: {}", participant_id);

        if self.records.remove(&participant_id).is_none() {
            warn!("Disconnect for unknown participant {}", participant_id);
            return;
        }

        self.broadcast_from(participant_id, RawSignal::bye(participant_id))
            .await;
    }

    pub fn record(&self, participant_id: &ParticipantId) -> Option<&ParticipantRecord> {
        self.records.get(participant_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &ParticipantRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    async fn broadcast_from(&self, sender: ParticipantId, message: RawSignal) {
        let recipients: Vec<ParticipantId> = self
            .records
            .keys()
            .filter(|id| **id != sender)
            .copied()
            .collect();

        debug!(
            "Relaying '{}' from {} to {} participant(s)",
            message.message_type().unwrap_or("<untyped>"),
            sender,
            recipients.len()
        );

        for recipient in recipients {
            self.output.deliver(recipient, message.clone()).await;
        }
    }
}
