use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tandem_core::utils::PARTICIPANT_ID_HEADER;
use tandem_core::{Envelope, ParticipantId, SignalMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tracing::{debug, error, info, warn};

const INCOMING_CHANNEL_CAPACITY: usize = 64;

/// Открытое соединение с сигнальным сервером.
pub struct SignalingConnection {
    pub participant_id: ParticipantId,
    pub outgoing: mpsc::UnboundedSender<SignalMessage>,
    pub incoming: mpsc::Receiver<Envelope>,
}

pub struct SignalingClient;

impl SignalingClient {
    /// Подключается к `url`. Id участника сервер отдает в заголовке ответа на upgrade.
    pub async fn connect(url: &str, origin: Option<&str>) -> Result<SignalingConnection> {
        let mut request = url
            .into_client_request()
            .with_context(|| format!("Invalid relay url '{}'", url))?;
        if let Some(origin) = origin {
            request
                .headers_mut()
                .insert("origin", HeaderValue::from_str(origin)?);
        }

        let (stream, response) = tokio_tungstenite::connect_async(request)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        let participant_id: ParticipantId = response
            .headers()
            .get(PARTICIPANT_ID_HEADER)
            .context("Relay did not assign a participant id")?
            .to_str()?
            .parse()?;

        info!("Connected to relay {} as {}", url, participant_id);

        let (mut sink, mut source) = stream.split();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<SignalMessage>();
        let (incoming_tx, incoming) = mpsc::channel(INCOMING_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to encode '{}': {}", msg.kind_name(), e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(json.into())).await {
                    warn!("Relay write failed: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                let text = match frame {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("Relay read failed: {}", e);
                        break;
                    }
                };

                match Envelope::parse(text.as_str()) {
                    Ok(envelope) => {
                        if incoming_tx.send(envelope).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => debug!("Dropping unparsable frame: {}", e),
                }
            }
            info!("Relay connection closed");
        });

        Ok(SignalingConnection {
            participant_id,
            outgoing,
            incoming,
        })
    }
}
