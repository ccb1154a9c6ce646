use crate::app::AppState;
use crate::error::RelayError;
use crate::hub::HubCommand;
use crate::signaling::{AdmissionSlot, SignalingService};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tandem_core::utils::PARTICIPANT_ID_HEADER;
use tandem_core::{ParticipantId, RawSignal};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Принимает WebSocket и выдает участнику id в заголовке `x-participant-id`.
///
/// Браузерный `WebSocket` заголовки ответа не показывает, поэтому браузерный
/// клиент своего id не узнает. Ретранслятор свои сообщения не возвращает,
/// так что без фильтра по id такой клиент обходится, но правило "offer
/// создает меньший id" ему недоступно: это правило для нативных клиентов
/// (`tandem-client`).
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    // Native clients send no Origin; browsers must match the configured one.
    if let Some(origin) = headers.get(header::ORIGIN) {
        let origin = origin.to_str().unwrap_or_default();
        if !state.config.allows_origin(origin) {
            warn!("Rejected WebSocket upgrade from origin '{}'", origin);
            return Err(RelayError::ForbiddenOrigin {
                origin: origin.to_owned(),
            });
        }
    }

    let slot = state.signaling.try_admit()?;
    let participant_id = ParticipantId::new();
    let id_header = HeaderValue::from_str(&participant_id.to_string())
        .map_err(|e| RelayError::Internal(e.into()))?;

    let service = state.signaling.clone();
    let mut response =
        ws.on_upgrade(move |socket| handle_socket(socket, participant_id, service, slot));
    response
        .headers_mut()
        .insert(PARTICIPANT_ID_HEADER, id_header);

    Ok(response)
}

async fn handle_socket(
    socket: WebSocket,
    participant_id: ParticipantId,
    service: SignalingService,
    _slot: AdmissionSlot,
) {
    info!("New WebSocket connection: {}", participant_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_peer(participant_id, tx);

    if let Err(e) = service
        .hub_cmd_tx
        .send(HubCommand::Connect { participant_id })
        .await
    {
        error!("Relay hub died: {}", e);
        service.remove_peer(&participant_id);
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match RawSignal::parse(text.as_str()) {
                        Ok(message) => {
                            let cmd = HubCommand::Message {
                                participant_id,
                                message,
                            };
                            if let Err(e) = service.hub_cmd_tx.send(cmd).await {
                                error!("Relay hub died: {}", e);
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Invalid frame from {}: {}", participant_id, e);
                            service.send_error(participant_id);
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    let _ = service
        .hub_cmd_tx
        .send(HubCommand::Disconnect { participant_id })
        .await;

    service.remove_peer(&participant_id);
    info!("WebSocket disconnected: {}", participant_id);
}
