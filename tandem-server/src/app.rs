use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::hub::{ParticipantRecord, RelayHub};
use crate::signaling::{SignalingService, ws_handler};
use anyhow::Context;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::any::Any;
use std::sync::Arc;
use tandem_core::utils::GENERIC_FAILURE_MESSAGE;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const HUB_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct AppState {
    pub signaling: SignalingService,
    pub config: Arc<RelayConfig>,
}

/// Поднимает актор хаба и возвращает состояние для роутера.
pub fn start_relay(config: RelayConfig) -> AppState {
    let (hub_tx, hub_rx) = mpsc::channel(HUB_CHANNEL_CAPACITY);
    let signaling = SignalingService::new(hub_tx, config.max_participants);

    let hub = RelayHub::new(hub_rx, Arc::new(signaling.clone()));
    tokio::spawn(hub.run());

    AppState {
        signaling,
        config: Arc::new(config),
    }
}

pub fn build_router(state: AppState) -> Result<Router, RelayError> {
    let origin = HeaderValue::from_str(&state.config.allowed_origin)
        .with_context(|| format!("Invalid allowed origin '{}'", state.config.allowed_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST]);

    Ok(Router::new()
        .route("/ws", get(ws_handler))
        .route("/participants", get(list_participants))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

pub async fn serve(config: RelayConfig) -> anyhow::Result<()> {
    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve_with_listener(listener, config).await
}

pub async fn serve_with_listener(listener: TcpListener, config: RelayConfig) -> anyhow::Result<()> {
    let state = start_relay(config);
    let app = build_router(state)?;

    info!("Signaling relay listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn list_participants(
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipantRecord>>, RelayError> {
    state.signaling.participants().await.map(Json)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", details);

    (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE_MESSAGE).into_response()
}
