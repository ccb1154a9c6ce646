use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tandem_core::utils::GENERIC_FAILURE_MESSAGE;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Relay is full ({max} participants)")]
    RelayFull { max: usize },

    #[error("Origin '{origin}' is not allowed")]
    ForbiddenOrigin { origin: String },

    #[error("Relay hub is not running")]
    HubUnavailable,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    error: String,
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RelayFull { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::ForbiddenOrigin { .. } => StatusCode::FORBIDDEN,
            Self::HubUnavailable | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the log.
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Relay fault: {}", self);
            GENERIC_FAILURE_MESSAGE.to_owned()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            code: status.as_u16(),
            error,
        };
        (status, Json(body)).into_response()
    }
}
