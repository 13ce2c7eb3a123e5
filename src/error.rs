use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    // ── Token lifecycle ─────────────────────────────────────────────────
    #[error("Authentication error: {0}")]
    Auth(String),

    // ── Persisted configuration ─────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    // ── Downstream platforms ────────────────────────────────────────────
    #[error("Remote API error ({status}): {body}")]
    RemoteApi { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    // ── Inbound requests ────────────────────────────────────────────────
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl RelayError {
    /// Build a `RemoteApi` error from a non-2xx response, consuming its body.
    pub async fn from_response(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        RelayError::RemoteApi { status, body }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            RelayError::Auth(_) => (StatusCode::BAD_GATEWAY, "auth_error"),
            RelayError::Config(_) => (StatusCode::PRECONDITION_FAILED, "config_error"),
            RelayError::RemoteApi { .. } => (StatusCode::BAD_GATEWAY, "remote_api_error"),
            RelayError::Transport(_) => (StatusCode::BAD_GATEWAY, "transport_error"),
            RelayError::Decode(_) => (StatusCode::BAD_GATEWAY, "decode_error"),
            RelayError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };

        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}
