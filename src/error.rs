use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Could not reach the places provider: {0}")]
    UpstreamTransport(String),

    #[error("Places provider answered with HTTP {0}")]
    UpstreamStatus(u16),

    #[error("Places provider rejected the request with status {status}: {message}")]
    UpstreamProvider { status: String, message: String },

    #[error("Unexpected payload from the places provider: {0}")]
    UpstreamData(String),

    #[error("Place not found: {0}")]
    PlaceNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Nutrition analysis failed: {0}")]
    Analysis(String),
}

impl AppError {
    /// Stable machine readable code sent to clients alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::UpstreamTransport(_) => "upstream_unavailable",
            Self::UpstreamStatus(_) => "upstream_status",
            Self::UpstreamProvider { .. } => "upstream_rejected",
            Self::UpstreamData(_) => "upstream_bad_payload",
            Self::PlaceNotFound(_) => "place_not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Analysis(_) => "analysis_failed",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Configuration(_) | Self::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamTransport(_)
            | Self::UpstreamStatus(_)
            | Self::UpstreamProvider { .. }
            | Self::UpstreamData(_) => StatusCode::BAD_GATEWAY,
            Self::PlaceNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        warn!("Request failed with {}: {}", self.code(), self);

        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (self.status_code(), body).into_response()
    }
}

// The request url carries the api key, so it is dropped before the error is rendered anywhere.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_decode() {
            Self::UpstreamData(err.to_string())
        } else if let Some(status) = err.status() {
            Self::UpstreamStatus(status.as_u16())
        } else {
            Self::UpstreamTransport(err.to_string())
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::UpstreamData(err.to_string())
    }
}
