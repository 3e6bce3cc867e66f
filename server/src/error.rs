use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use copysynth_core::FrontEndError;
use serde::Serialize;
use thiserror::Error;

/// API Error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Synthesis error: {0}")]
    SynthesisError(#[from] FrontEndError),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

/// Error response structure
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::SynthesisError(e) => {
                tracing::error!("Synthesis error: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, format!("Synthesis error: {}", e))
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ApiError::Timeout(secs) => {
                tracing::warn!("Synthesis timed out after {}s", secs);
                (StatusCode::GATEWAY_TIMEOUT, format!("Request timed out after {}s", secs))
            }
        };

        let body = Json(ErrorResponse {
            error: error_message.clone(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
