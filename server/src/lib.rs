pub mod config;
pub mod error;
pub mod validation;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use copysynth_core::{AlignmentReport, CopySynthesisAdapter, JsonMarkupFrontEnd, Synthesis, SynthesisRequest};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::validation::validate_synthesis_request;

#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<CopySynthesisAdapter<JsonMarkupFrontEnd>>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let adapter = CopySynthesisAdapter::new(JsonMarkupFrontEnd::default(), config.synthesis.clone());
        Self {
            adapter: Arc::new(adapter),
            config,
        }
    }
}

#[derive(Deserialize)]
pub struct SynthesizeRequest {
    id: String,
    text: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisMode {
    Copy,
    Standard,
}

#[derive(Serialize)]
pub struct SynthesizeResponse {
    mode: SynthesisMode,
    fallback_reason: Option<String>,
    total_frames: usize,
    report: AlignmentReport,
}

/// Routes without the production middleware (rate limiting, timeouts, CORS),
/// which `main` layers on top.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/synthesize", post(synthesize_endpoint));

    Router::new()
        .merge(api.clone())   // root paths
        .nest("/api", api)    // /api prefix
        .layer(axum::middleware::from_fn(add_request_id))
        .with_state(state)
}

// Request ID middleware for tracing
async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    if let Ok(value) = axum::http::HeaderValue::from_str(&request_id) {
        request.headers_mut().insert("x-request-id", value.clone());
        let mut response = next.run(request).await;
        response.headers_mut().insert("x-request-id", value);
        return response;
    }
    next.run(request).await
}

pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn synthesize_endpoint(
    State(state): State<AppState>,
    Json(req): Json<SynthesizeRequest>,
) -> Result<Json<SynthesizeResponse>, ApiError> {
    validate_synthesis_request(&req.id, req.text.as_deref())?;

    let mut request = SynthesisRequest::new(req.id.trim());
    if let Some(text) = req.text {
        request = request.with_text(text);
    }
    info!("Synthesis request received: id={}", request.id);

    // Frame loading blocks (file and network reads), keep it off the runtime
    let adapter = state.adapter.clone();
    let timeout = state.config.synthesis_timeout();
    let result = tokio::time::timeout(
        timeout,
        tokio::task::spawn_blocking(move || adapter.synthesize(&request)),
    )
    .await;

    let synthesis = match result {
        Ok(Ok(synthesis)) => synthesis?,
        Ok(Err(e)) => return Err(ApiError::InternalError(format!("Task join error: {e}"))),
        Err(_) => return Err(ApiError::Timeout(timeout.as_secs())),
    };

    let frame_rate_hz = state.adapter.config().frame_rate_hz;
    let response = match synthesis {
        Synthesis::Copy(copy) => SynthesizeResponse {
            mode: SynthesisMode::Copy,
            fallback_reason: None,
            total_frames: copy.total_frames,
            report: AlignmentReport::from_utterance(&copy.utterance, frame_rate_hz),
        },
        Synthesis::Standard { utterance, reason } => SynthesizeResponse {
            mode: SynthesisMode::Standard,
            fallback_reason: Some(reason.to_string()),
            total_frames: 0,
            report: AlignmentReport::from_utterance(&utterance, frame_rate_hz),
        },
    };

    Ok(Json(response))
}
