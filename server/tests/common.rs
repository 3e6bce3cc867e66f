//! Common utilities for integration tests

use std::path::PathBuf;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use copysynth_core::CopySynthesisConfig;
use server::{config::ServerConfig, router, AppState};
use tower::ServiceExt;

/// Fixture corpus shipped with the core crate
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../copysynth_core/tests/fixtures")
}

/// Server configuration serving the fixture corpus
pub fn test_config() -> ServerConfig {
    ServerConfig {
        synthesis: CopySynthesisConfig {
            resource_root: Some(fixtures_dir()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Create a test app instance serving the fixture corpus
pub fn create_test_app() -> Router {
    router(AppState::new(test_config()))
}

/// POST a JSON body and return status plus decoded JSON response
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
