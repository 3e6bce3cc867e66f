use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tower_governor::{governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer};
use tracing::{info, warn};

use server::config::ServerConfig;
use server::{router, AppState};

/// Synthesis requests are small JSON documents
const MAX_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = dotenv::dotenv();

    async_main().await
}

async fn async_main() -> anyhow::Result<()> {
    info!("Starting copy-synthesis server...");

    // Load configuration from environment
    let config = ServerConfig::from_env();
    info!(
        "Server configuration loaded: port={}, rate_limit={}/min, request_timeout={}s",
        config.port, config.rate_limit_per_minute, config.request_timeout_secs
    );
    if config.synthesis_timeout_secs >= config.request_timeout_secs {
        warn!(
            "SYNTHESIS_TIMEOUT_SECS ({}s) is not below REQUEST_TIMEOUT_SECS ({}s); slow requests will be cut without a 504 body",
            config.synthesis_timeout_secs, config.request_timeout_secs
        );
    }
    match &config.synthesis.resource_root {
        Some(root) => info!("Resolving identifiers against {}", root.display()),
        None => warn!("RESOURCE_ROOT not set, resolving identifiers against the working directory"),
    }
    info!(
        "Companion resources: .{} markup, .{} frames at {} frames/s",
        config.synthesis.markup_suffix, config.synthesis.frame_suffix, config.synthesis.frame_rate_hz
    );

    let state = AppState::new(config.clone());

    // CORS configuration - environment-aware
    let permissive = || {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST, axum::http::Method::OPTIONS])
            .allow_headers(tower_http::cors::Any)
            .allow_credentials(false)
    };
    let cors = if let Some(ref allowed_origins) = config.cors_allowed_origins {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            warn!("CORS_ALLOWED_ORIGINS is empty, falling back to permissive CORS");
            permissive()
        } else {
            info!("CORS configured for {} origin(s)", origins.len());
            CorsLayer::new()
                .allow_origin(tower_http::cors::AllowOrigin::list(origins))
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST, axum::http::Method::OPTIONS])
                .allow_headers(tower_http::cors::Any)
                .allow_credentials(false)
        }
    } else {
        // Development: Allow all origins (with warning)
        warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (development mode)");
        permissive()
    };

    // Rate limiting configuration
    // GlobalKeyExtractor: all requests share one limit, independent of peer address
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second((config.rate_limit_per_minute / 60).max(1) as u64)
            .burst_size(config.rate_limit_per_minute.max(1))
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration"))?,
    );
    info!("Rate limiting: {} requests per minute", config.rate_limit_per_minute);

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors)
        .into_inner();

    let app = router(state)
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware_stack);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different PORT.")
    })?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
