//! HTTP gateway for Dostbot.
//!
//! Serves the embedded web chat, a health check, and the v1 session API.
//! Every session shares one [`AssistantContext`]; each session's transcript
//! lives only in memory and is gone when the process exits.
//!
//! Built on Axum for high performance async HTTP.

pub mod api_v1;
pub mod frontend;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use dostbot_agent::AssistantContext;
use dostbot_config::AppConfig;

/// Request body limit for all routes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the full router: health, v1 API and the embedded frontend.
///
/// Layers applied:
/// - Request body size limit (64 KiB)
/// - HTTP trace logging
pub fn build_router(api_state: api_v1::SharedApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(api_state))
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// The assistant context is built by the caller, so the knowledge base is
/// loaded and the prompt rendered exactly once for the whole process.
pub async fn start(
    config: &AppConfig,
    assistant: Arc<AssistantContext>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let api_state = Arc::new(api_v1::ApiV1State::new(
        assistant,
        config.gateway.max_sessions,
    ));
    let app = build_router(api_state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        addr = %addr,
        max_sessions = config.gateway.max_sessions,
        "Gateway listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
