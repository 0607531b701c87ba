// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::{any::Any, sync::Arc};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as CorsAny, CorsLayer};
use tower_http::trace::TraceLayer;

use super::errors::ApiError;
use super::generate_image::{
    generate_handler, generate_openai_handler, generate_stability_handler,
};
use super::handlers::HealthResponse;
use crate::config::GatewayConfig;
use crate::gateway::Gateway;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

/// Build the gateway router with CORS, request tracing, body limit and panic
/// catching applied to every route
pub fn router(gateway: Arc<Gateway>, body_limit_bytes: usize) -> Router {
    let state = AppState { gateway };

    let routes = Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Generation endpoints
        .route("/api/ai/generate", post(generate_handler))
        .route("/api/ai/generate/openai", post(generate_openai_handler))
        .route("/api/ai/generate/stability", post(generate_stability_handler))
        .with_state(state);

    with_layers(routes, body_limit_bytes)
}

fn with_layers(routes: Router, body_limit_bytes: usize) -> Router {
    routes
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(CorsAny)
                .allow_methods(CorsAny)
                .allow_headers(CorsAny),
        )
}

pub async fn start_server(config: GatewayConfig) -> anyhow::Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;

    let gateway = Arc::new(Gateway::new(&config)?);
    let services = gateway.health();
    tracing::info!(
        "Providers configured: openai={}, stability={}",
        services.openai,
        services.stability
    );

    let app = router(gateway, config.body_limit_bytes);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("AI Gateway :{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse::healthy(state.gateway.health()))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    ApiError::Internal(detail).into_response()
}
