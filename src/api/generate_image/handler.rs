// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation endpoint handlers

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use tracing::{debug, info};

use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::providers::{GenerationRequest, GenerationResult, ProviderKind};

/// POST /api/ai/generate/openai
pub async fn generate_openai_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let request = parse_body(payload)?;
    generate_with(&state, ProviderKind::OpenAi, request).await
}

/// POST /api/ai/generate/stability
pub async fn generate_stability_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let request = parse_body(payload)?;
    generate_with(&state, ProviderKind::Stability, request).await
}

/// POST /api/ai/generate - dispatch on the `provider` field (default "openai")
///
/// Calls the same gateway path as the provider-specific routes directly; the
/// request is never re-routed through the router.
pub async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let request = parse_body(payload)?;
    let kind = ProviderKind::from_name(request.provider.as_deref());
    debug!(
        "Combined generate route: provider={:?} -> {}",
        request.provider,
        kind.as_str()
    );
    generate_with(&state, kind, request).await
}

async fn generate_with(
    state: &AppState,
    kind: ProviderKind,
    request: GenerationRequest,
) -> Result<Json<GenerationResult>, ApiError> {
    let result = state.gateway.generate(kind, &request).await?;

    info!(
        "Image generated: provider={}, model={}, size={}, {} base64 chars",
        kind.as_str(),
        result.model,
        result.size,
        result.image_base64.len()
    );

    Ok(Json(result))
}

/// A body sent without a JSON content type is treated as an empty request,
/// which then fails the credential or prompt check. Any other undecodable
/// body is an internal fault.
fn parse_body(
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<GenerationRequest, ApiError> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(GenerationRequest::default()),
        Err(rejection) => Err(ApiError::from(rejection)),
    }
}
