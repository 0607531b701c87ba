// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gateway::GatewayError;
use crate::providers::ErrorKind;

/// JSON error body. `type` and `service` are omitted when they do not apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    Gateway(GatewayError),
    /// Any fault not anticipated by the handlers; the detail is logged, never returned
    Internal(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            ApiError::Gateway(GatewayError::MissingPrompt) => ErrorResponse {
                error: "Prompt is required".to_string(),
                error_type: None,
                service: None,
            },
            ApiError::Gateway(GatewayError::InvalidRequest(msg)) => ErrorResponse {
                error: msg.clone(),
                error_type: None,
                service: None,
            },
            ApiError::Gateway(GatewayError::Generation(e)) => ErrorResponse {
                error: e.message.clone(),
                error_type: Some(e.kind),
                service: Some(e.service.to_string()),
            },
            ApiError::Internal(_) => ErrorResponse {
                error: "Internal server error".to_string(),
                error_type: Some(ErrorKind::UnknownError),
                service: None,
            },
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Gateway(GatewayError::MissingPrompt)
            | ApiError::Gateway(GatewayError::InvalidRequest(_)) => 400,
            ApiError::Gateway(GatewayError::Generation(e)) => e.status,
            ApiError::Internal(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Gateway(e) => write!(f, "{}", e),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        ApiError::Gateway(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Internal(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!("Unhandled error: {}", detail);
        }
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, axum::Json(self.to_response())).into_response()
    }
}
