// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI Images API provider (DALL·E)

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::provider::ImageProvider;
use super::types::{
    prompt_preview, rejection_message, ErrorKind, GenerationError, GenerationRequest,
    GenerationResult,
};
use crate::config::{ApiKey, UpstreamConfig};

pub const OPENAI_SERVICE: &str = "OpenAI";
pub const DEFAULT_OPENAI_MODEL: &str = "dall-e-3";
pub const DEFAULT_QUALITY: &str = "standard";
pub const DEFAULT_STYLE: &str = "vivid";

/// Models whose name contains this marker accept `quality` and `style`
const DALL_E_3_MARKER: &str = "dall-e-3";
const GENERATIONS_PATH: &str = "/v1/images/generations";

/// JSON body sent to the OpenAI generations endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAiImageRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub response_format: String,
}

impl OpenAiImageRequest {
    pub fn from_request(request: &GenerationRequest) -> Self {
        let model = request.model_or(DEFAULT_OPENAI_MODEL).to_string();
        let supports_style = model.contains(DALL_E_3_MARKER);

        Self {
            prompt: request.prompt().unwrap_or_default().to_string(),
            n: 1,
            size: request.size_or_default().to_string(),
            quality: supports_style.then(|| {
                request
                    .quality
                    .clone()
                    .unwrap_or_else(|| DEFAULT_QUALITY.to_string())
            }),
            style: supports_style.then(|| {
                request
                    .style
                    .clone()
                    .unwrap_or_else(|| DEFAULT_STYLE.to_string())
            }),
            response_format: "b64_json".to_string(),
            model,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiImageResponse {
    data: Vec<OpenAiImageData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageData {
    b64_json: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    error: Option<OpenAiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Normalize a rejected OpenAI call (non-2xx status) into the error taxonomy
pub fn map_openai_failure(status: u16, body: &str) -> GenerationError {
    let detail = serde_json::from_str::<OpenAiErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error);

    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| rejection_message(status));

    let content_policy = detail
        .as_ref()
        .and_then(|d| d.kind.as_deref())
        .map(|t| t.contains("content_policy"))
        .unwrap_or(false);

    let kind = match ErrorKind::from_status(status) {
        Some(kind) => kind,
        None if content_policy => ErrorKind::ContentPolicyViolation,
        None => ErrorKind::UnknownError,
    };

    GenerationError::new(status, kind, message, OPENAI_SERVICE)
}

/// Client for the OpenAI image generations endpoint
pub struct OpenAiProvider {
    client: Client,
    endpoint: String,
    api_key: ApiKey,
}

impl OpenAiProvider {
    pub fn new(config: &UpstreamConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = format!("{}{}", config.api_base, GENERATIONS_PATH);
        debug!("OpenAI provider configured: endpoint={}", endpoint);

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageProvider for OpenAiProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let api_key = self
            .api_key
            .expose()
            .ok_or_else(|| GenerationError::missing_key(OPENAI_SERVICE))?;

        let body = OpenAiImageRequest::from_request(request);
        info!("[OpenAI] {}", prompt_preview(&body.prompt));

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("[OpenAI] Error: {}", e);
                GenerationError::transport(OPENAI_SERVICE, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("[OpenAI] Error: upstream returned {}: {}", status, text);
            return Err(map_openai_failure(status.as_u16(), &text));
        }

        let payload: OpenAiImageResponse = response.json().await.map_err(|e| {
            warn!("[OpenAI] Error: unreadable response: {}", e);
            GenerationError::transport(OPENAI_SERVICE, e.to_string())
        })?;

        let first = payload.data.into_iter().next().ok_or_else(|| {
            GenerationError::transport(OPENAI_SERVICE, "empty response from OpenAI")
        })?;

        let image_base64 = first
            .b64_json
            .filter(|b64| !b64.is_empty())
            .ok_or_else(|| GenerationError::transport(OPENAI_SERVICE, "no b64_json in response"))?;

        if STANDARD.decode(image_base64.as_bytes()).is_err() {
            warn!("[OpenAI] Error: b64_json is not valid base64");
            return Err(GenerationError::transport(
                OPENAI_SERVICE,
                "invalid base64 image data in response",
            ));
        }

        Ok(GenerationResult::new(image_base64, body.model, body.size)
            .with_revised_prompt(first.revised_prompt))
    }

    fn service(&self) -> &'static str {
        OPENAI_SERVICE
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_usable()
    }
}
