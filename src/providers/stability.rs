// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Stability AI provider (Stable Diffusion 3, multipart in / raw image out)

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::multipart::Form;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::provider::ImageProvider;
use super::types::{
    prompt_preview, rejection_message, ErrorKind, GenerationError, GenerationRequest,
    GenerationResult, ImageSize,
};
use crate::config::{ApiKey, UpstreamConfig};

pub const STABILITY_SERVICE: &str = "Stability AI";
pub const DEFAULT_STABILITY_MODEL: &str = "sd3-medium";
pub const OUTPUT_FORMAT: &str = "png";

const SD3_PATH: &str = "/v2beta/stable-image/generate/sd3";

/// Text fields of the multipart body sent to the SD3 endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityForm {
    pub prompt: String,
    pub output_format: String,
    pub model: String,
    pub aspect_ratio: String,
}

impl StabilityForm {
    pub fn from_request(request: &GenerationRequest, size: ImageSize) -> Self {
        Self {
            prompt: request.prompt().unwrap_or_default().to_string(),
            output_format: OUTPUT_FORMAT.to_string(),
            model: request.model_or(DEFAULT_STABILITY_MODEL).to_string(),
            aspect_ratio: size.aspect_ratio(),
        }
    }

    /// Field name/value pairs in the order they are sent
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("prompt", &self.prompt),
            ("output_format", &self.output_format),
            ("model", &self.model),
            ("aspect_ratio", &self.aspect_ratio),
        ]
    }

    fn to_multipart(&self) -> Form {
        self.fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| {
                form.text(name, value.to_string())
            })
    }
}

/// Normalize a rejected Stability call (non-2xx status) into the error taxonomy.
///
/// Auth and rate-limit rejections get fixed messages; everything else keeps the
/// generic transport message.
pub fn map_stability_failure(status: u16) -> GenerationError {
    match ErrorKind::from_status(status) {
        Some(ErrorKind::ApiKeyInvalid) => GenerationError::new(
            status,
            ErrorKind::ApiKeyInvalid,
            "Invalid or missing API key",
            STABILITY_SERVICE,
        ),
        Some(ErrorKind::RateLimitExceeded) => GenerationError::new(
            status,
            ErrorKind::RateLimitExceeded,
            "Rate limit exceeded",
            STABILITY_SERVICE,
        ),
        _ => GenerationError::new(
            status,
            ErrorKind::UnknownError,
            rejection_message(status),
            STABILITY_SERVICE,
        ),
    }
}

/// Client for the Stability AI SD3 generate endpoint
pub struct StabilityProvider {
    client: Client,
    endpoint: String,
    api_key: ApiKey,
}

impl StabilityProvider {
    pub fn new(config: &UpstreamConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = format!("{}{}", config.api_base, SD3_PATH);
        debug!("Stability provider configured: endpoint={}", endpoint);

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
impl ImageProvider for StabilityProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let api_key = self
            .api_key
            .expose()
            .ok_or_else(|| GenerationError::missing_key(STABILITY_SERVICE))?;

        let size = ImageSize::parse(request.size_or_default())
            .map_err(|e| GenerationError::transport(STABILITY_SERVICE, e))?;

        let form = StabilityForm::from_request(request, size);
        info!("[Stability] {}", prompt_preview(&form.prompt));
        if request.cfg_scale.is_some() || request.steps.is_some() {
            debug!(
                "[Stability] ignoring cfg_scale={:?} steps={:?} (not accepted by SD3)",
                request.cfg_scale, request.steps
            );
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header(header::ACCEPT, "image/*")
            .multipart(form.to_multipart())
            .send()
            .await
            .map_err(|e| {
                warn!("[Stability] Error: {}", e);
                GenerationError::transport(STABILITY_SERVICE, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("[Stability] Error: upstream returned {}: {}", status, text);
            return Err(map_stability_failure(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| {
            warn!("[Stability] Error: unreadable response: {}", e);
            GenerationError::transport(STABILITY_SERVICE, e.to_string())
        })?;

        if bytes.is_empty() {
            return Err(GenerationError::transport(
                STABILITY_SERVICE,
                "empty image body from Stability AI",
            ));
        }

        Ok(GenerationResult::new(
            STANDARD.encode(&bytes),
            form.model,
            size.to_string(),
        ))
    }

    fn service(&self) -> &'static str {
        STABILITY_SERVICE
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_usable()
    }

    fn validate(&self, request: &GenerationRequest) -> Result<(), String> {
        ImageSize::parse(request.size_or_default()).map(|_| ())
    }
}
