// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generation gateway: shared pre-flight checks and provider dispatch

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::providers::{
    GenerationError, GenerationRequest, GenerationResult, ImageProvider, OpenAiProvider,
    ProviderKind, StabilityProvider,
};

/// Per-provider credential status reported by the health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub openai: bool,
    pub stability: bool,
}

/// Why a generate call did not produce an image
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// No prompt, or an empty one. Never forwarded upstream.
    #[error("Prompt is required")]
    MissingPrompt,

    /// Request rejected by a provider's own checks before any upstream call
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Holds one client per provider; read-only after construction
pub struct Gateway {
    openai: OpenAiProvider,
    stability: StabilityProvider,
}

impl Gateway {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        Ok(Self {
            openai: OpenAiProvider::new(&config.openai, config.upstream_timeout)?,
            stability: StabilityProvider::new(&config.stability, config.upstream_timeout)?,
        })
    }

    pub fn provider(&self, kind: ProviderKind) -> &dyn ImageProvider {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Stability => &self.stability,
        }
    }

    /// Which providers have a usable credential. Makes no upstream calls.
    pub fn health(&self) -> ServiceStatus {
        ServiceStatus {
            openai: self.openai.is_configured(),
            stability: self.stability.is_configured(),
        }
    }

    /// Generate an image with the given provider.
    ///
    /// Checks run in order and stop at the first failure: credential (503),
    /// prompt (400), provider-specific validation (400). Only then is the
    /// upstream called, exactly once.
    pub async fn generate(
        &self,
        kind: ProviderKind,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GatewayError> {
        let provider = self.provider(kind);

        if !provider.is_configured() {
            warn!("{} API key not configured", provider.service());
            return Err(GenerationError::missing_key(provider.service()).into());
        }

        if request.prompt().is_none() {
            debug!("{} request rejected: prompt missing", provider.service());
            return Err(GatewayError::MissingPrompt);
        }

        provider
            .validate(request)
            .map_err(GatewayError::InvalidRequest)?;

        Ok(provider.generate(request).await?)
    }
}
