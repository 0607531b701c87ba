// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image provider trait and the closed set of supported providers

use async_trait::async_trait;

use super::types::{GenerationError, GenerationRequest, GenerationResult};

/// Upstream image generation service
///
/// Implementations translate a provider-agnostic [`GenerationRequest`] into the
/// upstream wire format, make exactly one upstream call and normalize the
/// outcome. Credential and prompt checks happen before `generate` is called.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate a single image
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError>;

    /// Display name used in error bodies and logs
    fn service(&self) -> &'static str;

    /// Whether a usable credential is configured
    fn is_configured(&self) -> bool;

    /// Provider-specific request checks run before any upstream call
    fn validate(&self, _request: &GenerationRequest) -> Result<(), String> {
        Ok(())
    }
}

/// Supported providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Stability,
}

impl ProviderKind {
    /// Resolve the `provider` field of the combined route.
    ///
    /// Anything other than the exact name "stability" selects OpenAI.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("stability") => ProviderKind::Stability,
            _ => ProviderKind::OpenAi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Stability => "stability",
        }
    }
}
