// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Provider-agnostic request, result and error types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Output size used when the request does not name one
pub const DEFAULT_SIZE: &str = "1024x1024";

/// Number of prompt characters echoed into the logs
const PROMPT_PREVIEW_CHARS: usize = 40;

/// Image generation request accepted by every generate route
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Provider name for the combined route ("openai" or "stability")
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider: Option<String>,

    /// Text prompt describing the desired image
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub prompt: Option<String>,

    /// Upstream model name (provider-specific default)
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub model: Option<String>,

    /// Output image size, "WIDTHxHEIGHT"
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<String>,

    /// OpenAI only
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub quality: Option<String>,

    /// OpenAI only
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub style: Option<String>,

    /// Stability only; accepted as any JSON value and never forwarded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<Value>,

    /// Stability only; accepted as any JSON value and never forwarded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Value>,
}

/// String fields keep string values only; any other JSON type reads as absent
/// so the credential and prompt checks still decide the response.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl GenerationRequest {
    /// Build a request carrying only a prompt
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    /// The prompt, if present and non-empty
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }

    /// Requested size or the default "1024x1024"
    pub fn size_or_default(&self) -> &str {
        self.size
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SIZE)
    }

    /// Requested model or the given provider default
    pub fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(default)
    }
}

/// Successful generation, identical in shape for every provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    /// Complete base64 encoding of the generated image
    #[serde(rename = "imageBase64")]
    pub image_base64: String,
    /// Prompt as rewritten by the provider (OpenAI only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
    pub model: String,
    pub size: String,
}

impl GenerationResult {
    pub fn new(image_base64: String, model: String, size: String) -> Self {
        Self {
            success: true,
            image_base64,
            revised_prompt: None,
            model,
            size,
        }
    }

    pub fn with_revised_prompt(mut self, revised_prompt: Option<String>) -> Self {
        self.revised_prompt = revised_prompt;
        self
    }
}

/// Machine-readable failure category returned as `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ApiKeyMissing,
    ApiKeyInvalid,
    RateLimitExceeded,
    ContentPolicyViolation,
    UnknownError,
}

impl ErrorKind {
    /// Kind implied by the upstream status alone, if any
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            401 | 403 => Some(ErrorKind::ApiKeyInvalid),
            429 => Some(ErrorKind::RateLimitExceeded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ApiKeyMissing => "API_KEY_MISSING",
            ErrorKind::ApiKeyInvalid => "API_KEY_INVALID",
            ErrorKind::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorKind::ContentPolicyViolation => "CONTENT_POLICY_VIOLATION",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

/// A failed generation, already normalized into the error taxonomy
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{service} generation failed ({status} {}): {message}", .kind.as_str())]
pub struct GenerationError {
    /// HTTP status returned to the caller
    pub status: u16,
    pub kind: ErrorKind,
    /// Human-readable message returned as `error`
    pub message: String,
    /// Display name of the provider ("OpenAI", "Stability AI")
    pub service: &'static str,
}

impl GenerationError {
    pub fn new(
        status: u16,
        kind: ErrorKind,
        message: impl Into<String>,
        service: &'static str,
    ) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            service,
        }
    }

    /// Credential absent or still the template placeholder
    pub fn missing_key(service: &'static str) -> Self {
        Self::new(
            503,
            ErrorKind::ApiKeyMissing,
            format!("{} API key not configured", service),
            service,
        )
    }

    /// No usable upstream response: network failure, timeout, malformed body
    pub fn transport(service: &'static str, message: impl Into<String>) -> Self {
        Self::new(500, ErrorKind::UnknownError, message, service)
    }
}

/// Generic message for an upstream that answered with a non-success status
pub fn rejection_message(status: u16) -> String {
    format!("Request failed with status code {}", status)
}

/// First characters of a prompt for log lines
pub fn prompt_preview(prompt: &str) -> String {
    let preview: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
    format!("{}...", preview)
}

/// Output dimensions parsed from a "WIDTHxHEIGHT" string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    /// Parse a size string like "1024x1024" into an ImageSize
    pub fn parse(s: &str) -> Result<Self, String> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            return Err(format!("Invalid size '{}'; expected WIDTHxHEIGHT", s));
        }
        let width = parts[0]
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("Invalid size '{}'; expected WIDTHxHEIGHT", s))?;
        let height = parts[1]
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("Invalid size '{}'; expected WIDTHxHEIGHT", s))?;
        if width == 0 || height == 0 {
            return Err(format!("Invalid size '{}'; expected WIDTHxHEIGHT", s));
        }
        Ok(Self { width, height })
    }

    /// Aspect ratio string sent to Stability.
    ///
    /// Only the square 1024 size is written as "1:1"; every other size is sent
    /// literally as "WIDTH:HEIGHT" without reducing the fraction.
    pub fn aspect_ratio(&self) -> String {
        if self.width == self.height && self.width == 1024 {
            "1:1".to_string()
        } else {
            format!("{}:{}", self.width, self.height)
        }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
