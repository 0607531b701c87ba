// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gateway configuration, built once at start-up and never mutated

use std::fmt;
use std::time::Duration;

/// Template value shipped in example env files; treated as "not configured"
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9999;
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com";
pub const DEFAULT_STABILITY_API_BASE: &str = "https://api.stability.ai";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;
/// Largest accepted JSON request body (50 MiB)
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Bearer credential for an upstream provider. Never printed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(Option<String>);

impl ApiKey {
    pub fn new(value: Option<String>) -> Self {
        Self(value)
    }

    /// Present, non-empty and not the template placeholder
    pub fn is_usable(&self) -> bool {
        match self.0.as_deref() {
            Some(key) => !key.is_empty() && key != PLACEHOLDER_API_KEY,
            None => false,
        }
    }

    /// The raw key, only when it is usable
    pub fn expose(&self) -> Option<&str> {
        if self.is_usable() {
            self.0.as_deref()
        } else {
            None
        }
    }
}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self(Some(value.to_string()))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => write!(f, "ApiKey(<redacted>)"),
            None => write!(f, "ApiKey(<unset>)"),
        }
    }
}

/// Credential and base URL for one upstream provider
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_key: ApiKey,
    /// Scheme and host, without the endpoint path
    pub api_base: String,
}

impl UpstreamConfig {
    pub fn new(api_key: ApiKey, api_base: &str) -> Self {
        Self {
            api_key,
            api_base: api_base.trim().trim_end_matches('/').to_string(),
        }
    }
}

/// Immutable process configuration shared by the server and both providers
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub openai: UpstreamConfig,
    pub stability: UpstreamConfig,
    /// Bound on each upstream call, connect through body
    pub upstream_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            openai: UpstreamConfig::new(ApiKey::default(), DEFAULT_OPENAI_API_BASE),
            stability: UpstreamConfig::new(ApiKey::default(), DEFAULT_STABILITY_API_BASE),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl GatewayConfig {
    /// Address the HTTP listener binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.upstream_timeout.is_zero() {
            return Err("Upstream timeout must be greater than 0".to_string());
        }
        for (name, upstream) in [("OpenAI", &self.openai), ("Stability AI", &self.stability)] {
            let base = upstream.api_base.as_str();
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(format!(
                    "{} API base must be an http(s) URL, got '{}'",
                    name, upstream.api_base
                ));
            }
        }
        Ok(())
    }
}
