// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::time::Duration;

use crate::config::{
    ApiKey, GatewayConfig, UpstreamConfig, DEFAULT_BODY_LIMIT_BYTES, DEFAULT_HOST,
    DEFAULT_OPENAI_API_BASE, DEFAULT_PORT, DEFAULT_STABILITY_API_BASE,
    DEFAULT_UPSTREAM_TIMEOUT_SECS,
};

/// AI image generation gateway
#[derive(Parser, Debug)]
#[command(name = "ai-gateway")]
#[command(version)]
#[command(about = "Proxies OpenAI and Stability AI image generation behind one API", long_about = None)]
pub struct GatewayArgs {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Stability AI API key
    #[arg(long, env = "STABILITY_API_KEY", hide_env_values = true)]
    pub stability_api_key: Option<String>,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_API_BASE", default_value = DEFAULT_OPENAI_API_BASE)]
    pub openai_api_base: String,

    /// Stability AI API base URL
    #[arg(long, env = "STABILITY_API_BASE", default_value = DEFAULT_STABILITY_API_BASE)]
    pub stability_api_base: String,

    /// Upper bound on each upstream call, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS)]
    pub upstream_timeout_secs: u64,
}

impl GatewayArgs {
    pub fn into_config(self) -> GatewayConfig {
        GatewayConfig {
            host: self.host,
            port: self.port,
            openai: UpstreamConfig::new(ApiKey::new(self.openai_api_key), &self.openai_api_base),
            stability: UpstreamConfig::new(
                ApiKey::new(self.stability_api_key),
                &self.stability_api_base,
            ),
            upstream_timeout: Duration::from_secs(self.upstream_timeout_secs),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}
