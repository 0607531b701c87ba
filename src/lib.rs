// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod providers;
pub mod version;

pub use config::{ApiKey, GatewayConfig, UpstreamConfig};
pub use gateway::{Gateway, GatewayError, ServiceStatus};
pub use providers::{
    ErrorKind, GenerationError, GenerationRequest, GenerationResult, ImageProvider, ProviderKind,
};
