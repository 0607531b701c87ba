// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::gateway::ServiceStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// ISO 8601, UTC, millisecond precision
    pub timestamp: String,
    pub services: ServiceStatus,
}

impl HealthResponse {
    pub fn healthy(services: ServiceStatus) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            services,
        }
    }
}
