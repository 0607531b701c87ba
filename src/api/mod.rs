// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod generate_image;
pub mod handlers;
pub mod http_server;

pub use errors::{ApiError, ErrorResponse};
pub use generate_image::{generate_handler, generate_openai_handler, generate_stability_handler};
pub use handlers::HealthResponse;
pub use http_server::{router, start_server, AppState};
