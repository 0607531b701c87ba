// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ai_gateway::{api::start_server, cli::GatewayArgs, version};
use anyhow::Result;
use clap::Parser;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = GatewayArgs::parse();
    let config = args.into_config();

    tracing::info!("Starting {}", version::version_string());

    if let Err(e) = start_server(config).await {
        tracing::error!("Gateway stopped: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
