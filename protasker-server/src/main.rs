//! `ProTasker` API server.
//!
//! An axum REST service holding projects and their task boards.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:5000
//! cargo run --bin protasker-server
//!
//! # Run on custom address with a token file
//! cargo run --bin protasker-server -- --bind 127.0.0.1:8080 --config tokens.toml
//! ```

use std::sync::Arc;

use clap::Parser;
use protasker_server::api::{self, AppState};
use protasker_server::config::{ServerCliArgs, ServerConfig};

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let tokens = config.token_table();
    if tokens.is_empty() {
        tracing::warn!("no bearer tokens configured; every API call will be rejected");
    }
    tracing::info!(addr = %config.bind_addr, tokens = tokens.len(), "starting protasker server");

    let state = Arc::new(AppState::new(tokens));

    match api::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "protasker server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            std::process::exit(1);
        }
    }
}
