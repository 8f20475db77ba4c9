// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Jarvis API Server
//!
//! Serves the Whoop relay and the dashboard-facing connector routes from one
//! process. The connector reaches the relay over HTTP, so the relay can also
//! be deployed on its own by pointing `RELAY_URL` elsewhere.

use jarvis::{
    config::Config,
    services::HttpRelay,
    storage::{FileStore, MemoryStore},
    time_utils::SystemClock,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Jarvis API");

    // Persisted token state
    let storage = FileStore::open(&config.token_store_path)?;
    tracing::info!(path = %storage.path().display(), "Token store opened");

    // Relay client
    let relay = HttpRelay::new(config.relay_url.clone(), config.relay_timeout)?;
    tracing::info!(
        relay_url = %config.relay_url,
        timeout_secs = config.relay_timeout.as_secs(),
        "Relay client initialized"
    );

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(relay),
        Arc::new(storage),
        Arc::new(MemoryStore::new()),
        Arc::new(SystemClock),
    )?);

    tracing::info!(
        connected = state.token_store.is_connected(),
        "Whoop connection state loaded"
    );

    // Build router
    let app = jarvis::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jarvis=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
