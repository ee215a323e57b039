// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SmartCoach API Server
//!
//! Syncs workouts from Wahoo, aggregates training load, and serves the
//! AI coach endpoints.

use smartcoach::{
    config::{Config, StorageBackend},
    db::{FirestoreDb, MemoryDb},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.storage_backend,
        "Starting SmartCoach API"
    );

    if config.llm_api_key.is_none() {
        tracing::warn!("LLM_API_KEY not set, coach endpoints will return errors");
    }

    let addr = format!("0.0.0.0:{}", config.port);

    // Build shared state on the configured datastore
    let state = match config.storage_backend {
        StorageBackend::Firestore => {
            let db = FirestoreDb::new(&config.gcp_project_id).await?;
            AppState::new(config, Arc::new(db))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            AppState::new(config, Arc::new(MemoryDb::new()))
        }
    };

    // Build router
    let app = smartcoach::routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("smartcoach=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();

    Ok(())
}
