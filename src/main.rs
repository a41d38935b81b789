// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WellVantage API Server
//!
//! Google sign-in, trainer availability with slot booking, and the client
//! and workout plan directories used by the mobile app.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wellvantage_api::{
    config::{Config, StorageBackend},
    db::{Database, FirestoreDb, MemoryDb},
    services::{AvailabilityService, BookingService, GoogleIdTokenVerifier, IdentityResolver},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        storage = ?config.storage_backend,
        "Starting WellVantage API"
    );

    let db = match config.storage_backend {
        StorageBackend::Firestore => {
            Database::Firestore(FirestoreDb::new(&config.gcp_project_id).await?)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Database::Memory(MemoryDb::new())
        }
    };

    let verifier = Arc::new(GoogleIdTokenVerifier::new(&config)?);
    tracing::info!(
        audiences = config.google_client_ids.len(),
        "Google ID token verifier initialized"
    );

    let identity = IdentityResolver::new(
        verifier,
        db.clone(),
        config.jwt_signing_key.clone(),
        config.session_ttl_days,
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        availability: AvailabilityService::new(db.clone()),
        booking: BookingService::new(db.clone()),
        identity,
        db,
    });

    // Build router
    let app = wellvantage_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
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
                .add_directive("wellvantage_api=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
