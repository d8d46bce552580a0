// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CleanSweep API Server
//!
//! Citizen waste-report lifecycle backend: abuse-gated submission,
//! worker cleanup verification, admin approval, and point accrual.

use cleansweep_api::{
    config::Config,
    db::FirestoreDb,
    services::{ApprovalWorkflow, LeaderboardService, NotifyService, ReportLifecycle, SpamGate},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting CleanSweep API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize Cloud Tasks notification dispatch
    let notify = NotifyService::new(&config.gcp_project_id, &config.gcp_region);
    tracing::info!(
        project = %config.gcp_project_id,
        "Notification dispatch initialized"
    );

    let spam_gate = SpamGate::new(db.clone());
    let lifecycle = ReportLifecycle::new(db.clone());
    let approval = ApprovalWorkflow::new(db.clone());
    let leaderboard = LeaderboardService::new(db.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        spam_gate,
        lifecycle,
        approval,
        leaderboard,
        notify,
    });

    // Build router
    let app = cleansweep_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cleansweep_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
