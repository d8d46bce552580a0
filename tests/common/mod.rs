// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use cleansweep_api::config::Config;
use cleansweep_api::db::FirestoreDb;
use cleansweep_api::middleware::auth::{create_jwt, Role};
use cleansweep_api::routes::create_router;
use cleansweep_api::services::{
    ApprovalWorkflow, LeaderboardService, NotifyService, ReportLifecycle, SpamGate,
};
use cleansweep_api::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Build an app state around the given database connection.
#[allow(dead_code)]
pub fn test_state(db: FirestoreDb) -> Arc<AppState> {
    let config = Config::test_default();

    Arc::new(AppState {
        spam_gate: SpamGate::new(db.clone()),
        lifecycle: ReportLifecycle::new(db.clone()),
        approval: ApprovalWorkflow::new(db.clone()),
        leaderboard: LeaderboardService::new(db.clone()),
        notify: NotifyService::new(&config.gcp_project_id, &config.gcp_region),
        config,
        db,
    })
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state(test_db_offline());
    (create_router(state.clone()), state)
}

/// Create a signed JWT for the given subject and role, using the test
/// config's signing key.
#[allow(dead_code)]
pub fn test_jwt(state: &AppState, subject: &str, role: Role) -> String {
    create_jwt(subject, role, &state.config.jwt_signing_key).expect("Failed to sign test JWT")
}
