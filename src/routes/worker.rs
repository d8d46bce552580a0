// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Worker-facing routes: assignment queue, cleanup start/complete.

use crate::error::Result;
use crate::middleware::auth::{AuthPrincipal, Role};
use crate::routes::reports::ReportResponse;
use crate::services::lifecycle::{CompleteCleanup, StartCleanup};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Worker routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/worker/queue", get(get_queue))
        .route("/api/worker/reports/{id}/start", post(start_cleanup))
        .route("/api/worker/reports/{id}/complete", post(complete_cleanup))
}

// ─── Worker Queue ────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkerQueueResponse {
    pub reports: Vec<ReportResponse>,
}

/// Reports currently assigned to the calling worker.
async fn get_queue(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
) -> Result<Json<WorkerQueueResponse>> {
    let worker_id = principal.require_role(Role::Worker)?;

    let reports = state.db.get_reports_for_worker(worker_id).await?;

    Ok(Json(WorkerQueueResponse {
        reports: reports.into_iter().map(ReportResponse::from).collect(),
    }))
}

// ─── Cleanup Start ───────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct StartCleanupRequest {
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be in [-90, 90]"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be in [-180, 180]"))]
    pub lng: f64,
    #[validate(length(min = 1, max = 2048, message = "before_photo_url is required"))]
    pub before_photo_url: String,
    /// Client-supplied capture timestamp of the before photo
    pub captured_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StartCleanupResponse {
    pub report: ReportResponse,
    pub verification_id: String,
}

/// Start cleanup on an assigned report (proximity-checked).
async fn start_cleanup(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(report_id): Path<String>,
    Json(payload): Json<StartCleanupRequest>,
) -> Result<Json<StartCleanupResponse>> {
    let worker_id = principal.require_role(Role::Worker)?;
    payload
        .validate()
        .map_err(|e| crate::error::AppError::Validation(e.to_string()))?;

    let (report, verification, change) = state
        .lifecycle
        .start_work(
            &report_id,
            worker_id,
            StartCleanup {
                worker_lat: payload.lat,
                worker_lng: payload.lng,
                before_photo_url: payload.before_photo_url,
                captured_at: payload.captured_at,
            },
        )
        .await?;

    state.notify.emit(&state.config.notify_service_url, change).await;

    Ok(Json(StartCleanupResponse {
        report: ReportResponse::from(report),
        verification_id: verification.id,
    }))
}

// ─── Cleanup Completion ──────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CompleteCleanupRequest {
    #[validate(length(min = 1, max = 2048, message = "after_photo_url is required"))]
    pub after_photo_url: String,
    /// Client-supplied capture timestamp of the after photo
    pub captured_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompleteCleanupResponse {
    pub report: ReportResponse,
    pub verification_id: String,
    pub time_spent_minutes: Option<u32>,
}

/// Complete cleanup on an in-progress report (timing-checked).
async fn complete_cleanup(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(report_id): Path<String>,
    Json(payload): Json<CompleteCleanupRequest>,
) -> Result<Json<CompleteCleanupResponse>> {
    let worker_id = principal.require_role(Role::Worker)?;
    payload
        .validate()
        .map_err(|e| crate::error::AppError::Validation(e.to_string()))?;

    let (report, verification, change) = state
        .lifecycle
        .complete_work(
            &report_id,
            worker_id,
            CompleteCleanup {
                after_photo_url: payload.after_photo_url,
                captured_at: payload.captured_at,
            },
        )
        .await?;

    state.notify.emit(&state.config.notify_service_url, change).await;

    Ok(Json(CompleteCleanupResponse {
        report: ReportResponse::from(report),
        verification_id: verification.id,
        time_spent_minutes: verification.time_spent_minutes,
    }))
}
