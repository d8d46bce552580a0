// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes: assignment, verification review, worker management.

use crate::error::{AppError, Result};
use crate::middleware::auth::{AuthPrincipal, Role};
use crate::models::{ApprovalStatus, PointsBreakdown, ReportStatus, Verification, Worker};
use crate::routes::reports::ReportResponse;
use crate::services::generate_id;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Admin routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/reports", get(list_reports))
        .route("/api/admin/reports/{id}/assign", post(assign_report))
        .route("/api/admin/verifications", get(list_verifications))
        .route(
            "/api/admin/verifications/{id}/approve",
            post(approve_verification),
        )
        .route(
            "/api/admin/verifications/{id}/reject",
            post(reject_verification),
        )
        .route("/api/admin/workers", get(list_workers).post(create_worker))
}

// ─── Report Triage ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListReportsQuery {
    pub status: Option<ReportStatus>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ListReportsResponse {
    pub reports: Vec<ReportResponse>,
}

/// List reports, optionally filtered by status. Defaults to OPEN so the
/// triage view loads the assignment backlog.
async fn list_reports(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<ListReportsResponse>> {
    principal.require_role(Role::Admin)?;

    let status = query.status.unwrap_or(ReportStatus::Open);
    let reports = state.db.get_reports_by_status(status).await?;

    Ok(Json(ListReportsResponse {
        reports: reports.into_iter().map(ReportResponse::from).collect(),
    }))
}

#[derive(Deserialize, Validate)]
pub struct AssignReportRequest {
    #[validate(length(min = 1, message = "worker_id is required"))]
    pub worker_id: String,
}

/// Assign an open report to a worker.
async fn assign_report(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(report_id): Path<String>,
    Json(payload): Json<AssignReportRequest>,
) -> Result<Json<ReportResponse>> {
    let admin_id = principal.require_role(Role::Admin)?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (report, change) = state
        .lifecycle
        .assign(&report_id, &payload.worker_id, admin_id)
        .await?;

    state.notify.emit(&state.config.notify_service_url, change).await;

    Ok(Json(ReportResponse::from(report)))
}

// ─── Verification Review ─────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct VerificationResponse {
    pub id: String,
    pub report_id: String,
    pub worker_id: String,
    pub before_photo_url: String,
    pub after_photo_url: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub time_spent_minutes: Option<u32>,
    pub approval_status: ApprovalStatus,
}

impl From<Verification> for VerificationResponse {
    fn from(v: Verification) -> Self {
        Self {
            id: v.id,
            report_id: v.report_id,
            worker_id: v.worker_id,
            before_photo_url: v.before_photo_url,
            after_photo_url: v.after_photo_url,
            started_at: format_utc_rfc3339(v.started_at),
            completed_at: v.completed_at.map(format_utc_rfc3339),
            time_spent_minutes: v.time_spent_minutes,
            approval_status: v.approval_status,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ListVerificationsResponse {
    pub verifications: Vec<VerificationResponse>,
}

/// Pending verifications, oldest first.
async fn list_verifications(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
) -> Result<Json<ListVerificationsResponse>> {
    principal.require_role(Role::Admin)?;

    let verifications = state.db.get_pending_verifications().await?;

    Ok(Json(ListVerificationsResponse {
        verifications: verifications
            .into_iter()
            .map(VerificationResponse::from)
            .collect(),
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ApproveResponse {
    pub report: ReportResponse,
    pub points_awarded: u32,
    pub breakdown: PointsBreakdown,
    pub new_badge_label: String,
}

/// Approve a pending verification. Resolves the report, credits points,
/// and invalidates the leaderboard cache.
async fn approve_verification(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(verification_id): Path<String>,
) -> Result<Json<ApproveResponse>> {
    let admin_id = principal.require_role(Role::Admin)?;

    let outcome = state.approval.approve(&verification_id, admin_id).await?;

    state.leaderboard.invalidate();
    state.notify.emit(&state.config.notify_service_url, outcome.change).await;

    Ok(Json(ApproveResponse {
        report: ReportResponse::from(outcome.report),
        points_awarded: outcome.breakdown.total,
        breakdown: outcome.breakdown,
        new_badge_label: outcome.new_badge.label().to_string(),
    }))
}

#[derive(Deserialize, Default)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// Reject a pending verification. The report returns to ASSIGNED with no
/// worker and no points are credited.
async fn reject_verification(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(verification_id): Path<String>,
    Json(payload): Json<RejectRequest>,
) -> Result<Json<ReportResponse>> {
    let admin_id = principal.require_role(Role::Admin)?;

    let outcome = state
        .approval
        .reject(&verification_id, payload.reason, admin_id)
        .await?;

    state.leaderboard.invalidate();
    state.notify.emit(&state.config.notify_service_url, outcome.change).await;

    Ok(Json(ReportResponse::from(outcome.report)))
}

// ─── Worker Registry ─────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateWorkerRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub zones: Vec<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkerResponse {
    pub id: String,
    pub name: String,
    pub zones: Vec<String>,
    pub active: bool,
    pub created_at: String,
}

impl From<Worker> for WorkerResponse {
    fn from(w: Worker) -> Self {
        Self {
            id: w.id,
            name: w.name,
            zones: w.zones,
            active: w.active,
            created_at: format_utc_rfc3339(w.created_at),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ListWorkersResponse {
    pub workers: Vec<WorkerResponse>,
}

async fn list_workers(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
) -> Result<Json<ListWorkersResponse>> {
    principal.require_role(Role::Admin)?;

    let workers = state.db.get_workers().await?;

    Ok(Json(ListWorkersResponse {
        workers: workers.into_iter().map(WorkerResponse::from).collect(),
    }))
}

async fn create_worker(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
    Json(payload): Json<CreateWorkerRequest>,
) -> Result<(StatusCode, Json<WorkerResponse>)> {
    let admin_id = principal.require_role(Role::Admin)?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let worker = Worker {
        id: generate_id()?,
        name: payload.name,
        zones: payload.zones,
        active: true,
        created_at: Utc::now(),
    };
    state.db.upsert_worker(&worker).await?;

    tracing::info!(worker_id = %worker.id, admin_id, "Worker registered");

    Ok((StatusCode::CREATED, Json(WorkerResponse::from(worker))))
}
