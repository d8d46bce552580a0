// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Citizen-facing routes: report submission, own-report listing, profile,
//! leaderboard.

use crate::error::Result;
use crate::middleware::auth::{AuthPrincipal, Role};
use crate::models::{Badge, ReportStatus, Severity, WasteReport};
use crate::services::leaderboard::LeaderboardEntry;
use crate::services::lifecycle::NewReport;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_PER_PAGE: u32 = 100;
const DEFAULT_LEADERBOARD_SIZE: u32 = 20;
const MAX_LEADERBOARD_SIZE: u32 = 100;

/// Citizen routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/reports", post(submit_report).get(get_my_reports))
        .route("/api/reports/{id}", get(get_report))
        .route("/api/me", get(get_me))
}

// ─── Report Submission ───────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SubmitReportRequest {
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be in [-90, 90]"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be in [-180, 180]"))]
    pub lng: f64,
    #[validate(range(min = 0.0, message = "accuracy must be non-negative"))]
    pub accuracy: Option<f64>,
    #[validate(length(max = 50, message = "description must be at most 50 characters"))]
    pub description: Option<String>,
    pub severity: Option<Severity>,
    #[serde(default)]
    pub waste_types: Vec<String>,
}

/// Report representation returned to clients.
#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ReportResponse {
    pub id: String,
    pub status: ReportStatus,
    pub lat: f64,
    pub lng: f64,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub waste_types: Vec<String>,
    pub created_at: String,
    pub resolved_at: Option<String>,
    pub points_awarded: u32,
}

impl From<WasteReport> for ReportResponse {
    fn from(r: WasteReport) -> Self {
        Self {
            id: r.id,
            status: r.status,
            lat: r.location.lat,
            lng: r.location.lng,
            description: r.description,
            severity: r.severity,
            waste_types: r.waste_types,
            created_at: format_utc_rfc3339(r.created_at),
            resolved_at: r.resolved_at.map(format_utc_rfc3339),
            points_awarded: r.points_awarded,
        }
    }
}

/// Submit a new waste report.
///
/// The abuse gate runs first; rejections surface as 409/429 with retry
/// hints, never as server errors.
async fn submit_report(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
    Json(payload): Json<SubmitReportRequest>,
) -> Result<(StatusCode, Json<ReportResponse>)> {
    let device_id = principal.require_role(Role::Citizen)?;
    payload
        .validate()
        .map_err(|e| crate::error::AppError::Validation(e.to_string()))?;

    let report = state
        .lifecycle
        .create_report(
            &state.spam_gate,
            NewReport {
                device_id: device_id.to_string(),
                lat: payload.lat,
                lng: payload.lng,
                accuracy: payload.accuracy,
                description: payload.description,
                severity: payload.severity,
                waste_types: payload.waste_types,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ReportResponse::from(report))))
}

// ─── Own Reports ─────────────────────────────────────────────

#[derive(Deserialize)]
struct MyReportsQuery {
    /// Pagination: page number (1-indexed)
    #[serde(default = "default_page")]
    page: u32,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    50
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MyReportsResponse {
    pub reports: Vec<ReportResponse>,
    pub page: u32,
    pub per_page: u32,
}

/// Get the caller's own reports, newest first.
async fn get_my_reports(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
    Query(params): Query<MyReportsQuery>,
) -> Result<Json<MyReportsResponse>> {
    let device_id = principal.require_role(Role::Citizen)?;

    if params.page < 1 {
        return Err(crate::error::AppError::Validation(
            "Page must be greater than 0".to_string(),
        ));
    }
    let limit = params.per_page.min(MAX_PER_PAGE);
    let offset = (params.page - 1).checked_mul(limit).ok_or_else(|| {
        crate::error::AppError::Validation("Page number causes overflow".to_string())
    })?;

    let reports = state
        .db
        .get_reports_for_device(device_id, limit, offset)
        .await?;

    Ok(Json(MyReportsResponse {
        reports: reports.into_iter().map(ReportResponse::from).collect(),
        page: params.page,
        per_page: limit,
    }))
}

/// Get one of the caller's reports by ID.
///
/// Reports belonging to other devices answer 404, not 403, so report IDs
/// cannot be enumerated.
async fn get_report(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(report_id): Path<String>,
) -> Result<Json<ReportResponse>> {
    let device_id = principal.require_role(Role::Citizen)?;

    let report = state
        .db
        .get_report(&report_id)
        .await?
        .filter(|r| r.device_id == device_id)
        .ok_or_else(|| {
            crate::error::AppError::NotFound(format!("Report {} not found", report_id))
        })?;

    Ok(Json(ReportResponse::from(report)))
}

// ─── Citizen Profile ─────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub total_points: u32,
    pub reports_count: u32,
    pub streak_days: u32,
    pub badge: Badge,
    pub badge_label: String,
    pub member_since: Option<String>,
}

/// Get the caller's profile (points, badge, streak).
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthPrincipal>,
) -> Result<Json<ProfileResponse>> {
    let device_id = principal.require_role(Role::Citizen)?;

    // A device that has never reported has no citizen record yet;
    // answer with the zero profile instead of a 404.
    let response = match state.db.get_citizen(device_id).await? {
        Some(citizen) => ProfileResponse {
            total_points: citizen.total_points,
            reports_count: citizen.reports_count,
            streak_days: citizen.streak_days,
            badge: citizen.current_badge,
            badge_label: citizen.current_badge.label().to_string(),
            member_since: Some(format_utc_rfc3339(citizen.first_seen)),
        },
        None => ProfileResponse {
            total_points: 0,
            reports_count: 0,
            streak_days: 0,
            badge: Badge::CleanlinessRookie,
            badge_label: Badge::CleanlinessRookie.label().to_string(),
            member_since: None,
        },
    };

    Ok(Json(response))
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_leaderboard_size")]
    limit: u32,
}

fn default_leaderboard_size() -> u32 {
    DEFAULT_LEADERBOARD_SIZE
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
}

/// Public leaderboard, cached for a few minutes.
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let limit = params.limit.clamp(1, MAX_LEADERBOARD_SIZE);
    let entries = state.leaderboard.top(limit).await?;
    Ok(Json(LeaderboardResponse { entries }))
}
