// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Report lifecycle orchestration.
//!
//! Owns every legal status transition:
//! 1. create: after the abuse gate passes, transactionally with the
//!    citizen upsert
//! 2. assign: admin hands the report to a worker
//! 3. start: worker proximity check, verification record created
//! 4. complete: photo timing check, verification ready for review
//!
//! Resolution and rejection-revert are driven by the approval workflow.
//! Every successful transition yields a [`StatusChange`] event for the
//! notification fan-out.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{
    ApprovalStatus, GeoPoint, ReportStatus, Severity, Verification, WasteReport,
};
use crate::services::validation::{validate_photo_timing, validate_worker_proximity};
use crate::services::{generate_id, validation, SpamGate};
use chrono::{DateTime, Utc};

/// Status transition event handed to the notification subsystem.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub report_id: String,
    pub device_id: String,
    pub old_status: ReportStatus,
    pub new_status: ReportStatus,
    pub points_awarded: Option<u32>,
}

/// Citizen submission input, already boundary-validated.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub device_id: String,
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub waste_types: Vec<String>,
}

/// Worker "before" photo capture.
#[derive(Debug, Clone)]
pub struct StartCleanup {
    pub worker_lat: f64,
    pub worker_lng: f64,
    pub before_photo_url: String,
    /// Client-supplied capture timestamp
    pub captured_at: DateTime<Utc>,
}

/// Worker "after" photo capture.
#[derive(Debug, Clone)]
pub struct CompleteCleanup {
    pub after_photo_url: String,
    /// Client-supplied capture timestamp
    pub captured_at: DateTime<Utc>,
}

/// Report lifecycle service.
#[derive(Clone)]
pub struct ReportLifecycle {
    db: FirestoreDb,
}

impl ReportLifecycle {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Submit a new report. Runs the abuse gate first; on a pass the
    /// report insert and citizen upsert commit in one transaction.
    pub async fn create_report(&self, gate: &SpamGate, input: NewReport) -> Result<WasteReport> {
        gate.check_spam(&input.device_id, input.lat, input.lng)
            .await?
            .into_result()?;

        let now = Utc::now();
        let report = WasteReport {
            id: generate_id()?,
            device_id: input.device_id,
            location: GeoPoint {
                lat: input.lat,
                lng: input.lng,
                accuracy: input.accuracy,
            },
            description: input.description,
            status: ReportStatus::Open,
            severity: input.severity,
            waste_types: input.waste_types,
            created_at: now,
            assigned_at: None,
            in_progress_at: None,
            verified_at: None,
            resolved_at: None,
            worker_id: None,
            verification_id: None,
            points_awarded: 0,
            streak_at_submission: 0,
        };

        // The transaction fills in streak_at_submission from the citizen
        // record as it stood before this submission.
        let stored = self.db.create_report_atomic(&report).await?;

        tracing::info!(
            report_id = %stored.id,
            device_id = %stored.device_id,
            lat = stored.location.lat,
            lng = stored.location.lng,
            "Report created"
        );

        Ok(stored)
    }

    /// Assign an open report to a worker (admin action).
    pub async fn assign(
        &self,
        report_id: &str,
        worker_id: &str,
        admin_id: &str,
    ) -> Result<(WasteReport, StatusChange)> {
        let mut report = self.get_report(report_id).await?;
        let old_status = report.status;
        Self::ensure_transition(&report, ReportStatus::Assigned)?;

        // The worker must exist and be active
        let worker = self
            .db
            .get_worker(worker_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Worker {} not found", worker_id)))?;
        if !worker.active {
            return Err(AppError::Validation(format!(
                "Worker {} is not active",
                worker_id
            )));
        }

        let now = Utc::now();
        report.status = ReportStatus::Assigned;
        report.worker_id = Some(worker_id.to_string());
        // First-assignment time survives rejection round-trips
        report.assigned_at.get_or_insert(now);
        self.db.set_report(&report).await?;

        tracing::info!(report_id, worker_id, admin_id, "Report assigned");

        let change = Self::status_change(&report, old_status);
        Ok((report, change))
    }

    /// Worker starts cleanup: proximity check, then a verification record
    /// is created from the "before" photo capture.
    pub async fn start_work(
        &self,
        report_id: &str,
        worker_id: &str,
        input: StartCleanup,
    ) -> Result<(WasteReport, Verification, StatusChange)> {
        let mut report = self.get_report(report_id).await?;
        let old_status = report.status;
        Self::ensure_transition(&report, ReportStatus::InProgress)?;

        if report.worker_id.as_deref() != Some(worker_id) {
            return Err(AppError::Forbidden(format!(
                "Report {} is not assigned to this worker",
                report_id
            )));
        }

        let check = validate_worker_proximity(
            input.worker_lat,
            input.worker_lng,
            report.location.lat,
            report.location.lng,
        );
        if !check.is_valid {
            tracing::info!(
                report_id,
                worker_id,
                distance_m = check.distance_m,
                "Cleanup start rejected: worker too far from report"
            );
            return Err(AppError::Proximity(
                check.error.unwrap_or_else(|| "Worker too far away".to_string()),
            ));
        }

        let verification = Verification {
            id: generate_id()?,
            report_id: report.id.clone(),
            worker_id: worker_id.to_string(),
            before_photo_url: input.before_photo_url,
            after_photo_url: None,
            started_at: input.captured_at,
            completed_at: None,
            worker_lat: input.worker_lat,
            worker_lng: input.worker_lng,
            time_spent_minutes: None,
            approval_status: ApprovalStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
        };
        self.db.set_verification(&verification).await?;

        report.status = ReportStatus::InProgress;
        report.in_progress_at.get_or_insert(Utc::now());
        report.verification_id = Some(verification.id.clone());
        self.db.set_report(&report).await?;

        tracing::info!(
            report_id,
            worker_id,
            verification_id = %verification.id,
            distance_m = check.distance_m,
            "Cleanup started"
        );

        let change = Self::status_change(&report, old_status);
        Ok((report, verification, change))
    }

    /// Worker completes cleanup: photo timing check, then the
    /// verification is finalized and queued for admin review.
    pub async fn complete_work(
        &self,
        report_id: &str,
        worker_id: &str,
        input: CompleteCleanup,
    ) -> Result<(WasteReport, Verification, StatusChange)> {
        let mut report = self.get_report(report_id).await?;
        let old_status = report.status;
        Self::ensure_transition(&report, ReportStatus::Verified)?;

        if report.worker_id.as_deref() != Some(worker_id) {
            return Err(AppError::Forbidden(format!(
                "Report {} is not assigned to this worker",
                report_id
            )));
        }

        let verification_id = report.verification_id.clone().ok_or_else(|| {
            AppError::InvalidTransition(format!("Report {} has no active verification", report_id))
        })?;
        let mut verification = self
            .db
            .get_verification(&verification_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Verification {} not found", verification_id))
            })?;

        let check = validate_photo_timing(verification.started_at, input.captured_at);
        if !check.is_valid {
            tracing::info!(
                report_id,
                worker_id,
                minutes_between = check.minutes_between,
                "Cleanup completion rejected: photo timing out of bounds"
            );
            return Err(AppError::Timing(
                check.error.unwrap_or_else(|| "Invalid photo timing".to_string()),
            ));
        }

        verification.after_photo_url = Some(input.after_photo_url);
        verification.completed_at = Some(input.captured_at);
        verification.time_spent_minutes = Some(validation::calculate_time_spent(
            verification.started_at,
            input.captured_at,
        ));
        self.db.set_verification(&verification).await?;

        report.status = ReportStatus::Verified;
        report.verified_at.get_or_insert(Utc::now());
        self.db.set_report(&report).await?;

        tracing::info!(
            report_id,
            worker_id,
            verification_id = %verification.id,
            time_spent_minutes = verification.time_spent_minutes,
            "Cleanup completed, pending admin review"
        );

        let change = Self::status_change(&report, old_status);
        Ok((report, verification, change))
    }

    async fn get_report(&self, report_id: &str) -> Result<WasteReport> {
        self.db
            .get_report(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))
    }

    /// Reject any edge the state machine does not allow, leaving the
    /// stored report untouched.
    fn ensure_transition(report: &WasteReport, next: ReportStatus) -> Result<()> {
        if report.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::InvalidTransition(format!(
                "Report {} cannot move from {} to {}",
                report.id, report.status, next
            )))
        }
    }

    fn status_change(report: &WasteReport, old_status: ReportStatus) -> StatusChange {
        StatusChange {
            report_id: report.id.clone(),
            device_id: report.device_id.clone(),
            old_status,
            new_status: report.status,
            points_awarded: None,
        }
    }
}
