// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin approval workflow.
//!
//! Approve resolves the report and credits points; reject returns the
//! report to the worker queue with no points, ever. Both are idempotent
//! in effect: the commit is a Firestore transaction that re-reads the
//! verification and aborts unless it is still PENDING, so the loser of a
//! concurrent duplicate submission fails cleanly without writing.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{
    ApprovalStatus, Citizen, PointsBreakdown, PointsHistoryEntry, ReportStatus, Verification,
    WasteReport,
};
use crate::services::lifecycle::StatusChange;
use crate::services::points::{calculate_points_for_report, is_first_in_area};
use crate::models::Badge;
use chrono::Utc;

/// Result of a successful approval.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub report: WasteReport,
    pub breakdown: PointsBreakdown,
    pub new_badge: Badge,
    pub change: StatusChange,
}

/// Result of a successful rejection.
#[derive(Debug, Clone)]
pub struct RejectionOutcome {
    pub report: WasteReport,
    pub change: StatusChange,
}

/// Admin approval workflow service.
#[derive(Clone)]
pub struct ApprovalWorkflow {
    db: FirestoreDb,
}

impl ApprovalWorkflow {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Approve a pending verification: verification → APPROVED, report →
    /// RESOLVED, citizen credited and ledger appended atomically.
    pub async fn approve(&self, verification_id: &str, admin_id: &str) -> Result<ApprovalOutcome> {
        let (mut verification, mut report) = self.load_pending(verification_id).await?;
        let old_status = report.status;
        let now = Utc::now();

        let mut citizen = self
            .db
            .get_citizen(&report.device_id)
            .await?
            .unwrap_or_else(|| Citizen::new(&report.device_id, report.created_at));

        // Pioneer bonus: no other resolved report within 500m of this one
        let resolved = self.db.get_reports_by_status(ReportStatus::Resolved).await?;
        let first_in_area = is_first_in_area(&report.location, &resolved);

        let breakdown = calculate_points_for_report(
            report.severity,
            first_in_area,
            report.streak_at_submission,
        );

        verification.approval_status = ApprovalStatus::Approved;
        verification.reviewed_by = Some(admin_id.to_string());
        verification.reviewed_at = Some(now);

        report.status = ReportStatus::Resolved;
        report.resolved_at.get_or_insert(now);
        report.points_awarded = breakdown.total;

        citizen.credit_points(breakdown.total, now);

        let history = PointsHistoryEntry {
            device_id: report.device_id.clone(),
            report_id: report.id.clone(),
            points: breakdown.total,
            reason: format!("Report resolved ({})", breakdown_summary(&breakdown)),
            created_at: now,
        };

        let committed = self
            .db
            .commit_decision_atomic(&verification, &report, Some(&citizen), Some(&history))
            .await?;
        if !committed {
            // Lost the race: report the state a concurrent admin produced
            return Err(self.decided_error(verification_id).await?);
        }

        tracing::info!(
            verification_id,
            admin_id,
            report_id = %report.id,
            points = breakdown.total,
            first_in_area,
            badge = %citizen.current_badge,
            "Verification approved, points credited"
        );

        let change = StatusChange {
            report_id: report.id.clone(),
            device_id: report.device_id.clone(),
            old_status,
            new_status: report.status,
            points_awarded: Some(breakdown.total),
        };

        Ok(ApprovalOutcome {
            report,
            breakdown,
            new_badge: citizen.current_badge,
            change,
        })
    }

    /// Reject a pending verification: verification → REJECTED, report
    /// returns to ASSIGNED with the worker cleared. No points are
    /// credited, and `assigned_at` keeps its first-assignment value.
    pub async fn reject(
        &self,
        verification_id: &str,
        reason: Option<String>,
        admin_id: &str,
    ) -> Result<RejectionOutcome> {
        let (mut verification, mut report) = self.load_pending(verification_id).await?;
        let old_status = report.status;
        let now = Utc::now();

        verification.approval_status = ApprovalStatus::Rejected;
        verification.reviewed_by = Some(admin_id.to_string());
        verification.reviewed_at = Some(now);
        verification.rejection_reason = reason;

        report.status = ReportStatus::Assigned;
        report.worker_id = None;

        let committed = self
            .db
            .commit_decision_atomic(&verification, &report, None, None)
            .await?;
        if !committed {
            return Err(self.decided_error(verification_id).await?);
        }

        tracing::info!(
            verification_id,
            admin_id,
            report_id = %report.id,
            "Verification rejected, report returned to queue"
        );

        let change = StatusChange {
            report_id: report.id.clone(),
            device_id: report.device_id.clone(),
            old_status,
            new_status: report.status,
            points_awarded: None,
        };

        Ok(RejectionOutcome { report, change })
    }

    /// Load the verification and its report, enforcing both approval
    /// preconditions with distinct messages.
    async fn load_pending(&self, verification_id: &str) -> Result<(Verification, WasteReport)> {
        let verification = self
            .db
            .get_verification(verification_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Verification {} not found", verification_id))
            })?;

        match verification.approval_status {
            ApprovalStatus::Pending => {}
            ApprovalStatus::Approved => {
                return Err(AppError::InvalidTransition(format!(
                    "Verification {} is already approved",
                    verification_id
                )))
            }
            ApprovalStatus::Rejected => {
                return Err(AppError::InvalidTransition(format!(
                    "Verification {} was rejected",
                    verification_id
                )))
            }
        }

        let report = self
            .db
            .get_report(&verification.report_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Report {} not found", verification.report_id))
            })?;

        if report.status != ReportStatus::Verified {
            return Err(AppError::InvalidTransition(format!(
                "Report {} is in state {} (expected VERIFIED)",
                report.id, report.status
            )));
        }

        Ok((verification, report))
    }

    /// Build the conflict error after losing the decision race.
    async fn decided_error(&self, verification_id: &str) -> Result<AppError> {
        let status = self
            .db
            .get_verification(verification_id)
            .await?
            .map(|v| v.approval_status);

        Ok(match status {
            Some(ApprovalStatus::Approved) => AppError::InvalidTransition(format!(
                "Verification {} is already approved",
                verification_id
            )),
            Some(ApprovalStatus::Rejected) => AppError::InvalidTransition(format!(
                "Verification {} was rejected",
                verification_id
            )),
            _ => AppError::InvalidTransition(format!(
                "Verification {} was decided concurrently",
                verification_id
            )),
        })
    }
}

fn breakdown_summary(b: &PointsBreakdown) -> String {
    format!(
        "base {} + severity {} + pioneer {} + streak {}",
        b.base, b.severity_bonus, b.pioneer_bonus, b.streak_bonus
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_summary_format() {
        let b = calculate_points_for_report(Some(crate::models::Severity::High), true, 2);
        assert_eq!(
            breakdown_summary(&b),
            "base 10 + severity 5 + pioneer 20 + streak 10"
        );
    }
}
