// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Waste report model and status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Report lifecycle status.
///
/// Transitions are strictly `OPEN → ASSIGNED → IN_PROGRESS → VERIFIED →
/// RESOLVED`, with one lateral edge `VERIFIED → ASSIGNED` used when an
/// admin rejects the cleanup verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ReportStatus {
    Open,
    Assigned,
    InProgress,
    Verified,
    Resolved,
}

impl ReportStatus {
    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        matches!(
            (self, next),
            (Open, Assigned)
                | (Assigned, InProgress)
                | (InProgress, Verified)
                | (Verified, Resolved)
                | (Verified, Assigned)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Open => "OPEN",
            ReportStatus::Assigned => "ASSIGNED",
            ReportStatus::InProgress => "IN_PROGRESS",
            ReportStatus::Verified => "VERIFIED",
            ReportStatus::Resolved => "RESOLVED",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report severity as selected by the citizen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A latitude/longitude fix with optional GPS accuracy in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,
}

/// Stored waste report record in Firestore.
///
/// Reports are never physically deleted; resolved and rejected history
/// stays queryable as an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteReport {
    /// Opaque unique ID (also used as document ID)
    pub id: String,
    /// Device fingerprint of the submitting citizen
    pub device_id: String,
    /// Reported location
    pub location: GeoPoint,
    /// Free-text description (max 50 chars, validated at the boundary)
    pub description: Option<String>,
    /// Current lifecycle status
    pub status: ReportStatus,
    /// Severity as selected by the citizen
    pub severity: Option<Severity>,
    /// Waste type tags ("plastic", "construction", ...)
    #[serde(default)]
    pub waste_types: Vec<String>,
    /// When the report was submitted
    pub created_at: DateTime<Utc>,
    /// First-assignment timestamp; preserved across rejection round-trips
    pub assigned_at: Option<DateTime<Utc>>,
    pub in_progress_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Currently assigned worker, cleared when a verification is rejected
    pub worker_id: Option<String>,
    /// Verification created by the current/most recent cleanup attempt
    pub verification_id: Option<String>,
    /// Points credited on approval; written exactly once
    #[serde(default)]
    pub points_awarded: u32,
    /// Citizen streak before this submission, scored at approval time
    #[serde(default)]
    pub streak_at_submission: u32,
}
