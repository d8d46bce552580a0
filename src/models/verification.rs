// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Cleanup verification model: one record per worker cleanup attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Admin decision state for a verification.
///
/// PENDING → APPROVED and PENDING → REJECTED are the only transitions;
/// a decided verification never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Stored verification record in Firestore.
///
/// Created when the worker captures the "before" photo, completed when the
/// "after" photo is captured, terminal once an admin decides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    /// Opaque unique ID (also used as document ID)
    pub id: String,
    pub report_id: String,
    pub worker_id: String,
    pub before_photo_url: String,
    pub after_photo_url: Option<String>,
    /// Client-supplied capture timestamp of the "before" photo
    pub started_at: DateTime<Utc>,
    /// Client-supplied capture timestamp of the "after" photo
    pub completed_at: Option<DateTime<Utc>>,
    /// Worker location at start, already proximity-checked
    pub worker_lat: f64,
    pub worker_lng: f64,
    /// Whole minutes between before and after photos (round-half-up)
    pub time_spent_minutes: Option<u32>,
    pub approval_status: ApprovalStatus,
    /// Admin who decided, once no longer pending
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl Verification {
    pub fn is_pending(&self) -> bool {
        self.approval_status == ApprovalStatus::Pending
    }
}
