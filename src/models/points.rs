// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Points ledger and scoring breakdown types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Append-only points ledger entry.
///
/// Never mutated or deleted; the sum over a device's entries equals
/// `Citizen.total_points` (reconciliation invariant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsHistoryEntry {
    pub device_id: String,
    pub report_id: String,
    pub points: u32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Additive scoring breakdown for one approved report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PointsBreakdown {
    pub base: u32,
    pub severity_bonus: u32,
    pub pioneer_bonus: u32,
    pub streak_bonus: u32,
    pub total: u32,
}
