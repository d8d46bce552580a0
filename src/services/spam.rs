// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Abuse prevention gate for report submission.
//!
//! Three checks run in priority order and short-circuit on the first
//! violation (the order picks the user-facing error): daily count,
//! cooldown, geospatial duplicate. The gate is read-only; the caller
//! persists the report only after a pass. Two same-device submissions
//! racing the check can both pass; that window is an accepted soft
//! guarantee.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::WasteReport;
use crate::services::geo::haversine_distance_m;
use crate::time_utils::{seconds_until_next_utc_day, start_of_utc_day};
use chrono::{DateTime, Duration, Utc};

/// Maximum reports per device per UTC day.
pub const DAILY_REPORT_LIMIT: u32 = 10;
/// Minimum seconds between two reports from the same device.
pub const COOLDOWN_SECONDS: i64 = 300;
/// Radius within which an existing open report counts as a duplicate.
pub const DUPLICATE_RADIUS_M: f64 = 50.0;
/// Lookback window for duplicate detection among open reports.
pub const DUPLICATE_WINDOW_HOURS: i64 = 24;

/// Gate verdict for a candidate submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SpamVerdict {
    Clean,
    DailyLimit {
        retry_after_seconds: u64,
    },
    Cooldown {
        retry_after_seconds: u64,
    },
    /// No retry hint: the citizen must pick another location or wait for
    /// the existing report to close.
    Duplicate {
        existing_report_id: String,
        distance_m: f64,
    },
}

impl SpamVerdict {
    pub fn is_spam(&self) -> bool {
        !matches!(self, SpamVerdict::Clean)
    }

    /// Convert a rejection into the boundary error; `Clean` passes.
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            SpamVerdict::Clean => Ok(()),
            SpamVerdict::DailyLimit {
                retry_after_seconds,
            } => Err(AppError::DailyLimitReached {
                retry_after_seconds,
            }),
            SpamVerdict::Cooldown {
                retry_after_seconds,
            } => Err(AppError::CooldownActive {
                retry_after_seconds,
            }),
            SpamVerdict::Duplicate { distance_m, .. } => Err(AppError::DuplicateReport(format!(
                "An open report already exists {:.0}m from this location",
                distance_m
            ))),
        }
    }
}

/// Pure gate decision over pre-fetched inputs.
///
/// `reports_today` counts this device's reports since UTC midnight;
/// `last_report_at` is the device's most recent submission time;
/// `recent_open` holds all OPEN reports from the duplicate window.
pub fn evaluate(
    now: DateTime<Utc>,
    reports_today: u32,
    last_report_at: Option<DateTime<Utc>>,
    recent_open: &[WasteReport],
    lat: f64,
    lng: f64,
) -> SpamVerdict {
    // 1. Daily limit (inclusive threshold: the 10th prior report blocks)
    if reports_today >= DAILY_REPORT_LIMIT {
        return SpamVerdict::DailyLimit {
            retry_after_seconds: seconds_until_next_utc_day(now),
        };
    }

    // 2. Cooldown since the most recent report
    if let Some(last) = last_report_at {
        let elapsed = now - last;
        if elapsed < Duration::seconds(COOLDOWN_SECONDS) {
            let remaining_ms = COOLDOWN_SECONDS * 1000 - elapsed.num_milliseconds();
            let retry_after_seconds = (remaining_ms as u64).div_ceil(1000).max(1);
            return SpamVerdict::Cooldown {
                retry_after_seconds,
            };
        }
    }

    // 3. Geospatial duplicate among open reports in the window
    for report in recent_open {
        let distance_m =
            haversine_distance_m(lat, lng, report.location.lat, report.location.lng);
        if distance_m <= DUPLICATE_RADIUS_M {
            return SpamVerdict::Duplicate {
                existing_report_id: report.id.clone(),
                distance_m,
            };
        }
    }

    SpamVerdict::Clean
}

/// Gate service: fetches the inputs and runs [`evaluate`].
#[derive(Clone)]
pub struct SpamGate {
    db: FirestoreDb,
}

impl SpamGate {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Check a candidate submission for abuse. Read-only.
    pub async fn check_spam(
        &self,
        device_id: &str,
        lat: f64,
        lng: f64,
    ) -> Result<SpamVerdict, AppError> {
        let now = Utc::now();

        let reports_today = self
            .db
            .count_reports_for_device_since(device_id, start_of_utc_day(now))
            .await?;

        let last_report_at = self
            .db
            .get_latest_report_for_device(device_id)
            .await?
            .map(|r| r.created_at);

        let window_start = now - Duration::hours(DUPLICATE_WINDOW_HOURS);
        let recent_open = self.db.get_open_reports_since(window_start).await?;

        let verdict = evaluate(now, reports_today, last_report_at, &recent_open, lat, lng);

        if verdict.is_spam() {
            tracing::info!(device_id, verdict = ?verdict, "Submission rejected by abuse gate");
        }

        Ok(verdict)
    }
}
