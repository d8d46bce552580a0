// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Citizen model: one record per device fingerprint.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Badge tier, derived from total points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Badge {
    CleanlinessRookie,
    EcoWarrior,
    CommunityChampion,
    CleanupLegend,
}

impl Badge {
    /// Human-readable badge name shown in the app.
    pub fn label(self) -> &'static str {
        match self {
            Badge::CleanlinessRookie => "Cleanliness Rookie",
            Badge::EcoWarrior => "Eco Warrior",
            Badge::CommunityChampion => "Community Champion",
            Badge::CleanupLegend => "Cleanup Legend",
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Citizen profile stored in Firestore, keyed by device fingerprint.
///
/// `total_points` only ever increases; `current_badge` always matches the
/// tier for `total_points`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citizen {
    /// Device fingerprint (also used as document ID)
    pub device_id: String,
    /// When the device first reported
    pub first_seen: DateTime<Utc>,
    /// Last report or approval touching this citizen
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    pub reports_count: u32,
    pub current_badge: Badge,
    /// Consecutive calendar days with at least one submission.
    /// 0 only for a citizen who has never reported.
    #[serde(default)]
    pub streak_days: u32,
    pub last_report_date: Option<NaiveDate>,
    pub area: Option<String>,
    pub city: Option<String>,
}

impl Citizen {
    /// Fresh citizen record for a device seen for the first time.
    pub fn new(device_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            device_id: device_id.to_string(),
            first_seen: now,
            last_active: now,
            total_points: 0,
            reports_count: 0,
            current_badge: Badge::CleanlinessRookie,
            streak_days: 0,
            last_report_date: None,
            area: None,
            city: None,
        }
    }

    /// Record a new submission: bump the report counter, maintain the
    /// daily streak, and touch `last_active`.
    ///
    /// Returns the streak as it stood *before* this submission; the report
    /// snapshots that value for scoring at approval time, so a first-ever
    /// report carries no streak bonus.
    pub fn apply_submission(&mut self, now: DateTime<Utc>) -> u32 {
        let prior_streak = self.streak_days;
        let today = now.date_naive();

        self.streak_days = crate::services::points::next_streak(
            self.last_report_date,
            today,
            self.streak_days,
        );
        self.last_report_date = Some(today);
        self.reports_count += 1;
        self.last_active = now;

        prior_streak
    }

    /// Credit approved points and recompute the badge tier.
    pub fn credit_points(&mut self, points: u32, now: DateTime<Utc>) {
        self.total_points += points;
        self.current_badge = crate::services::points::badge_for_points(self.total_points);
        self.last_active = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_first_submission_snapshots_zero_streak() {
        let mut citizen = Citizen::new("device-1", at(2024, 3, 5));
        let prior = citizen.apply_submission(at(2024, 3, 5));

        assert_eq!(prior, 0);
        assert_eq!(citizen.streak_days, 1);
        assert_eq!(citizen.reports_count, 1);
        assert_eq!(citizen.last_report_date, Some(at(2024, 3, 5).date_naive()));
    }

    #[test]
    fn test_consecutive_day_increments_streak() {
        let mut citizen = Citizen::new("device-1", at(2024, 3, 5));
        citizen.apply_submission(at(2024, 3, 5));
        let prior = citizen.apply_submission(at(2024, 3, 6));

        assert_eq!(prior, 1);
        assert_eq!(citizen.streak_days, 2);
    }

    #[test]
    fn test_same_day_keeps_streak() {
        let mut citizen = Citizen::new("device-1", at(2024, 3, 5));
        citizen.apply_submission(at(2024, 3, 5));
        let prior = citizen.apply_submission(at(2024, 3, 5));

        assert_eq!(prior, 1);
        assert_eq!(citizen.streak_days, 1);
        assert_eq!(citizen.reports_count, 2);
    }

    #[test]
    fn test_gap_resets_streak() {
        let mut citizen = Citizen::new("device-1", at(2024, 3, 5));
        citizen.apply_submission(at(2024, 3, 5));
        citizen.apply_submission(at(2024, 3, 6));
        citizen.apply_submission(at(2024, 3, 9));

        assert_eq!(citizen.streak_days, 1);
    }

    #[test]
    fn test_credit_points_updates_badge() {
        let mut citizen = Citizen::new("device-1", at(2024, 3, 5));
        citizen.credit_points(49, at(2024, 3, 5));
        assert_eq!(citizen.current_badge, Badge::CleanlinessRookie);

        citizen.credit_points(1, at(2024, 3, 5));
        assert_eq!(citizen.total_points, 50);
        assert_eq!(citizen.current_badge, Badge::EcoWarrior);
    }

    #[test]
    fn test_badge_labels() {
        assert_eq!(Badge::CleanupLegend.label(), "Cleanup Legend");
        assert_eq!(Badge::CleanlinessRookie.to_string(), "Cleanliness Rookie");
    }
}
