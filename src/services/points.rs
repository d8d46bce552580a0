// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Points and badge scoring engine.
//!
//! All scoring rules are additive: base + severity bonus + pioneer bonus
//! + streak bonus. Everything here is pure; the approval workflow feeds
//! in citizen state captured earlier in the report lifecycle.

use crate::models::{Badge, GeoPoint, PointsBreakdown, ReportStatus, Severity, WasteReport};
use crate::services::geo::haversine_distance_m;
use chrono::NaiveDate;

/// Base points for any approved report.
pub const BASE_POINTS: u32 = 10;
/// Extra points for HIGH severity reports.
pub const HIGH_SEVERITY_BONUS: u32 = 5;
/// Bonus for the first resolved report in an area.
pub const PIONEER_BONUS: u32 = 20;
/// Streak multiplier per consecutive reporting day.
pub const STREAK_BONUS_PER_DAY: u32 = 5;
/// Radius defining "first in area" for the pioneer bonus.
pub const PIONEER_RADIUS_M: f64 = 500.0;

/// Badge thresholds, inclusive lower bounds.
pub const ECO_WARRIOR_POINTS: u32 = 50;
pub const COMMUNITY_CHAMPION_POINTS: u32 = 200;
pub const CLEANUP_LEGEND_POINTS: u32 = 500;

/// Compose the points for one approved report.
pub fn calculate_points_for_report(
    severity: Option<Severity>,
    is_first_in_area: bool,
    streak_days: u32,
) -> PointsBreakdown {
    let severity_bonus = if severity == Some(Severity::High) {
        HIGH_SEVERITY_BONUS
    } else {
        0
    };
    let pioneer_bonus = if is_first_in_area { PIONEER_BONUS } else { 0 };
    let streak_bonus = streak_days * STREAK_BONUS_PER_DAY;

    PointsBreakdown {
        base: BASE_POINTS,
        severity_bonus,
        pioneer_bonus,
        streak_bonus,
        total: BASE_POINTS + severity_bonus + pioneer_bonus + streak_bonus,
    }
}

/// Badge tier for a point total, evaluated highest-first.
pub fn badge_for_points(total_points: u32) -> Badge {
    if total_points >= CLEANUP_LEGEND_POINTS {
        Badge::CleanupLegend
    } else if total_points >= COMMUNITY_CHAMPION_POINTS {
        Badge::CommunityChampion
    } else if total_points >= ECO_WARRIOR_POINTS {
        Badge::EcoWarrior
    } else {
        Badge::CleanlinessRookie
    }
}

/// Next streak value for a submission on `today`.
///
/// Same day: unchanged. Exactly one calendar day later: +1. Any gap or no
/// prior report: reset to 1.
pub fn next_streak(last_report_date: Option<NaiveDate>, today: NaiveDate, current: u32) -> u32 {
    match last_report_date {
        Some(last) if last == today => current,
        Some(last) if today.signed_duration_since(last).num_days() == 1 => current + 1,
        _ => 1,
    }
}

/// Whether no other RESOLVED report lies within [`PIONEER_RADIUS_M`] of
/// `location`. The caller supplies already-resolved reports; radius
/// filtering happens here since the store has no native geo queries.
pub fn is_first_in_area(location: &GeoPoint, resolved: &[WasteReport]) -> bool {
    !resolved.iter().any(|r| {
        r.status == ReportStatus::Resolved
            && haversine_distance_m(location.lat, location.lng, r.location.lat, r.location.lng)
                <= PIONEER_RADIUS_M
    })
}
