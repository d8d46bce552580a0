// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod citizen;
pub mod points;
pub mod report;
pub mod verification;
pub mod worker;

pub use citizen::{Badge, Citizen};
pub use points::{PointsBreakdown, PointsHistoryEntry};
pub use report::{GeoPoint, ReportStatus, Severity, WasteReport};
pub use verification::{ApprovalStatus, Verification};
pub use worker::Worker;
