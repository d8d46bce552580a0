// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! CleanSweep: citizen waste-report lifecycle backend
//!
//! This crate provides the backend API for citizen-submitted waste reports:
//! abuse-gated submission, worker cleanup verification, admin approval,
//! and point/badge accrual.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{ApprovalWorkflow, LeaderboardService, NotifyService, ReportLifecycle, SpamGate};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub spam_gate: SpamGate,
    pub lifecycle: ReportLifecycle,
    pub approval: ApprovalWorkflow,
    pub leaderboard: LeaderboardService,
    pub notify: NotifyService,
}
