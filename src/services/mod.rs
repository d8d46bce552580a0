// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod approval;
pub mod geo;
pub mod leaderboard;
pub mod lifecycle;
pub mod notify;
pub mod points;
pub mod spam;
pub mod validation;

pub use approval::ApprovalWorkflow;
pub use leaderboard::LeaderboardService;
pub use lifecycle::{ReportLifecycle, StatusChange};
pub use notify::NotifyService;
pub use spam::{SpamGate, SpamVerdict};

use crate::error::AppError;
use ring::rand::{SecureRandom, SystemRandom};

/// Generate an opaque 128-bit document ID, hex-encoded.
pub fn generate_id() -> Result<String, AppError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to generate random ID")))?;
    Ok(hex::encode(bytes))
}
