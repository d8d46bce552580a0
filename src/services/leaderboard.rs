// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard read model with a short-lived cache.
//!
//! Leaderboard queries hit every citizen document, so results are cached
//! for a few minutes and invalidated on every points credit. The cache is
//! shared across requests within one instance via `DashMap`.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::Badge;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// How long a cached leaderboard stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

const DEVICE_ID_PREVIEW_LEN: usize = 8;

/// One leaderboard row. Device fingerprints are truncated so the public
/// board does not leak full identifiers.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub device_preview: String,
    pub total_points: u32,
    pub reports_count: u32,
    pub badge: Badge,
    pub badge_label: String,
}

struct CachedBoard {
    fetched_at: Instant,
    entries: Vec<LeaderboardEntry>,
}

/// Leaderboard service with per-limit cached results.
#[derive(Clone)]
pub struct LeaderboardService {
    db: FirestoreDb,
    cache: Arc<DashMap<u32, CachedBoard>>,
}

impl LeaderboardService {
    pub fn new(db: FirestoreDb) -> Self {
        Self {
            db,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Top citizens by total points, served from cache when fresh.
    pub async fn top(&self, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        if let Some(cached) = self.cache.get(&limit) {
            if cached.fetched_at.elapsed() < CACHE_TTL {
                tracing::debug!(limit, "Leaderboard served from cache");
                return Ok(cached.entries.clone());
            }
        }

        let citizens = self.db.get_top_citizens(limit).await?;
        let entries: Vec<LeaderboardEntry> = citizens
            .into_iter()
            .enumerate()
            .map(|(i, c)| LeaderboardEntry {
                rank: i as u32 + 1,
                device_preview: preview_device_id(&c.device_id),
                total_points: c.total_points,
                reports_count: c.reports_count,
                badge: c.current_badge,
                badge_label: c.current_badge.label().to_string(),
            })
            .collect();

        self.cache.insert(
            limit,
            CachedBoard {
                fetched_at: Instant::now(),
                entries: entries.clone(),
            },
        );

        tracing::debug!(limit, count = entries.len(), "Leaderboard refreshed");
        Ok(entries)
    }

    /// Drop all cached boards. Called after every points credit.
    pub fn invalidate(&self) {
        self.cache.clear();
    }
}

fn preview_device_id(device_id: &str) -> String {
    if device_id.chars().count() <= DEVICE_ID_PREVIEW_LEN {
        device_id.to_string()
    } else {
        let prefix: String = device_id.chars().take(DEVICE_ID_PREVIEW_LEN).collect();
        format!("{}…", prefix)
    }
}
