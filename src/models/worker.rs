// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Worker model: assignable cleanup agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Worker profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    /// Worker ID (also used as document ID)
    pub id: String,
    pub name: String,
    /// Zone names this worker covers
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}
