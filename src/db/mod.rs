//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const REPORTS: &str = "reports";
    pub const CITIZENS: &str = "citizens";
    pub const WORKERS: &str = "workers";
    pub const VERIFICATIONS: &str = "verifications";
    /// Append-only points ledger (keyed by report_id + device_id)
    pub const POINTS_HISTORY: &str = "points_history";
}
