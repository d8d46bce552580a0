// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Reports (citizen submissions and their lifecycle state)
//! - Citizens (per-device profiles with points and streaks)
//! - Workers (assignable cleanup agents)
//! - Verifications (worker cleanup attempts)
//! - Points history (append-only ledger)
//!
//! The two multi-document writes the engine requires (report creation
//! and approval/rejection) run as Firestore transactions so partial
//! application rolls back entirely.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    Citizen, PointsHistoryEntry, ReportStatus, Verification, WasteReport, Worker,
};
use chrono::{DateTime, SecondsFormat, Utc};

/// Upper bound for unpaginated status queries (duplicate scans,
/// pioneer-radius scans, admin dashboards).
const STATUS_QUERY_LIMIT: u32 = 1000;

/// Format a timestamp exactly the way serde stores it, so string
/// comparisons in query filters line up with stored values.
fn query_ts(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Report Operations ───────────────────────────────────────

    /// Get a report by ID.
    pub async fn get_report(&self, report_id: &str) -> Result<Option<WasteReport>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::REPORTS)
            .obj()
            .one(report_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a report.
    pub async fn set_report(&self, report: &WasteReport) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::REPORTS)
            .document_id(&report.id)
            .object(report)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count reports by a device since `since` (daily-limit window).
    pub async fn count_reports_for_device_since(
        &self,
        device_id: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, AppError> {
        let device_id = device_id.to_string();
        let since = query_ts(since);

        let reports: Vec<WasteReport> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::REPORTS)
            .filter(move |q| {
                q.for_all([
                    q.field("device_id").eq(device_id.clone()),
                    q.field("created_at").greater_than_or_equal(since.clone()),
                ])
            })
            .limit(crate::services::spam::DAILY_REPORT_LIMIT + 1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(reports.len() as u32)
    }

    /// The device's most recent report, if any (cooldown window).
    pub async fn get_latest_report_for_device(
        &self,
        device_id: &str,
    ) -> Result<Option<WasteReport>, AppError> {
        let device_id = device_id.to_string();

        let mut reports: Vec<WasteReport> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::REPORTS)
            .filter(move |q| q.field("device_id").eq(device_id.clone()))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(reports.pop())
    }

    /// All OPEN reports created since `since` (duplicate-detection window).
    pub async fn get_open_reports_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<WasteReport>, AppError> {
        let since = query_ts(since);

        self.get_client()?
            .fluent()
            .select()
            .from(collections::REPORTS)
            .filter(move |q| {
                q.for_all([
                    q.field("status").eq(ReportStatus::Open.as_str()),
                    q.field("created_at").greater_than_or_equal(since.clone()),
                ])
            })
            .limit(STATUS_QUERY_LIMIT)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reports in a given status, newest first.
    pub async fn get_reports_by_status(
        &self,
        status: ReportStatus,
    ) -> Result<Vec<WasteReport>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::REPORTS)
            .filter(move |q| q.field("status").eq(status.as_str()))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(STATUS_QUERY_LIMIT)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get reports for a device with pagination, newest first.
    pub async fn get_reports_for_device(
        &self,
        device_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<WasteReport>, AppError> {
        let device_id = device_id.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::REPORTS)
            .filter(move |q| q.field("device_id").eq(device_id.clone()))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .offset(offset)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reports currently assigned to a worker (the worker's queue).
    pub async fn get_reports_for_worker(
        &self,
        worker_id: &str,
    ) -> Result<Vec<WasteReport>, AppError> {
        let worker_id = worker_id.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::REPORTS)
            .filter(move |q| q.field("worker_id").eq(worker_id.clone()))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(STATUS_QUERY_LIMIT)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Citizen Operations ──────────────────────────────────────

    /// Get a citizen by device fingerprint.
    pub async fn get_citizen(&self, device_id: &str) -> Result<Option<Citizen>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CITIZENS)
            .obj()
            .one(device_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a citizen.
    pub async fn upsert_citizen(&self, citizen: &Citizen) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CITIZENS)
            .document_id(&citizen.device_id)
            .object(citizen)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Top citizens by total points (leaderboard read model).
    pub async fn get_top_citizens(&self, limit: u32) -> Result<Vec<Citizen>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CITIZENS)
            .order_by([(
                "total_points",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Worker Operations ───────────────────────────────────────

    /// Get a worker by ID.
    pub async fn get_worker(&self, worker_id: &str) -> Result<Option<Worker>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::WORKERS)
            .obj()
            .one(worker_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a worker.
    pub async fn upsert_worker(&self, worker: &Worker) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::WORKERS)
            .document_id(&worker.id)
            .object(worker)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All workers (admin assignment view).
    pub async fn get_workers(&self) -> Result<Vec<Worker>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WORKERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Verification Operations ─────────────────────────────────

    /// Get a verification by ID.
    pub async fn get_verification(
        &self,
        verification_id: &str,
    ) -> Result<Option<Verification>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::VERIFICATIONS)
            .obj()
            .one(verification_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a verification.
    pub async fn set_verification(&self, verification: &Verification) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::VERIFICATIONS)
            .document_id(&verification.id)
            .object(verification)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Verifications awaiting admin review, oldest first.
    pub async fn get_pending_verifications(&self) -> Result<Vec<Verification>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::VERIFICATIONS)
            .filter(move |q| q.field("approval_status").eq("PENDING"))
            .order_by([(
                "started_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .limit(STATUS_QUERY_LIMIT)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Points History Operations ───────────────────────────────

    /// All ledger entries for a device, newest first.
    ///
    /// The sum of `points` here must always equal the citizen's
    /// `total_points` (reconciliation invariant).
    pub async fn get_points_history(
        &self,
        device_id: &str,
    ) -> Result<Vec<PointsHistoryEntry>, AppError> {
        let device_id = device_id.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::POINTS_HISTORY)
            .filter(move |q| q.field("device_id").eq(device_id.clone()))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Atomic Report Creation ──────────────────────────────────

    /// Atomically create a report and upsert its citizen.
    ///
    /// Reads the citizen inside a Firestore transaction, applies the
    /// submission (report counter, streak maintenance), snapshots the
    /// pre-submission streak onto the report, and commits both writes
    /// together. Returns the stored report.
    pub async fn create_report_atomic(
        &self,
        report: &WasteReport,
    ) -> Result<WasteReport, AppError> {
        let device_id = report.device_id.clone();

        // Begin a transaction
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Read the citizen with the transaction's consistency
        //    selector so the counter/streak update is conflict-checked
        //    at commit.
        let txn_reader = self.get_client()?.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );
        let current: Option<Citizen> = txn_reader
            .fluent()
            .select()
            .by_id_in(collections::CITIZENS)
            .obj()
            .one(&device_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read citizen in transaction: {}", e))
            })?;

        let mut citizen =
            current.unwrap_or_else(|| Citizen::new(&device_id, report.created_at));

        // 2. Apply the submission; the streak as it stood before this
        //    report is what approval will score.
        let prior_streak = citizen.apply_submission(report.created_at);

        let mut stored = report.clone();
        stored.streak_at_submission = prior_streak;

        // 3. Add the report write to the transaction
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::REPORTS)
            .document_id(&stored.id)
            .object(&stored)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add report to transaction: {}", e))
            })?;

        // 4. Add the citizen write to the transaction
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::CITIZENS)
            .document_id(&device_id)
            .object(&citizen)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add citizen to transaction: {}", e))
            })?;

        // 5. Commit atomically
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            report_id = %stored.id,
            device_id = %device_id,
            reports_count = citizen.reports_count,
            streak_days = citizen.streak_days,
            "Report created atomically"
        );

        Ok(stored)
    }

    // ─── Atomic Approval Decision ────────────────────────────────

    /// Atomically commit an admin decision on a verification.
    ///
    /// Re-reads the verification inside the transaction and aborts if it
    /// is no longer PENDING: of two racing admins only the first commit
    /// succeeds, the loser gets `false` with nothing written (optimistic
    /// compare-and-set on approval_status).
    ///
    /// `citizen` and `history` are present for approvals (points credit)
    /// and absent for rejections.
    pub async fn commit_decision_atomic(
        &self,
        verification: &Verification,
        report: &WasteReport,
        citizen: Option<&Citizen>,
        history: Option<&PointsHistoryEntry>,
    ) -> Result<bool, AppError> {
        // Begin a transaction
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Re-read the verification: the compare half of the CAS.
        //    The read must carry the transaction's consistency selector,
        //    otherwise the commit has an empty read set and conflict
        //    detection never fires.
        let txn_reader = self.get_client()?.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );
        let current: Option<Verification> = txn_reader
            .fluent()
            .select()
            .by_id_in(collections::VERIFICATIONS)
            .obj()
            .one(&verification.id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read verification in transaction: {}", e))
            })?;

        let still_pending = current.as_ref().map(Verification::is_pending).unwrap_or(false);

        if !still_pending {
            tracing::debug!(
                verification_id = %verification.id,
                "Verification already decided, aborting decision transaction"
            );
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        // 2. Verification write
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::VERIFICATIONS)
            .document_id(&verification.id)
            .object(verification)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add verification to transaction: {}", e))
            })?;

        // 3. Report write
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::REPORTS)
            .document_id(&report.id)
            .object(report)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add report to transaction: {}", e))
            })?;

        // 4. Citizen points credit (approval only)
        if let Some(citizen) = citizen {
            self.get_client()?
                .fluent()
                .update()
                .in_col(collections::CITIZENS)
                .document_id(&citizen.device_id)
                .object(citizen)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add citizen to transaction: {}", e))
                })?;
        }

        // 5. Ledger append (approval only). Keyed by report + device so a
        //    retried approval cannot double-append.
        if let Some(history) = history {
            let doc_id = format!("{}_{}", history.report_id, history.device_id);
            self.get_client()?
                .fluent()
                .update()
                .in_col(collections::POINTS_HISTORY)
                .document_id(&doc_id)
                .object(history)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add ledger entry to transaction: {}", e))
                })?;
        }

        // 6. Commit atomically. A concurrent decision that committed
        //    after our read aborts this commit; treat that as losing
        //    the CAS rather than a database failure.
        if let Err(e) = transaction.commit().await {
            let decided: Option<Verification> = self
                .get_verification(&verification.id)
                .await
                .ok()
                .flatten();
            if decided.map(|v| !v.is_pending()).unwrap_or(false) {
                tracing::debug!(
                    verification_id = %verification.id,
                    "Decision commit lost to a concurrent decision"
                );
                return Ok(false);
            }
            return Err(AppError::Database(format!(
                "Transaction commit failed: {}",
                e
            )));
        }

        tracing::info!(
            verification_id = %verification.id,
            report_id = %report.id,
            decision = ?verification.approval_status,
            "Approval decision committed atomically"
        );

        Ok(true)
    }
}
