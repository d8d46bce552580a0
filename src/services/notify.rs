// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Status-change notification fan-out via Cloud Tasks.
//!
//! The engine only emits `(report_id, old_status, new_status,
//! points_awarded?)` events; a separate push-delivery service consumes
//! the queued tasks and formats the actual messages.
//!
//! Uses the official google-cloud-tasks-v2 SDK.

use crate::error::AppError;
use crate::error::Result;
use crate::models::ReportStatus;
use crate::services::lifecycle::StatusChange;
use serde::{Deserialize, Serialize};

/// Payload sent to the notification dispatch task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangePayload {
    pub report_id: String,
    pub device_id: String,
    pub old_status: ReportStatus,
    pub new_status: ReportStatus,
    pub points_awarded: Option<u32>,
}

impl From<StatusChange> for StatusChangePayload {
    fn from(change: StatusChange) -> Self {
        Self {
            report_id: change.report_id,
            device_id: change.device_id,
            old_status: change.old_status,
            new_status: change.new_status,
            points_awarded: change.points_awarded,
        }
    }
}

/// Cloud Tasks client wrapper for notification dispatch.
pub struct NotifyService {
    project_id: String,
    location: String,
    queue_name: String,
    /// Offline mode for tests: record payloads instead of calling GCP.
    #[cfg(test)]
    pub recorded: std::sync::Mutex<Vec<StatusChangePayload>>,
}

impl NotifyService {
    pub fn new(project_id: &str, region: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            location: region.to_string(),
            queue_name: crate::config::NOTIFY_QUEUE_NAME.to_string(),
            #[cfg(test)]
            recorded: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Queue a status-change event for push delivery.
    ///
    /// `service_url` is the base URL of the delivery service that
    /// receives the task (`Config::notify_service_url`).
    ///
    /// Notification delivery is best-effort: callers log failures and do
    /// not fail the originating request.
    pub async fn queue_status_change(
        &self,
        service_url: &str,
        payload: StatusChangePayload,
    ) -> Result<()> {
        #[cfg(test)]
        {
            self.recorded.lock().unwrap().push(payload.clone());
            return Ok(());
        }

        #[allow(unreachable_code)]
        self.queue_task(service_url, "/tasks/send-notification", &payload)
            .await
    }

    /// Queue a status change without surfacing errors to the caller.
    pub async fn emit(&self, service_url: &str, change: StatusChange) {
        let report_id = change.report_id.clone();
        if let Err(e) = self
            .queue_status_change(service_url, StatusChangePayload::from(change))
            .await
        {
            tracing::warn!(
                report_id = %report_id,
                error = ?e,
                "Failed to queue status-change notification"
            );
        }
    }

    /// Generic task queuing helper.
    async fn queue_task<T: Serialize>(
        &self,
        service_url: &str,
        endpoint: &str,
        payload: &T,
    ) -> Result<()> {
        use google_cloud_tasks_v2::client::CloudTasks;
        use google_cloud_tasks_v2::model::{HttpRequest, OidcToken, Task};

        let client = CloudTasks::builder()
            .build()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Cloud Tasks client error: {}", e)))?;

        let queue_path = format!(
            "projects/{}/locations/{}/queues/{}",
            self.project_id, self.location, self.queue_name
        );

        let body = serde_json::to_vec(payload)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JSON error: {}", e)))?;

        let http_request = HttpRequest::default()
            .set_url(format!("{}{}", service_url, endpoint))
            .set_http_method("POST")
            .set_body(axum::body::Bytes::from(body))
            .set_headers(std::collections::HashMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]))
            .set_oidc_token(
                OidcToken::default()
                    .set_service_account_email(format!(
                        "cleansweep-api@{}.iam.gserviceaccount.com",
                        self.project_id
                    ))
                    .set_audience(service_url.to_string()),
            );

        let task = Task::default().set_http_request(http_request);

        let _response = client
            .create_task()
            .set_parent(queue_path)
            .set_task(task)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Cloud Tasks create error: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_records_payload_in_test_mode() {
        let notify = NotifyService::new("test-project", "us-west1");

        notify
            .emit(
                "http://localhost:8080",
                StatusChange {
                    report_id: "r1".to_string(),
                    device_id: "d1".to_string(),
                    old_status: ReportStatus::Verified,
                    new_status: ReportStatus::Resolved,
                    points_awarded: Some(25),
                },
            )
            .await;

        let recorded = notify.recorded.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].report_id, "r1");
        assert_eq!(recorded[0].points_awarded, Some(25));
    }
}
