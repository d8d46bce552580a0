// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Expected negative outcomes (rate limits, duplicate reports, proximity
//! and timing failures, illegal transitions, stale approvals) are typed
//! variants with 4xx mappings so clients can show user-facing messages
//! and retry hints. Only infrastructure failures map to 5xx.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Daily report limit reached")]
    DailyLimitReached { retry_after_seconds: u64 },

    #[error("Cooldown active between reports")]
    CooldownActive { retry_after_seconds: u64 },

    #[error("Duplicate report: {0}")]
    DuplicateReport(String),

    #[error("Proximity check failed: {0}")]
    Proximity(String),

    #[error("Photo timing check failed: {0}")]
    Timing(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_seconds: Option<u64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut retry_after = None;
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
            }
            AppError::DailyLimitReached {
                retry_after_seconds,
            } => {
                retry_after = Some(*retry_after_seconds);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "daily_limit_reached",
                    Some("Daily report limit reached, try again tomorrow".to_string()),
                )
            }
            AppError::CooldownActive {
                retry_after_seconds,
            } => {
                retry_after = Some(*retry_after_seconds);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "cooldown_active",
                    Some(format!(
                        "Please wait {} seconds before reporting again",
                        retry_after_seconds
                    )),
                )
            }
            AppError::DuplicateReport(msg) => {
                (StatusCode::CONFLICT, "duplicate_report", Some(msg.clone()))
            }
            AppError::Proximity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "proximity_error",
                Some(msg.clone()),
            ),
            AppError::Timing(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "timing_error",
                Some(msg.clone()),
            ),
            AppError::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, "invalid_transition", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            retry_after_seconds: retry_after,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
