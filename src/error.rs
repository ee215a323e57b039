// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

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

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// No stored Wahoo tokens for the user; they must authorize first.
    #[error("Wahoo account not connected")]
    NotConnected,

    /// The provider rejected a refresh; the user must authorize again.
    #[error("Wahoo token refresh failed: {0}")]
    RefreshFailed(String),

    /// Non-2xx from the workout listing endpoint (other than 401).
    #[error("Wahoo workout fetch failed with status {status}: {body}")]
    FetchFailed { status: u16, body: String },

    /// Non-2xx from the token endpoint.
    #[error("Wahoo OAuth error (status {status}): {body}")]
    OAuth { status: u16, body: String },

    #[error("Wahoo API error: {0}")]
    WahooApi(String),

    #[error("Coach provider error: {0}")]
    Llm(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the user has to go through the Wahoo authorization flow again.
    pub fn requires_reauthorization(&self) -> bool {
        matches!(self, AppError::NotConnected | AppError::RefreshFailed(_))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::NotConnected => (
                StatusCode::CONFLICT,
                "wahoo_not_connected",
                Some(self.to_string()),
            ),
            AppError::RefreshFailed(msg) => (
                StatusCode::UNAUTHORIZED,
                "wahoo_reauthorization_required",
                Some(msg.clone()),
            ),
            AppError::FetchFailed { status, body } => (
                StatusCode::BAD_GATEWAY,
                "wahoo_fetch_failed",
                Some(format!("HTTP {}: {}", status, body)),
            ),
            AppError::OAuth { status, body } => (
                StatusCode::BAD_GATEWAY,
                "wahoo_oauth_error",
                Some(format!("HTTP {}: {}", status, body)),
            ),
            AppError::WahooApi(msg) => (StatusCode::BAD_GATEWAY, "wahoo_error", Some(msg.clone())),
            AppError::Llm(msg) => {
                tracing::warn!(error = %msg, "Coach provider error");
                (
                    StatusCode::BAD_GATEWAY,
                    "coach_provider_error",
                    Some(msg.clone()),
                )
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
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
