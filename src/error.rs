// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failures of the Whoop token lifecycle and API proxy.
///
/// `Clone` because a single refresh result is shared by every caller
/// waiting on the same in-flight refresh.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WhoopError {
    #[error("State mismatch - possible CSRF attack")]
    StateMismatch,

    #[error("Not authenticated with Whoop")]
    NotAuthenticated,

    #[error("Authentication expired. Please reconnect.")]
    AuthenticationExpired,

    #[error("API request failed: {status}")]
    ApiRequestFailed {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Relay unreachable: {0}")]
    RelayUnreachable(String),

    #[error("Token storage error: {0}")]
    Storage(String),
}

impl WhoopError {
    /// True when the user has to go through the authorization flow again.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            WhoopError::NotAuthenticated | WhoopError::AuthenticationExpired
        )
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Whoop(#[from] WhoopError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                Some(serde_json::Value::String(msg.clone())),
            ),
            AppError::Whoop(WhoopError::StateMismatch) => {
                (StatusCode::BAD_REQUEST, "state_mismatch", None)
            }
            AppError::Whoop(WhoopError::NotAuthenticated) => {
                (StatusCode::UNAUTHORIZED, "not_authenticated", None)
            }
            AppError::Whoop(WhoopError::AuthenticationExpired) => {
                (StatusCode::UNAUTHORIZED, "authentication_expired", None)
            }
            AppError::Whoop(WhoopError::ApiRequestFailed { status, body }) => (
                StatusCode::BAD_GATEWAY,
                "whoop_error",
                Some(serde_json::json!({ "status": status, "body": body })),
            ),
            AppError::Whoop(WhoopError::RelayUnreachable(msg)) => {
                tracing::warn!(error = %msg, "Relay unreachable");
                (StatusCode::SERVICE_UNAVAILABLE, "relay_unreachable", None)
            }
            AppError::Whoop(WhoopError::Storage(msg)) => {
                tracing::error!(error = %msg, "Token storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
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
