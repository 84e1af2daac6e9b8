//! Moderation Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::store::StoreError;
use crate::submissions::{ApprovalStatus, TransitionError};

// ============================================================================
// Request Types
// ============================================================================

/// Optional body for approve.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct ApproveRequest {
    /// Only apply if the submission was last updated at this instant.
    pub expected_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RejectRequest {
    pub reason: String,
    pub expected_updated_at: Option<DateTime<Utc>>,
}

/// Body for the featured / published toggles.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetFlagRequest {
    pub value: bool,
    pub expected_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModerationQueueQuery {
    pub status: Option<ApprovalStatus>,
    #[serde(default = "crate::submissions::types::default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Submission not found")]
    NotFound,

    #[error("You are not allowed to moderate this submission")]
    Forbidden,

    #[error("Submission was modified by someone else; reload and retry")]
    Conflict,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<TransitionError> for ModerationError {
    fn from(err: TransitionError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl IntoResponse for ModerationError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Store(err) => {
                tracing::error!(error = %err, "Moderation store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Storage error".to_string(),
                )
            }
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                self.to_string(),
            ),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                "SUBMISSION_NOT_FOUND",
                self.to_string(),
            ),
            Self::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string()),
            Self::Conflict => (StatusCode::CONFLICT, "CONFLICT", self.to_string()),
        };

        (
            status,
            Json(serde_json::json!({ "error": code, "message": message })),
        )
            .into_response()
    }
}
