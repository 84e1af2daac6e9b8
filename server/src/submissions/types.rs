//! Submission Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::lifecycle::ModerationState;
use crate::store::StoreError;

// ============================================================================
// Database Enums
// ============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "approval_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// A piece of user-generated content subject to moderation.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct Submission {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub project_id: Option<Uuid>,
    pub title: String,
    /// Rich-text document, stored as-is.
    #[schema(value_type = Object)]
    pub body: serde_json::Value,
    pub approval_status: ApprovalStatus,
    pub published: bool,
    pub featured: bool,
    pub rejection_reason: Option<String>,
    pub views: i64,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// The moderator-owned fields of this submission.
    #[must_use]
    pub fn moderation_state(&self) -> ModerationState {
        ModerationState {
            status: self.approval_status,
            published: self.published,
            featured: self.featured,
            rejection_reason: self.rejection_reason.clone(),
        }
    }

    /// Whether anyone, including anonymous viewers, may see this submission.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved && self.published
    }
}

/// Fields supplied when a submission is created.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub owner_id: Uuid,
    pub project_id: Option<Uuid>,
    pub title: String,
    pub body: serde_json::Value,
}

/// Owner-editable fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ContentEdit {
    pub title: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// Filter for listing submissions.
#[derive(Debug, Clone, Default)]
pub struct SubmissionQuery {
    pub owner_id: Option<Uuid>,
    pub status: Option<ApprovalStatus>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

impl SubmissionQuery {
    /// Query matching only publicly exposed submissions.
    #[must_use]
    pub fn public() -> Self {
        Self {
            status: Some(ApprovalStatus::Approved),
            published: Some(true),
            limit: default_limit(),
            ..Self::default()
        }
    }

    /// Whether `submission` satisfies the filter (ignores paging).
    #[must_use]
    pub fn matches(&self, submission: &Submission) -> bool {
        self.owner_id.is_none_or(|o| submission.owner_id == o)
            && self.status.is_none_or(|s| submission.approval_status == s)
            && self.published.is_none_or(|p| submission.published == p)
            && self.featured.is_none_or(|f| submission.featured == f)
    }
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct LikeOutcome {
    /// Whether the requester now likes the submission.
    pub liked: bool,
    /// Like count after the toggle.
    pub likes: i64,
}

/// Submission counts per approval status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateSubmissionRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[schema(value_type = Object)]
    #[serde(default)]
    pub body: serde_json::Value,
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateSubmissionRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListSubmissionsQuery {
    pub featured: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

pub(crate) const fn default_limit() -> i64 {
    20
}

/// Clamp client-supplied paging to sane bounds.
#[must_use]
pub fn clamp_paging(limit: i64, offset: i64) -> (i64, i64) {
    (limit.clamp(1, 100), offset.max(0))
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PaginatedSubmissions {
    pub items: Vec<Submission>,
    pub limit: i64,
    pub offset: i64,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Submission not found")]
    NotFound,

    #[error("You are not allowed to perform this action")]
    Forbidden,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<validator::ValidationErrors> for SubmissionError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Store(err) => {
                tracing::error!(error = %err, "Submission store error");
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
        };

        (
            status,
            Json(serde_json::json!({ "error": code, "message": message })),
        )
            .into_response()
    }
}
