//! Identity types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use super::role::Role;
use crate::store::StoreError;

/// Membership role that grants project-scoped moderation.
pub const PROJECT_LEAD_MEMBER_ROLE: &str = "lead";

/// A signed-in user as stored by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, utoipa::ToSchema)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Membership of a principal in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, utoipa::ToSchema)]
pub struct ProjectMembership {
    pub project_id: Uuid,
    /// Free-form sub-role inside the project, e.g. `"lead"` or `"member"`.
    pub member_role: String,
}

/// Resolved principal for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub memberships: Vec<ProjectMembership>,
}

impl PrincipalContext {
    /// Whether the principal belongs to `project_id` in any capacity.
    #[must_use]
    pub fn is_member_of(&self, project_id: Uuid) -> bool {
        self.memberships.iter().any(|m| m.project_id == project_id)
    }

    /// Whether the principal leads `project_id`.
    #[must_use]
    pub fn leads(&self, project_id: Uuid) -> bool {
        self.memberships
            .iter()
            .any(|m| m.project_id == project_id && m.member_role == PROJECT_LEAD_MEMBER_ROLE)
    }
}

/// Who is asking. Resolved fresh for every request and passed explicitly to
/// every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Requester {
    /// Unauthenticated, or authentication could not be verified.
    #[default]
    Anonymous,
    /// Authenticated principal.
    Principal(PrincipalContext),
}

impl Requester {
    /// The principal, if authenticated.
    #[must_use]
    pub const fn principal(&self) -> Option<&PrincipalContext> {
        match self {
            Self::Anonymous => None,
            Self::Principal(p) => Some(p),
        }
    }

    /// Principal ID, if authenticated.
    #[must_use]
    pub fn id(&self) -> Option<Uuid> {
        self.principal().map(|p| p.id)
    }

    /// Role, if authenticated.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.principal().map(|p| p.role)
    }

    /// Whether the requester is a network admin.
    #[must_use]
    pub fn is_network_admin(&self) -> bool {
        self.role() == Some(Role::NetworkAdmin)
    }

    /// Whether the requester is the principal with `id`.
    #[must_use]
    pub fn is(&self, id: Uuid) -> bool {
        self.id() == Some(id)
    }
}

/// Request body for changing a principal's role.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

/// Role administration errors.
#[derive(Debug, Error)]
pub enum RoleError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Only network admins may change roles")]
    Forbidden,

    #[error("You cannot change your own role")]
    SelfChange,

    #[error("Principal not found")]
    NotFound,

    #[error("Storage error")]
    Store(#[from] StoreError),
}

impl IntoResponse for RoleError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::SelfChange => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::NotFound => (StatusCode::NOT_FOUND, "PRINCIPAL_NOT_FOUND"),
            Self::Store(err) => {
                tracing::error!(error = %err, "Store error during role change");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        (
            status,
            Json(serde_json::json!({ "error": code, "message": self.to_string() })),
        )
            .into_response()
    }
}
