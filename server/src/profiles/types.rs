//! Types for profile pages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::store::StoreError;

/// A principal's personal page.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, utoipa::ToSchema)]
pub struct ProfilePage {
    pub principal_id: Uuid,
    /// Rich-text document, stored as-is.
    #[schema(value_type = Object)]
    pub page_content: serde_json::Value,
    pub page_published: bool,
    pub show_on_team: bool,
    pub public_profile: bool,
    pub username: String,
    pub slug: String,
    pub updated_at: DateTime<Utc>,
}

impl ProfilePage {
    /// Whether the page may be resolved publicly by its slug.
    #[must_use]
    pub const fn is_publicly_resolvable(&self) -> bool {
        self.page_published && self.public_profile
    }

    /// Whether the page is listed on the team roster.
    #[must_use]
    pub const fn is_on_team(&self) -> bool {
        self.is_publicly_resolvable() && self.show_on_team
    }
}

/// Owner changes to a profile page. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub page_content: Option<serde_json::Value>,
    pub page_published: Option<bool>,
    pub show_on_team: Option<bool>,
    pub public_profile: Option<bool>,
    pub username: Option<String>,
    pub slug: Option<String>,
}

impl ProfileUpdate {
    /// Apply the update to `page` in place.
    pub fn apply_to(&self, page: &mut ProfilePage) {
        if let Some(content) = &self.page_content {
            page.page_content = content.clone();
        }
        if let Some(v) = self.page_published {
            page.page_published = v;
        }
        if let Some(v) = self.show_on_team {
            page.show_on_team = v;
        }
        if let Some(v) = self.public_profile {
            page.public_profile = v;
        }
        if let Some(username) = &self.username {
            page.username.clone_from(username);
        }
        if let Some(slug) = &self.slug {
            page.slug.clone_from(slug);
        }
    }
}

/// Request body for updating the caller's profile page.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    #[schema(value_type = Option<Object>)]
    pub page_content: Option<serde_json::Value>,
    pub page_published: Option<bool>,
    pub show_on_team: Option<bool>,
    pub public_profile: Option<bool>,
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 3, max = 100, message = "Slug must be 3-100 characters"))]
    pub slug: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            page_content: req.page_content,
            page_published: req.page_published,
            show_on_team: req.show_on_team,
            public_profile: req.public_profile,
            username: req.username,
            slug: req.slug,
        }
    }
}

/// Public roster entry.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TeamMember {
    pub principal_id: Uuid,
    pub username: String,
    pub slug: String,
}

impl From<ProfilePage> for TeamMember {
    fn from(page: ProfilePage) -> Self {
        Self {
            principal_id: page.principal_id,
            username: page.username,
            slug: page.slug,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Profile not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<validator::ValidationErrors> for ProfileError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Store(err) => {
                tracing::error!(error = %err, "Profile store error");
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
            Self::NotFound => (StatusCode::NOT_FOUND, "PROFILE_NOT_FOUND", self.to_string()),
        };

        (
            status,
            Json(serde_json::json!({ "error": code, "message": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(published: bool, public: bool, team: bool) -> ProfilePage {
        ProfilePage {
            principal_id: Uuid::new_v4(),
            page_content: serde_json::json!({}),
            page_published: published,
            show_on_team: team,
            public_profile: public,
            username: "ada".into(),
            slug: "ada".into(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_public_resolution_requires_published_and_public() {
        assert!(page(true, true, false).is_publicly_resolvable());
        assert!(!page(true, false, true).is_publicly_resolvable());
        assert!(!page(false, true, true).is_publicly_resolvable());
    }

    #[test]
    fn test_team_roster_requires_all_three_flags() {
        assert!(page(true, true, true).is_on_team());
        assert!(!page(true, true, false).is_on_team());
        assert!(!page(false, true, true).is_on_team());
        assert!(!page(true, false, true).is_on_team());
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut p = page(false, false, false);
        ProfileUpdate {
            page_published: Some(true),
            slug: Some("ada-l".into()),
            ..ProfileUpdate::default()
        }
        .apply_to(&mut p);

        assert!(p.page_published);
        assert!(!p.public_profile);
        assert_eq!(p.slug, "ada-l");
        assert_eq!(p.username, "ada");
    }
}
