//! Storage abstraction.
//!
//! The core talks to the hosted database only through these traits. Every
//! method is a single atomic unit from the caller's point of view: either it
//! applies completely or it returns an error and leaves stored state as it
//! was.
//!
//! Implementations:
//! - [`PgStore`]: `PostgreSQL` via sqlx.
//! - [`MemoryStore`]: in-process maps, for tests and local development.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::identity::{Principal, ProjectMembership, Role};
use crate::profiles::{ProfilePage, ProfileUpdate};
use crate::submissions::{
    ContentEdit, LikeOutcome, ModerationState, NewSubmission, StatusCounts, Submission,
    SubmissionQuery,
};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a moderation write.
#[derive(Debug, Clone, PartialEq)]
pub enum ModerationWrite {
    /// The new state was stored.
    Applied(Submission),
    /// No submission with that ID exists.
    NotFound,
    /// `expected_updated_at` did not match; nothing was written.
    Stale,
}

/// Principals, roles and project memberships.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Load a principal by ID.
    async fn find_principal(&self, id: Uuid) -> Result<Option<Principal>, StoreError>;

    /// Project memberships of a principal.
    async fn project_memberships(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<ProjectMembership>, StoreError>;

    /// Replace a principal's role. Returns `None` if the principal does not exist.
    async fn set_role(&self, id: Uuid, role: Role) -> Result<Option<Principal>, StoreError>;
}

/// Submissions and their like pairings.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert a new submission in the initial moderation state.
    async fn insert_submission(&self, new: NewSubmission) -> Result<Submission, StoreError>;

    /// Load a submission by ID.
    async fn get_submission(&self, id: Uuid) -> Result<Option<Submission>, StoreError>;

    /// Apply owner edits. Never touches moderation fields.
    async fn update_content(
        &self,
        id: Uuid,
        edit: ContentEdit,
    ) -> Result<Option<Submission>, StoreError>;

    /// Store a complete moderation state in one write.
    ///
    /// With `expected_updated_at`, the write only applies when the stored
    /// `updated_at` still equals it.
    async fn apply_moderation(
        &self,
        id: Uuid,
        state: ModerationState,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<ModerationWrite, StoreError>;

    /// Hard-delete a submission and its like pairings.
    async fn delete_submission(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Add exactly one to the view counter.
    async fn increment_views(&self, id: Uuid) -> Result<Option<Submission>, StoreError>;

    /// Flip the like pairing and adjust the counter by ±1 atomically.
    async fn toggle_like(
        &self,
        submission_id: Uuid,
        principal_id: Uuid,
    ) -> Result<Option<LikeOutcome>, StoreError>;

    /// Number of like pairings for a submission.
    async fn count_like_pairings(&self, submission_id: Uuid) -> Result<i64, StoreError>;

    /// List submissions matching `query`, newest first.
    async fn list_submissions(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Vec<Submission>, StoreError>;

    /// Submission counts per approval status.
    async fn count_by_status(&self) -> Result<StatusCounts, StoreError>;
}

/// Profile pages.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load the profile page of a principal.
    async fn get_profile(&self, principal_id: Uuid) -> Result<Option<ProfilePage>, StoreError>;

    /// Find a profile page by slug, regardless of its flags.
    async fn find_profile_by_slug(&self, slug: &str) -> Result<Option<ProfilePage>, StoreError>;

    /// Whether another principal already uses `username`.
    async fn username_taken(&self, username: &str, exclude: Uuid) -> Result<bool, StoreError>;

    /// Whether another principal already uses `slug`.
    async fn slug_taken(&self, slug: &str, exclude: Uuid) -> Result<bool, StoreError>;

    /// Apply an update. Unique violations surface as [`StoreError::UniqueViolation`].
    async fn update_profile(
        &self,
        principal_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<ProfilePage>, StoreError>;

    /// Pages listed on the team roster, ordered by username ignoring case.
    async fn list_team(&self) -> Result<Vec<ProfilePage>, StoreError>;
}

/// Everything the server needs from storage.
pub trait Store: IdentityStore + SubmissionStore + ProfileStore {}

impl<T> Store for T where T: IdentityStore + SubmissionStore + ProfileStore {}
