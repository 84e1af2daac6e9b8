//! `PostgreSQL` implementation of the storage traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{IdentityStore, ModerationWrite, ProfileStore, StoreError, SubmissionStore};
use crate::identity::{Principal, ProjectMembership, Role};
use crate::profiles::{ProfilePage, ProfileUpdate};
use crate::submissions::{
    ContentEdit, LikeOutcome, ModerationState, NewSubmission, StatusCounts, Submission,
    SubmissionQuery,
};

/// `SQLSTATE` for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Keeps `updated_at` strictly increasing so compare-and-swap never misses a write.
const BUMP_UPDATED_AT: &str =
    "updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')";

/// Store backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map unique-constraint failures on profile pages to [`StoreError::UniqueViolation`].
fn map_profile_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let field = if db.constraint().is_some_and(|c| c.contains("username")) {
                "username"
            } else {
                "slug"
            };
            return StoreError::UniqueViolation(field.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn find_principal(&self, id: Uuid) -> Result<Option<Principal>, StoreError> {
        let principal = sqlx::query_as::<_, Principal>(
            "SELECT id, email, role, created_at FROM principals WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(principal)
    }

    async fn project_memberships(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<ProjectMembership>, StoreError> {
        let memberships = sqlx::query_as::<_, ProjectMembership>(
            "SELECT project_id, member_role FROM project_members WHERE principal_id = $1",
        )
        .bind(principal_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(memberships)
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<Option<Principal>, StoreError> {
        let principal = sqlx::query_as::<_, Principal>(
            r"UPDATE principals SET role = $2
              WHERE id = $1
              RETURNING id, email, role, created_at",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;
        Ok(principal)
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn insert_submission(&self, new: NewSubmission) -> Result<Submission, StoreError> {
        let submission = sqlx::query_as::<_, Submission>(
            r"INSERT INTO submissions (id, owner_id, project_id, title, body)
              VALUES ($1, $2, $3, $4, $5)
              RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(new.owner_id)
        .bind(new.project_id)
        .bind(&new.title)
        .bind(&new.body)
        .fetch_one(&self.pool)
        .await?;
        Ok(submission)
    }

    async fn get_submission(&self, id: Uuid) -> Result<Option<Submission>, StoreError> {
        let submission = sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(submission)
    }

    async fn update_content(
        &self,
        id: Uuid,
        edit: ContentEdit,
    ) -> Result<Option<Submission>, StoreError> {
        let sql = format!(
            r"UPDATE submissions
              SET title = COALESCE($2, title), body = COALESCE($3, body), {BUMP_UPDATED_AT}
              WHERE id = $1
              RETURNING *"
        );
        let submission = sqlx::query_as::<_, Submission>(&sql)
            .bind(id)
            .bind(edit.title)
            .bind(edit.body)
            .fetch_optional(&self.pool)
            .await?;
        Ok(submission)
    }

    async fn apply_moderation(
        &self,
        id: Uuid,
        state: ModerationState,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<ModerationWrite, StoreError> {
        let sql = format!(
            r"UPDATE submissions
              SET approval_status = $2, published = $3, featured = $4,
                  rejection_reason = $5, {BUMP_UPDATED_AT}
              WHERE id = $1 AND ($6::timestamptz IS NULL OR updated_at = $6)
              RETURNING *"
        );
        let updated = sqlx::query_as::<_, Submission>(&sql)
            .bind(id)
            .bind(state.status)
            .bind(state.published)
            .bind(state.featured)
            .bind(state.rejection_reason)
            .bind(expected_updated_at)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(submission) = updated {
            return Ok(ModerationWrite::Applied(submission));
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM submissions WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(if exists {
            ModerationWrite::Stale
        } else {
            ModerationWrite::NotFound
        })
    }

    async fn delete_submission(&self, id: Uuid) -> Result<bool, StoreError> {
        // Like pairings go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Submission>, StoreError> {
        let submission = sqlx::query_as::<_, Submission>(
            "UPDATE submissions SET views = views + 1 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(submission)
    }

    async fn toggle_like(
        &self,
        submission_id: Uuid,
        principal_id: Uuid,
    ) -> Result<Option<LikeOutcome>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent toggles on the same submission.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM submissions WHERE id = $1 FOR UPDATE")
                .bind(submission_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let removed = sqlx::query(
            "DELETE FROM likes_pairing WHERE submission_id = $1 AND principal_id = $2",
        )
        .bind(submission_id)
        .bind(principal_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if !removed {
            sqlx::query("INSERT INTO likes_pairing (submission_id, principal_id) VALUES ($1, $2)")
                .bind(submission_id)
                .bind(principal_id)
                .execute(&mut *tx)
                .await?;
        }

        let delta: i64 = if removed { -1 } else { 1 };
        let likes: i64 = sqlx::query_scalar(
            "UPDATE submissions SET likes = likes + $2 WHERE id = $1 RETURNING likes",
        )
        .bind(submission_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(LikeOutcome {
            liked: !removed,
            likes,
        }))
    }

    async fn count_like_pairings(&self, submission_id: Uuid) -> Result<i64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM likes_pairing WHERE submission_id = $1")
                .bind(submission_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn list_submissions(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Vec<Submission>, StoreError> {
        let submissions = sqlx::query_as::<_, Submission>(
            r"SELECT * FROM submissions
              WHERE ($1::uuid IS NULL OR owner_id = $1)
                AND ($2::approval_status IS NULL OR approval_status = $2)
                AND ($3::boolean IS NULL OR published = $3)
                AND ($4::boolean IS NULL OR featured = $4)
              ORDER BY created_at DESC, id DESC
              LIMIT $5 OFFSET $6",
        )
        .bind(query.owner_id)
        .bind(query.status)
        .bind(query.published)
        .bind(query.featured)
        .bind((query.limit > 0).then_some(query.limit))
        .bind(query.offset.max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(submissions)
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        let (pending, approved, rejected): (i64, i64, i64) = sqlx::query_as(
            r"SELECT
                COUNT(*) FILTER (WHERE approval_status = 'pending'),
                COUNT(*) FILTER (WHERE approval_status = 'approved'),
                COUNT(*) FILTER (WHERE approval_status = 'rejected')
              FROM submissions",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(StatusCounts {
            pending,
            approved,
            rejected,
        })
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, principal_id: Uuid) -> Result<Option<ProfilePage>, StoreError> {
        let page = sqlx::query_as::<_, ProfilePage>(
            "SELECT * FROM profile_pages WHERE principal_id = $1",
        )
        .bind(principal_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(page)
    }

    async fn find_profile_by_slug(&self, slug: &str) -> Result<Option<ProfilePage>, StoreError> {
        let page = sqlx::query_as::<_, ProfilePage>("SELECT * FROM profile_pages WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    async fn username_taken(&self, username: &str, exclude: Uuid) -> Result<bool, StoreError> {
        let taken: bool = sqlx::query_scalar(
            r"SELECT EXISTS(
                SELECT 1 FROM profile_pages
                WHERE LOWER(username) = LOWER($1) AND principal_id <> $2
              )",
        )
        .bind(username)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn slug_taken(&self, slug: &str, exclude: Uuid) -> Result<bool, StoreError> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM profile_pages WHERE slug = $1 AND principal_id <> $2)",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn update_profile(
        &self,
        principal_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<ProfilePage>, StoreError> {
        let sql = format!(
            r"UPDATE profile_pages
              SET page_content = COALESCE($2, page_content),
                  page_published = COALESCE($3, page_published),
                  show_on_team = COALESCE($4, show_on_team),
                  public_profile = COALESCE($5, public_profile),
                  username = COALESCE($6, username),
                  slug = COALESCE($7, slug),
                  {BUMP_UPDATED_AT}
              WHERE principal_id = $1
              RETURNING *"
        );
        sqlx::query_as::<_, ProfilePage>(&sql)
            .bind(principal_id)
            .bind(update.page_content)
            .bind(update.page_published)
            .bind(update.show_on_team)
            .bind(update.public_profile)
            .bind(update.username)
            .bind(update.slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_profile_error)
    }

    async fn list_team(&self) -> Result<Vec<ProfilePage>, StoreError> {
        let team = sqlx::query_as::<_, ProfilePage>(
            r"SELECT * FROM profile_pages
              WHERE page_published AND public_profile AND show_on_team
              ORDER BY LOWER(username)",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(team)
    }
}
