//! In-memory implementation of the storage traits.
//!
//! All tables live behind a single `RwLock`, so every trait method is atomic
//! with respect to every other. State is lost on restart.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{IdentityStore, ModerationWrite, ProfileStore, StoreError, SubmissionStore};
use crate::identity::{Principal, ProjectMembership, Role};
use crate::profiles::{ProfilePage, ProfileUpdate};
use crate::submissions::{
    ApprovalStatus, ContentEdit, LikeOutcome, ModerationState, NewSubmission, StatusCounts,
    Submission, SubmissionQuery,
};

#[derive(Default)]
struct Tables {
    principals: HashMap<Uuid, Principal>,
    memberships: Vec<(Uuid, ProjectMembership)>,
    submissions: HashMap<Uuid, Submission>,
    /// `(submission_id, principal_id)`
    likes: HashSet<(Uuid, Uuid)>,
    profiles: HashMap<Uuid, ProfilePage>,
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: while set, every trait method fails with
    /// [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store offline".into()))
        } else {
            Ok(())
        }
    }

    /// Create a principal together with its (unpublished) profile page,
    /// mirroring the signup trigger of the database schema.
    pub async fn add_principal(&self, email: &str, role: Role) -> Principal {
        let id = Uuid::now_v7();
        let now = Utc::now();
        let principal = Principal {
            id,
            email: email.to_string(),
            role,
            created_at: now,
        };

        // Tail of the UUID: the random part of a v7 id.
        let suffix = &id.simple().to_string()[24..];
        let profile = ProfilePage {
            principal_id: id,
            page_content: serde_json::json!({}),
            page_published: false,
            show_on_team: false,
            public_profile: false,
            username: format!("user_{suffix}"),
            slug: format!("user-{suffix}"),
            updated_at: now,
        };

        let mut tables = self.tables.write().await;
        tables.principals.insert(id, principal.clone());
        tables.profiles.insert(id, profile);
        principal
    }

    /// Add a project membership.
    pub async fn add_membership(&self, principal_id: Uuid, project_id: Uuid, member_role: &str) {
        self.tables.write().await.memberships.push((
            principal_id,
            ProjectMembership {
                project_id,
                member_role: member_role.to_string(),
            },
        ));
    }
}

/// A timestamp strictly after `previous`, so compare-and-swap on
/// `updated_at` cannot miss a write made within the same clock tick.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_principal(&self, id: Uuid) -> Result<Option<Principal>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().await.principals.get(&id).cloned())
    }

    async fn project_memberships(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<ProjectMembership>, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .memberships
            .iter()
            .filter(|(p, _)| *p == principal_id)
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<Option<Principal>, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        Ok(tables.principals.get_mut(&id).map(|p| {
            p.role = role;
            p.clone()
        }))
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn insert_submission(&self, new: NewSubmission) -> Result<Submission, StoreError> {
        self.check_available()?;
        let now = Utc::now();
        let initial = ModerationState::initial();
        let submission = Submission {
            id: Uuid::now_v7(),
            owner_id: new.owner_id,
            project_id: new.project_id,
            title: new.title,
            body: new.body,
            approval_status: initial.status,
            published: initial.published,
            featured: initial.featured,
            rejection_reason: initial.rejection_reason,
            views: 0,
            likes: 0,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .submissions
            .insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn get_submission(&self, id: Uuid) -> Result<Option<Submission>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().await.submissions.get(&id).cloned())
    }

    async fn update_content(
        &self,
        id: Uuid,
        edit: ContentEdit,
    ) -> Result<Option<Submission>, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        Ok(tables.submissions.get_mut(&id).map(|s| {
            if let Some(title) = edit.title {
                s.title = title;
            }
            if let Some(body) = edit.body {
                s.body = body;
            }
            s.updated_at = next_timestamp(s.updated_at);
            s.clone()
        }))
    }

    async fn apply_moderation(
        &self,
        id: Uuid,
        state: ModerationState,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<ModerationWrite, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let Some(s) = tables.submissions.get_mut(&id) else {
            return Ok(ModerationWrite::NotFound);
        };
        if expected_updated_at.is_some_and(|expected| expected != s.updated_at) {
            return Ok(ModerationWrite::Stale);
        }

        s.approval_status = state.status;
        s.published = state.published;
        s.featured = state.featured;
        s.rejection_reason = state.rejection_reason;
        s.updated_at = next_timestamp(s.updated_at);
        Ok(ModerationWrite::Applied(s.clone()))
    }

    async fn delete_submission(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let removed = tables.submissions.remove(&id).is_some();
        tables.likes.retain(|(submission_id, _)| *submission_id != id);
        Ok(removed)
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Submission>, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        Ok(tables.submissions.get_mut(&id).map(|s| {
            s.views += 1;
            s.clone()
        }))
    }

    async fn toggle_like(
        &self,
        submission_id: Uuid,
        principal_id: Uuid,
    ) -> Result<Option<LikeOutcome>, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.submissions.contains_key(&submission_id) {
            return Ok(None);
        }

        let key = (submission_id, principal_id);
        let liked = if tables.likes.remove(&key) {
            false
        } else {
            tables.likes.insert(key);
            true
        };

        let Some(s) = tables.submissions.get_mut(&submission_id) else {
            return Ok(None);
        };
        s.likes += if liked { 1 } else { -1 };
        Ok(Some(LikeOutcome {
            liked,
            likes: s.likes,
        }))
    }

    async fn count_like_pairings(&self, submission_id: Uuid) -> Result<i64, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .likes
            .iter()
            .filter(|(s, _)| *s == submission_id)
            .count() as i64)
    }

    async fn list_submissions(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Vec<Submission>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut items: Vec<Submission> = tables
            .submissions
            .values()
            .filter(|s| query.matches(s))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let offset = usize::try_from(query.offset).unwrap_or(0);
        let limit = usize::try_from(query.limit)
            .ok()
            .filter(|l| *l > 0)
            .unwrap_or(usize::MAX);
        Ok(items.into_iter().skip(offset).take(limit).collect())
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut counts = StatusCounts::default();
        for s in tables.submissions.values() {
            match s.approval_status {
                ApprovalStatus::Pending => counts.pending += 1,
                ApprovalStatus::Approved => counts.approved += 1,
                ApprovalStatus::Rejected => counts.rejected += 1,
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, principal_id: Uuid) -> Result<Option<ProfilePage>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().await.profiles.get(&principal_id).cloned())
    }

    async fn find_profile_by_slug(&self, slug: &str) -> Result<Option<ProfilePage>, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .profiles
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn username_taken(&self, username: &str, exclude: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .profiles
            .values()
            .any(|p| p.principal_id != exclude && p.username.eq_ignore_ascii_case(username)))
    }

    async fn slug_taken(&self, slug: &str, exclude: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .profiles
            .values()
            .any(|p| p.principal_id != exclude && p.slug == slug))
    }

    async fn update_profile(
        &self,
        principal_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<ProfilePage>, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        let clash = tables.profiles.values().find(|p| {
            p.principal_id != principal_id
                && (update
                    .username
                    .as_deref()
                    .is_some_and(|u| p.username.eq_ignore_ascii_case(u))
                    || update.slug.as_deref().is_some_and(|s| p.slug == s))
        });
        if let Some(other) = clash {
            let field = if update
                .username
                .as_deref()
                .is_some_and(|u| other.username.eq_ignore_ascii_case(u))
            {
                "username"
            } else {
                "slug"
            };
            return Err(StoreError::UniqueViolation(field.to_string()));
        }

        Ok(tables.profiles.get_mut(&principal_id).map(|page| {
            update.apply_to(page);
            page.updated_at = next_timestamp(page.updated_at);
            page.clone()
        }))
    }

    async fn list_team(&self) -> Result<Vec<ProfilePage>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut team: Vec<ProfilePage> = tables
            .profiles
            .values()
            .filter(|p| p.is_on_team())
            .cloned()
            .collect();
        team.sort_by_key(|p| p.username.to_lowercase());
        Ok(team)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    async fn store_with_submission() -> (Arc<MemoryStore>, Submission) {
        let store = Arc::new(MemoryStore::new());
        let owner = store.add_principal("o@example.com", Role::Contributor).await;
        let submission = store
            .insert_submission(NewSubmission {
                owner_id: owner.id,
                project_id: None,
                title: "Demo".into(),
                body: serde_json::json!({"text": "x"}),
            })
            .await
            .unwrap();
        (store, submission)
    }

    #[tokio::test]
    async fn test_insert_uses_initial_state() {
        let (_, s) = store_with_submission().await;
        assert_eq!(s.approval_status, ApprovalStatus::Pending);
        assert!(!s.published);
        assert!(!s.featured);
        assert_eq!((s.views, s.likes), (0, 0));
    }

    #[tokio::test]
    async fn test_concurrent_toggles_keep_counter_and_pairings_equal() {
        let (store, s) = store_with_submission().await;
        let likers: Vec<Uuid> = (0..16).map(|_| Uuid::new_v4()).collect();

        let mut handles = Vec::new();
        for (i, liker) in likers.iter().copied().enumerate() {
            let store = Arc::clone(&store);
            // Odd likers toggle twice (like then unlike).
            let times = if i % 2 == 0 { 1 } else { 2 };
            handles.push(tokio::spawn(async move {
                for _ in 0..times {
                    store.toggle_like(s.id, liker).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = store.get_submission(s.id).await.unwrap().unwrap();
        let pairings = store.count_like_pairings(s.id).await.unwrap();
        assert_eq!(stored.likes, pairings);
        assert_eq!(stored.likes, 8);
    }

    #[tokio::test]
    async fn test_moderation_cas() {
        let (store, s) = store_with_submission().await;
        let approved = ModerationState {
            status: ApprovalStatus::Approved,
            published: true,
            featured: false,
            rejection_reason: None,
        };

        let stale = s.updated_at - chrono::Duration::seconds(1);
        assert_eq!(
            store
                .apply_moderation(s.id, approved.clone(), Some(stale))
                .await
                .unwrap(),
            ModerationWrite::Stale
        );

        let ModerationWrite::Applied(updated) = store
            .apply_moderation(s.id, approved, Some(s.updated_at))
            .await
            .unwrap()
        else {
            panic!("expected write to apply");
        };
        assert!(updated.updated_at > s.updated_at);
    }

    #[tokio::test]
    async fn test_delete_removes_pairings() {
        let (store, s) = store_with_submission().await;
        store.toggle_like(s.id, Uuid::new_v4()).await.unwrap();
        assert!(store.delete_submission(s.id).await.unwrap());
        assert_eq!(store.count_like_pairings(s.id).await.unwrap(), 0);
        assert!(!store.delete_submission(s.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_profile_uniqueness() {
        let store = MemoryStore::new();
        let a = store.add_principal("a@example.com", Role::Viewer).await;
        let b = store.add_principal("b@example.com", Role::Viewer).await;

        store
            .update_profile(
                a.id,
                ProfileUpdate {
                    username: Some("ada".into()),
                    slug: Some("ada".into()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();

        let err = store
            .update_profile(
                b.id,
                ProfileUpdate {
                    slug: Some("ada".into()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(ref f) if f == "slug"));
        assert!(store.username_taken("ADA", b.id).await.unwrap());
        assert!(!store.username_taken("ada", a.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_team_is_ordered_ignoring_case() {
        let store = MemoryStore::new();
        for name in ["carol", "Alice", "bob"] {
            let p = store
                .add_principal(&format!("{name}@example.com"), Role::Contributor)
                .await;
            store
                .update_profile(
                    p.id,
                    ProfileUpdate {
                        username: Some(name.into()),
                        slug: Some(name.to_lowercase()),
                        page_published: Some(true),
                        public_profile: Some(true),
                        show_on_team: Some(true),
                        ..ProfileUpdate::default()
                    },
                )
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list_team()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.username)
            .collect();
        assert_eq!(names, ["Alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let (store, s) = store_with_submission().await;
        store.set_unavailable(true);
        assert!(matches!(
            store.get_submission(s.id).await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_unavailable(false);
        assert!(store.get_submission(s.id).await.unwrap().is_some());
    }
}
