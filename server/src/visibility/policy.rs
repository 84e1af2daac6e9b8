//! Visibility policy.
//!
//! Pure functions deciding what a requester may see, edit and moderate.
//! Rules are evaluated in order and the first match wins:
//!
//! 1. The owner sees and edits their own resource in any state.
//! 2. A network admin sees and edits everything.
//! 3. A project lead or contributor who is a member of the resource's project
//!    sees and edits it.
//! 4. Everyone else sees the resource only while it is publicly exposed, and
//!    never edits it.
//!
//! Ownership never grants write access to the moderation fields; see
//! [`can_edit_field`].

use serde::Serialize;
use uuid::Uuid;

use crate::identity::{Requester, Role};
use crate::profiles::ProfilePage;
use crate::submissions::Submission;

/// A resource governed by the visibility policy.
pub trait Governed {
    /// Principal owning the resource.
    fn owner_id(&self) -> Uuid;

    /// Project the resource is scoped to, if any.
    fn project_id(&self) -> Option<Uuid>;

    /// Whether the resource is exposed to the public in its current state.
    fn is_publicly_exposed(&self) -> bool;
}

impl Governed for Submission {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn project_id(&self) -> Option<Uuid> {
        self.project_id
    }

    fn is_publicly_exposed(&self) -> bool {
        self.is_public()
    }
}

impl Governed for ProfilePage {
    fn owner_id(&self) -> Uuid {
        self.principal_id
    }

    fn project_id(&self) -> Option<Uuid> {
        None
    }

    fn is_publicly_exposed(&self) -> bool {
        self.is_publicly_resolvable()
    }
}

/// What a requester may do with a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Access {
    pub visible: bool,
    pub editable: bool,
}

impl Access {
    pub const HIDDEN: Self = Self {
        visible: false,
        editable: false,
    };
    pub const READ_ONLY: Self = Self {
        visible: true,
        editable: false,
    };
    pub const FULL: Self = Self {
        visible: true,
        editable: true,
    };
}

/// Fields of governed resources that the policy distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Body,
    PageContent,
    Status,
    Published,
    Featured,
    RejectionReason,
}

impl Field {
    /// Whether the field belongs to moderators rather than the owner.
    #[must_use]
    pub const fn is_moderation_field(self) -> bool {
        matches!(
            self,
            Self::Status | Self::Published | Self::Featured | Self::RejectionReason
        )
    }
}

/// Evaluate what `requester` may do with `resource`.
#[must_use]
pub fn evaluate<R>(resource: &R, requester: &Requester) -> Access
where
    R: Governed + ?Sized,
{
    let public = if resource.is_publicly_exposed() {
        Access::READ_ONLY
    } else {
        Access::HIDDEN
    };

    let Some(principal) = requester.principal() else {
        return public;
    };

    if principal.id == resource.owner_id() {
        return Access::FULL;
    }

    if principal.role == Role::NetworkAdmin {
        return Access::FULL;
    }

    if matches!(principal.role, Role::ProjectLead | Role::Contributor)
        && resource
            .project_id()
            .is_some_and(|project| principal.is_member_of(project))
    {
        return Access::FULL;
    }

    public
}

/// Whether `requester` may moderate `resource`: a network admin, or a
/// project lead who leads the resource's project.
#[must_use]
pub fn can_moderate<R>(resource: &R, requester: &Requester) -> bool
where
    R: Governed + ?Sized,
{
    let Some(principal) = requester.principal() else {
        return false;
    };

    match principal.role {
        Role::NetworkAdmin => true,
        Role::ProjectLead => resource
            .project_id()
            .is_some_and(|project| principal.leads(project)),
        Role::Contributor | Role::Viewer => false,
    }
}

/// Whether `requester` may write `field` of `resource`.
#[must_use]
pub fn can_edit_field<R>(resource: &R, requester: &Requester, field: Field) -> bool
where
    R: Governed + ?Sized,
{
    if field.is_moderation_field() {
        can_moderate(resource, requester)
    } else {
        evaluate(resource, requester).editable
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::identity::{PrincipalContext, ProjectMembership, PROJECT_LEAD_MEMBER_ROLE};
    use crate::submissions::ApprovalStatus;

    fn submission(
        owner: Uuid,
        project: Option<Uuid>,
        status: ApprovalStatus,
        published: bool,
    ) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            owner_id: owner,
            project_id: project,
            title: "Demo".into(),
            body: serde_json::json!({}),
            approval_status: status,
            published,
            featured: true,
            rejection_reason: (status == ApprovalStatus::Rejected).then(|| "no".to_string()),
            views: 0,
            likes: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn principal(role: Role, memberships: Vec<(Uuid, &str)>) -> Requester {
        Requester::Principal(PrincipalContext {
            id: Uuid::new_v4(),
            email: "p@example.com".into(),
            role,
            memberships: memberships
                .into_iter()
                .map(|(project_id, member_role)| ProjectMembership {
                    project_id,
                    member_role: member_role.into(),
                })
                .collect(),
        })
    }

    fn all_states() -> Vec<(ApprovalStatus, bool)> {
        vec![
            (ApprovalStatus::Pending, false),
            (ApprovalStatus::Approved, false),
            (ApprovalStatus::Approved, true),
            (ApprovalStatus::Rejected, false),
        ]
    }

    #[test]
    fn test_anonymous_sees_only_approved_and_published() {
        for (status, published) in all_states() {
            let s = submission(Uuid::new_v4(), None, status, published);
            let access = evaluate(&s, &Requester::Anonymous);
            assert_eq!(
                access.visible,
                status == ApprovalStatus::Approved && published,
                "{status:?} published={published}"
            );
            assert!(!access.editable);
        }
    }

    #[test]
    fn test_featured_does_not_expose() {
        let mut s = submission(Uuid::new_v4(), None, ApprovalStatus::Pending, false);
        s.featured = true;
        assert_eq!(evaluate(&s, &Requester::Anonymous), Access::HIDDEN);
    }

    #[test]
    fn test_owner_sees_and_edits_in_any_state() {
        let owner = principal(Role::Viewer, vec![]);
        let owner_id = owner.id().unwrap();
        for (status, published) in all_states() {
            let s = submission(owner_id, None, status, published);
            assert_eq!(evaluate(&s, &owner), Access::FULL);
        }
    }

    #[test]
    fn test_owner_cannot_edit_moderation_fields() {
        let owner = principal(Role::Contributor, vec![]);
        let s = submission(owner.id().unwrap(), None, ApprovalStatus::Pending, false);

        assert!(can_edit_field(&s, &owner, Field::Body));
        assert!(can_edit_field(&s, &owner, Field::Title));
        for field in [
            Field::Status,
            Field::Published,
            Field::Featured,
            Field::RejectionReason,
        ] {
            assert!(!can_edit_field(&s, &owner, field), "{field:?}");
        }
    }

    #[test]
    fn test_admin_sees_and_edits_everything() {
        let admin = principal(Role::NetworkAdmin, vec![]);
        for (status, published) in all_states() {
            let s = submission(Uuid::new_v4(), None, status, published);
            assert_eq!(evaluate(&s, &admin), Access::FULL);
            assert!(can_moderate(&s, &admin));
        }
    }

    #[test]
    fn test_project_members_see_project_resources() {
        let project = Uuid::new_v4();
        let s = submission(Uuid::new_v4(), Some(project), ApprovalStatus::Pending, false);

        let contributor = principal(Role::Contributor, vec![(project, "member")]);
        assert_eq!(evaluate(&s, &contributor), Access::FULL);
        assert!(!can_moderate(&s, &contributor));

        let outsider = principal(Role::ProjectLead, vec![(Uuid::new_v4(), "lead")]);
        assert_eq!(evaluate(&s, &outsider), Access::HIDDEN);
        assert!(!can_moderate(&s, &outsider));

        // Viewers do not get project-scoped access even as members.
        let viewer = principal(Role::Viewer, vec![(project, "member")]);
        assert_eq!(evaluate(&s, &viewer), Access::HIDDEN);
    }

    #[test]
    fn test_project_lead_moderates_only_led_projects() {
        let project = Uuid::new_v4();
        let s = submission(Uuid::new_v4(), Some(project), ApprovalStatus::Pending, false);

        let lead = principal(Role::ProjectLead, vec![(project, PROJECT_LEAD_MEMBER_ROLE)]);
        assert!(can_moderate(&s, &lead));
        assert!(can_edit_field(&s, &lead, Field::Status));

        let plain_member = principal(Role::ProjectLead, vec![(project, "member")]);
        assert!(!can_moderate(&s, &plain_member));

        // A contributor recorded as "lead" still lacks the global role.
        let contributor_lead =
            principal(Role::Contributor, vec![(project, PROJECT_LEAD_MEMBER_ROLE)]);
        assert!(!can_moderate(&s, &contributor_lead));

        let unscoped = submission(Uuid::new_v4(), None, ApprovalStatus::Pending, false);
        assert!(!can_moderate(&unscoped, &lead));
    }

    #[test]
    fn test_non_members_see_public_read_only() {
        let s = submission(Uuid::new_v4(), None, ApprovalStatus::Approved, true);
        for role in [Role::Viewer, Role::Contributor, Role::ProjectLead] {
            assert_eq!(evaluate(&s, &principal(role, vec![])), Access::READ_ONLY);
        }
    }
}
