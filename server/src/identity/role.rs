//! Platform roles.
//!
//! Every principal holds exactly one role. Roles are totally ordered and a
//! higher role holds every permission of the roles below it, except where an
//! operation states otherwise (role assignment is `network-admin` only).

use serde::{Deserialize, Serialize};

/// Platform role, ordered from least to most privileged.
///
/// Variant order is significant: the derived `Ord` is the privilege order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    utoipa::ToSchema,
)]
#[sqlx(type_name = "principal_role", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Read-only member of the community.
    Viewer,
    /// May submit portfolio items and edit their own content.
    Contributor,
    /// Leads projects; may moderate submissions of projects they lead.
    ProjectLead,
    /// Full platform administrator.
    NetworkAdmin,
}

impl Role {
    /// Wire name of the role.
    ///
    /// ```
    /// use folio_server::identity::Role;
    ///
    /// assert_eq!(Role::ProjectLead.as_str(), "project-lead");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Contributor => "contributor",
            Self::ProjectLead => "project-lead",
            Self::NetworkAdmin => "network-admin",
        }
    }

    /// All roles, least privileged first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Viewer,
            Self::Contributor,
            Self::ProjectLead,
            Self::NetworkAdmin,
        ]
    }

    /// Whether this role grants at least the privileges of `other`.
    #[must_use]
    pub fn at_least(self, other: Self) -> bool {
        self >= other
    }

    /// Whether principals with this role may create submissions.
    #[must_use]
    pub fn can_submit(self) -> bool {
        self.at_least(Self::Contributor)
    }

    /// Whether principals with this role may assign roles to others.
    #[must_use]
    pub const fn can_assign_roles(self) -> bool {
        matches!(self, Self::NetworkAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
