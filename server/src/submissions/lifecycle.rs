//! Approval state machine.
//!
//! Pure transition rules for the moderator-owned fields of a submission.
//! Nothing here touches storage; callers persist the returned state in a
//! single write.
//!
//! Status transitions:
//!
//! ```text
//!   pending ──approve──▶ approved ◀──approve── rejected
//!      │                   │  ▲                   ▲
//!      └──────reject───────┼──┼───────────────────┤
//!                          └──┴──────reject───────┘
//! ```
//!
//! Nothing ever moves back to `pending`. `published` and `featured` are
//! explicit in every output state and are never derived from the status.

use serde::Serialize;

use super::types::ApprovalStatus;

/// Maximum accepted length of a rejection reason, in characters.
pub const MAX_REJECTION_REASON_LENGTH: usize = 1000;

/// The moderator-owned fields of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationState {
    pub status: ApprovalStatus,
    pub published: bool,
    pub featured: bool,
    pub rejection_reason: Option<String>,
}

impl ModerationState {
    /// State of a freshly created submission.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            status: ApprovalStatus::Pending,
            published: false,
            featured: false,
            rejection_reason: None,
        }
    }

    /// Check the two structural invariants:
    /// `published ⇒ approved`, and `rejection_reason` present iff rejected.
    pub fn check_invariants(&self) -> Result<(), TransitionError> {
        if self.published && self.status != ApprovalStatus::Approved {
            return Err(TransitionError::PublishRequiresApproval);
        }
        if self.rejection_reason.is_some() != (self.status == ApprovalStatus::Rejected) {
            return Err(TransitionError::ReasonMismatch);
        }
        Ok(())
    }
}

/// A moderator action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject { reason: String },
    SetFeatured(bool),
    SetPublished(bool),
}

impl ModerationAction {
    /// Audit/log name of the action.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject { .. } => "reject",
            Self::SetFeatured(_) => "set_featured",
            Self::SetPublished(_) => "set_published",
        }
    }
}

/// Result of applying an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The action changes the state; persist the new state.
    Changed(ModerationState),
    /// The action is a no-op on the current state; nothing to persist.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("A rejection reason is required")]
    EmptyReason,

    #[error("Rejection reason must be at most 1000 characters")]
    ReasonTooLong,

    #[error("Only approved submissions can be published")]
    PublishRequiresApproval,

    #[error("Rejection reason must be present exactly when rejected")]
    ReasonMismatch,
}

/// Whether the status graph has an edge `from → to`.
#[must_use]
pub const fn is_valid_status_transition(from: ApprovalStatus, to: ApprovalStatus) -> bool {
    use ApprovalStatus::{Approved, Pending, Rejected};
    matches!(
        (from, to),
        (Pending | Rejected, Approved) | (Pending | Approved | Rejected, Rejected)
    )
}

/// Trim and validate a rejection reason.
pub fn normalize_rejection_reason(reason: &str) -> Result<String, TransitionError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(TransitionError::EmptyReason);
    }
    if reason.chars().count() > MAX_REJECTION_REASON_LENGTH {
        return Err(TransitionError::ReasonTooLong);
    }
    Ok(reason.to_string())
}

/// Apply `action` to `current`.
///
/// - `Approve` on an approved submission is a no-op.
/// - `Reject` on a rejected submission replaces the reason.
/// - `SetPublished(true)` requires the submission to be approved.
pub fn apply(
    current: &ModerationState,
    action: &ModerationAction,
) -> Result<Transition, TransitionError> {
    let next = match action {
        ModerationAction::Approve => {
            if current.status == ApprovalStatus::Approved {
                return Ok(Transition::Unchanged);
            }
            ModerationState {
                status: ApprovalStatus::Approved,
                published: true,
                featured: current.featured,
                rejection_reason: None,
            }
        }
        ModerationAction::Reject { reason } => ModerationState {
            status: ApprovalStatus::Rejected,
            published: false,
            featured: current.featured,
            rejection_reason: Some(normalize_rejection_reason(reason)?),
        },
        ModerationAction::SetFeatured(featured) => ModerationState {
            status: current.status,
            published: current.published,
            featured: *featured,
            rejection_reason: current.rejection_reason.clone(),
        },
        ModerationAction::SetPublished(published) => {
            if *published && current.status != ApprovalStatus::Approved {
                return Err(TransitionError::PublishRequiresApproval);
            }
            ModerationState {
                status: current.status,
                published: *published,
                featured: current.featured,
                rejection_reason: current.rejection_reason.clone(),
            }
        }
    };

    debug_assert!(
        next.status == current.status || is_valid_status_transition(current.status, next.status)
    );
    next.check_invariants()?;

    if next == *current {
        Ok(Transition::Unchanged)
    } else {
        Ok(Transition::Changed(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(status: ApprovalStatus, published: bool) -> ModerationState {
        ModerationState {
            status,
            published,
            featured: false,
            rejection_reason: (status == ApprovalStatus::Rejected).then(|| "old".to_string()),
        }
    }

    fn changed(t: Transition) -> ModerationState {
        match t {
            Transition::Changed(s) => s,
            Transition::Unchanged => panic!("expected a state change"),
        }
    }

    #[test]
    fn test_initial_state_is_pending_unpublished() {
        let s = ModerationState::initial();
        assert_eq!(s.status, ApprovalStatus::Pending);
        assert!(!s.published);
        assert!(!s.featured);
        assert!(s.rejection_reason.is_none());
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn test_status_graph() {
        use ApprovalStatus::{Approved, Pending, Rejected};
        assert!(is_valid_status_transition(Pending, Approved));
        assert!(is_valid_status_transition(Pending, Rejected));
        assert!(is_valid_status_transition(Rejected, Approved));
        assert!(is_valid_status_transition(Approved, Rejected));
        assert!(!is_valid_status_transition(Approved, Pending));
        assert!(!is_valid_status_transition(Rejected, Pending));
    }

    #[test]
    fn test_approve_from_pending_and_rejected() {
        for from in [ApprovalStatus::Pending, ApprovalStatus::Rejected] {
            let next = changed(apply(&state(from, false), &ModerationAction::Approve).unwrap());
            assert_eq!(next.status, ApprovalStatus::Approved);
            assert!(next.published);
            assert!(next.rejection_reason.is_none());
        }
    }

    #[test]
    fn test_approve_is_idempotent() {
        let approved = state(ApprovalStatus::Approved, true);
        assert_eq!(
            apply(&approved, &ModerationAction::Approve).unwrap(),
            Transition::Unchanged
        );

        // An unpublished approved item stays unpublished; approve does not re-publish.
        let hidden = state(ApprovalStatus::Approved, false);
        assert_eq!(
            apply(&hidden, &ModerationAction::Approve).unwrap(),
            Transition::Unchanged
        );
    }

    #[test]
    fn test_reject_sets_reason_and_unpublishes() {
        let next = changed(
            apply(
                &state(ApprovalStatus::Approved, true),
                &ModerationAction::Reject {
                    reason: "  needs more detail ".into(),
                },
            )
            .unwrap(),
        );
        assert_eq!(next.status, ApprovalStatus::Rejected);
        assert!(!next.published);
        assert_eq!(next.rejection_reason.as_deref(), Some("needs more detail"));
    }

    #[test]
    fn test_reject_again_replaces_reason() {
        let next = changed(
            apply(
                &state(ApprovalStatus::Rejected, false),
                &ModerationAction::Reject {
                    reason: "new".into(),
                },
            )
            .unwrap(),
        );
        assert_eq!(next.rejection_reason.as_deref(), Some("new"));
    }

    #[test]
    fn test_reject_requires_reason() {
        for reason in ["", "   ", "\n\t"] {
            let result = apply(
                &state(ApprovalStatus::Pending, false),
                &ModerationAction::Reject {
                    reason: reason.into(),
                },
            );
            assert_eq!(result, Err(TransitionError::EmptyReason));
        }

        let long = "x".repeat(MAX_REJECTION_REASON_LENGTH + 1);
        assert_eq!(
            normalize_rejection_reason(&long),
            Err(TransitionError::ReasonTooLong)
        );
    }

    #[test]
    fn test_feature_flag_is_independent_of_status() {
        for from in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
        ] {
            let current = state(from, false);
            let next = changed(apply(&current, &ModerationAction::SetFeatured(true)).unwrap());
            assert!(next.featured);
            assert_eq!(next.status, from);
            assert_eq!(next.rejection_reason, current.rejection_reason);
        }
    }

    #[test]
    fn test_publish_requires_approval() {
        for from in [ApprovalStatus::Pending, ApprovalStatus::Rejected] {
            assert_eq!(
                apply(&state(from, false), &ModerationAction::SetPublished(true)),
                Err(TransitionError::PublishRequiresApproval)
            );
        }

        let next = changed(
            apply(
                &state(ApprovalStatus::Approved, false),
                &ModerationAction::SetPublished(true),
            )
            .unwrap(),
        );
        assert!(next.published);
    }

    #[test]
    fn test_unpublish_keeps_status() {
        let next = changed(
            apply(
                &state(ApprovalStatus::Approved, true),
                &ModerationAction::SetPublished(false),
            )
            .unwrap(),
        );
        assert_eq!(next.status, ApprovalStatus::Approved);
        assert!(!next.published);

        assert_eq!(
            apply(
                &state(ApprovalStatus::Pending, false),
                &ModerationAction::SetPublished(false)
            )
            .unwrap(),
            Transition::Unchanged
        );
    }

    #[test]
    fn test_invariants_hold_after_every_action() {
        let actions = [
            ModerationAction::Approve,
            ModerationAction::Reject {
                reason: "why".into(),
            },
            ModerationAction::SetFeatured(true),
            ModerationAction::SetFeatured(false),
            ModerationAction::SetPublished(true),
            ModerationAction::SetPublished(false),
        ];

        let mut current = ModerationState::initial();
        // Walk a long mixed sequence; every reachable state must satisfy the invariants.
        for round in 0..4 {
            for (i, action) in actions.iter().enumerate() {
                if (i + round) % 3 == 0 {
                    continue;
                }
                if let Ok(Transition::Changed(next)) = apply(&current, action) {
                    assert!(next.check_invariants().is_ok(), "{next:?}");
                    current = next;
                }
            }
        }
    }

    #[test]
    fn test_check_invariants_detects_violations() {
        let bad_publish = ModerationState {
            status: ApprovalStatus::Pending,
            published: true,
            featured: false,
            rejection_reason: None,
        };
        assert_eq!(
            bad_publish.check_invariants(),
            Err(TransitionError::PublishRequiresApproval)
        );

        let bad_reason = ModerationState {
            status: ApprovalStatus::Approved,
            published: true,
            featured: false,
            rejection_reason: Some("stale".into()),
        };
        assert_eq!(
            bad_reason.check_invariants(),
            Err(TransitionError::ReasonMismatch)
        );
    }
}
