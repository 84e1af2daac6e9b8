//! Moderation Action Processor
//!
//! Authorizes a moderator, runs the approval state machine, persists the
//! resulting state in one write and hands the outcome to the notifier.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::types::{ModerationError, ModerationQueueQuery};
use crate::identity::Requester;
use crate::notifications::{Notification, NotificationDispatcher, NotificationEvent};
use crate::store::{IdentityStore, ModerationWrite, SubmissionStore};
use crate::submissions::lifecycle::{self, normalize_rejection_reason};
use crate::submissions::{
    clamp_paging, ModerationAction, PaginatedSubmissions, StatusCounts, Submission,
    SubmissionQuery, Transition,
};
use crate::visibility::{can_moderate, evaluate};

/// Event to announce after `action` committed, if any.
const fn event_for(action: &ModerationAction) -> Option<NotificationEvent> {
    match action {
        ModerationAction::Approve => Some(NotificationEvent::SubmissionApproved),
        ModerationAction::Reject { .. } => Some(NotificationEvent::SubmissionRejected),
        ModerationAction::SetFeatured(true) => Some(NotificationEvent::SubmissionFeatured),
        ModerationAction::SetFeatured(false) => None,
        ModerationAction::SetPublished(true) => Some(NotificationEvent::SubmissionPublished),
        ModerationAction::SetPublished(false) => Some(NotificationEvent::SubmissionUnpublished),
    }
}

/// Apply a moderation action to submission `id`.
///
/// A no-op action (approving an approved submission, re-setting a flag to
/// its current value) returns the current state without writing.
#[tracing::instrument(
    skip(store, notifier, actor, action),
    fields(actor_id = ?actor.id(), action = action.name())
)]
pub async fn moderate<S>(
    store: &S,
    notifier: &NotificationDispatcher,
    actor: &Requester,
    id: Uuid,
    action: ModerationAction,
    expected_updated_at: Option<DateTime<Utc>>,
) -> Result<Submission, ModerationError>
where
    S: IdentityStore + SubmissionStore + ?Sized,
{
    if actor.principal().is_none() {
        return Err(ModerationError::Unauthenticated);
    }

    // Reasons are checked before the store is touched.
    let action = match action {
        ModerationAction::Reject { reason } => ModerationAction::Reject {
            reason: normalize_rejection_reason(&reason)?,
        },
        other => other,
    };

    let current = store
        .get_submission(id)
        .await?
        .ok_or(ModerationError::NotFound)?;
    if !can_moderate(&current, actor) {
        return Err(if evaluate(&current, actor).visible {
            ModerationError::Forbidden
        } else {
            ModerationError::NotFound
        });
    }

    let next = match lifecycle::apply(&current.moderation_state(), &action)? {
        // A no-op still honors the precondition: the caller acted on a stale view.
        Transition::Unchanged
            if expected_updated_at.is_some_and(|t| t != current.updated_at) =>
        {
            return Err(ModerationError::Conflict);
        }
        Transition::Unchanged => return Ok(current),
        Transition::Changed(next) => next,
    };

    let updated = match store.apply_moderation(id, next, expected_updated_at).await? {
        ModerationWrite::Applied(updated) => updated,
        ModerationWrite::NotFound => return Err(ModerationError::NotFound),
        ModerationWrite::Stale => return Err(ModerationError::Conflict),
    };

    info!(
        submission_id = %id,
        status = updated.approval_status.as_str(),
        published = updated.published,
        featured = updated.featured,
        "Moderation action applied"
    );

    if let Some(event) = event_for(&action) {
        notify_owner(store, notifier, event, &updated).await;
    }

    Ok(updated)
}

/// Hand a notification to the dispatcher, attaching the owner's address when
/// it can be found. Lookup failures only cost the email.
async fn notify_owner<S>(
    store: &S,
    notifier: &NotificationDispatcher,
    event: NotificationEvent,
    submission: &Submission,
) where
    S: IdentityStore + ?Sized,
{
    let mut notification = Notification::for_submission(event, submission);
    match store.find_principal(submission.owner_id).await {
        Ok(Some(owner)) => notification = notification.with_owner_email(owner.email),
        Ok(None) => {}
        Err(e) => warn!(
            submission_id = %submission.id,
            error = %e,
            "Owner lookup for notification failed"
        ),
    }
    notifier.notify(notification);
}

pub async fn approve<S>(
    store: &S,
    notifier: &NotificationDispatcher,
    actor: &Requester,
    id: Uuid,
    expected_updated_at: Option<DateTime<Utc>>,
) -> Result<Submission, ModerationError>
where
    S: IdentityStore + SubmissionStore + ?Sized,
{
    moderate(
        store,
        notifier,
        actor,
        id,
        ModerationAction::Approve,
        expected_updated_at,
    )
    .await
}

pub async fn reject<S>(
    store: &S,
    notifier: &NotificationDispatcher,
    actor: &Requester,
    id: Uuid,
    reason: String,
    expected_updated_at: Option<DateTime<Utc>>,
) -> Result<Submission, ModerationError>
where
    S: IdentityStore + SubmissionStore + ?Sized,
{
    moderate(
        store,
        notifier,
        actor,
        id,
        ModerationAction::Reject { reason },
        expected_updated_at,
    )
    .await
}

pub async fn set_featured<S>(
    store: &S,
    notifier: &NotificationDispatcher,
    actor: &Requester,
    id: Uuid,
    featured: bool,
    expected_updated_at: Option<DateTime<Utc>>,
) -> Result<Submission, ModerationError>
where
    S: IdentityStore + SubmissionStore + ?Sized,
{
    moderate(
        store,
        notifier,
        actor,
        id,
        ModerationAction::SetFeatured(featured),
        expected_updated_at,
    )
    .await
}

pub async fn set_published<S>(
    store: &S,
    notifier: &NotificationDispatcher,
    actor: &Requester,
    id: Uuid,
    published: bool,
    expected_updated_at: Option<DateTime<Utc>>,
) -> Result<Submission, ModerationError>
where
    S: IdentityStore + SubmissionStore + ?Sized,
{
    moderate(
        store,
        notifier,
        actor,
        id,
        ModerationAction::SetPublished(published),
        expected_updated_at,
    )
    .await
}

fn require_network_admin(actor: &Requester) -> Result<(), ModerationError> {
    match actor.principal() {
        None => Err(ModerationError::Unauthenticated),
        Some(_) if actor.is_network_admin() => Ok(()),
        Some(_) => Err(ModerationError::Forbidden),
    }
}

/// Submissions in every state, optionally filtered by status. Network admins only.
pub async fn moderation_queue<S>(
    store: &S,
    actor: &Requester,
    query: ModerationQueueQuery,
) -> Result<PaginatedSubmissions, ModerationError>
where
    S: SubmissionStore + ?Sized,
{
    require_network_admin(actor)?;
    let (limit, offset) = clamp_paging(query.limit, query.offset);
    let items = store
        .list_submissions(&SubmissionQuery {
            status: query.status,
            limit,
            offset,
            ..SubmissionQuery::default()
        })
        .await?;

    Ok(PaginatedSubmissions {
        items,
        limit,
        offset,
    })
}

/// Submission counts per status. Network admins only.
pub async fn moderation_stats<S>(
    store: &S,
    actor: &Requester,
) -> Result<StatusCounts, ModerationError>
where
    S: SubmissionStore + ?Sized,
{
    require_network_admin(actor)?;
    Ok(store.count_by_status().await?)
}
