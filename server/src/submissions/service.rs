//! Submission operations.
//!
//! Every operation takes the resolved [`Requester`] explicitly. Submissions
//! the requester cannot see are reported as [`SubmissionError::NotFound`],
//! never as forbidden.

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::types::{
    clamp_paging, ContentEdit, CreateSubmissionRequest, LikeOutcome, ListSubmissionsQuery,
    NewSubmission, PaginatedSubmissions, Submission, SubmissionError, SubmissionQuery,
    UpdateSubmissionRequest,
};
use crate::identity::Requester;
use crate::notifications::{Notification, NotificationDispatcher, NotificationEvent};
use crate::store::SubmissionStore;
use crate::visibility::{can_edit_field, evaluate, Access, Field};

/// Trim a title and reject it if nothing is left.
fn normalize_title(title: &str) -> Result<String, SubmissionError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(SubmissionError::Validation(
            "Title must not be blank".to_string(),
        ));
    }
    Ok(title.to_string())
}

/// Load a submission and check it is visible to `requester`.
pub(crate) async fn load_visible<S>(
    store: &S,
    requester: &Requester,
    id: Uuid,
) -> Result<(Submission, Access), SubmissionError>
where
    S: SubmissionStore + ?Sized,
{
    let submission = store
        .get_submission(id)
        .await?
        .ok_or(SubmissionError::NotFound)?;
    let access = evaluate(&submission, requester);
    if !access.visible {
        return Err(SubmissionError::NotFound);
    }
    Ok((submission, access))
}

/// Create a submission in the pending state.
pub async fn create<S>(
    store: &S,
    notifier: &NotificationDispatcher,
    requester: &Requester,
    req: CreateSubmissionRequest,
) -> Result<Submission, SubmissionError>
where
    S: SubmissionStore + ?Sized,
{
    let principal = requester
        .principal()
        .ok_or(SubmissionError::Unauthenticated)?;
    if !principal.role.can_submit() {
        return Err(SubmissionError::Forbidden);
    }

    req.validate()?;
    let title = normalize_title(&req.title)?;

    if let Some(project_id) = req.project_id {
        if !requester.is_network_admin() && !principal.is_member_of(project_id) {
            return Err(SubmissionError::Forbidden);
        }
    }

    let body = if req.body.is_null() {
        serde_json::json!({})
    } else {
        req.body
    };

    let submission = store
        .insert_submission(NewSubmission {
            owner_id: principal.id,
            project_id: req.project_id,
            title,
            body,
        })
        .await?;

    info!(
        submission_id = %submission.id,
        owner_id = %submission.owner_id,
        "Submission created"
    );
    notifier.notify(Notification::for_submission(
        NotificationEvent::SubmissionCreated,
        &submission,
    ));

    Ok(submission)
}

/// Apply owner edits. Moderation state is left as it is.
pub async fn edit<S>(
    store: &S,
    requester: &Requester,
    id: Uuid,
    req: UpdateSubmissionRequest,
) -> Result<Submission, SubmissionError>
where
    S: SubmissionStore + ?Sized,
{
    if requester.principal().is_none() {
        return Err(SubmissionError::Unauthenticated);
    }
    req.validate()?;
    let title = req.title.as_deref().map(normalize_title).transpose()?;

    let (submission, access) = load_visible(store, requester, id).await?;
    let touched = [
        (title.is_some(), Field::Title),
        (req.body.is_some(), Field::Body),
    ];
    if !access.editable
        || touched
            .iter()
            .any(|(set, field)| *set && !can_edit_field(&submission, requester, *field))
    {
        return Err(SubmissionError::Forbidden);
    }

    store
        .update_content(
            id,
            ContentEdit {
                title,
                body: req.body,
            },
        )
        .await?
        .ok_or(SubmissionError::NotFound)
}

/// Delete a submission. Owner or network admin only.
pub async fn delete<S>(store: &S, requester: &Requester, id: Uuid) -> Result<(), SubmissionError>
where
    S: SubmissionStore + ?Sized,
{
    if requester.principal().is_none() {
        return Err(SubmissionError::Unauthenticated);
    }

    let (submission, _) = load_visible(store, requester, id).await?;
    if !requester.is(submission.owner_id) && !requester.is_network_admin() {
        return Err(SubmissionError::Forbidden);
    }

    if !store.delete_submission(id).await? {
        return Err(SubmissionError::NotFound);
    }

    info!(submission_id = %id, deleted_by = ?requester.id(), "Submission deleted");
    Ok(())
}

/// Fetch a visible submission and count the view.
pub async fn view<S>(
    store: &S,
    requester: &Requester,
    id: Uuid,
) -> Result<Submission, SubmissionError>
where
    S: SubmissionStore + ?Sized,
{
    let (submission, _) = load_visible(store, requester, id).await?;

    // Counting is best-effort; a failed increment still serves the read.
    match store.increment_views(id).await {
        Ok(Some(counted)) => Ok(counted),
        Ok(None) => Err(SubmissionError::NotFound),
        Err(e) => {
            warn!(submission_id = %id, error = %e, "Failed to count view");
            Ok(submission)
        }
    }
}

/// Like or unlike a visible submission.
pub async fn toggle_like<S>(
    store: &S,
    requester: &Requester,
    id: Uuid,
) -> Result<LikeOutcome, SubmissionError>
where
    S: SubmissionStore + ?Sized,
{
    let principal_id = requester.id().ok_or(SubmissionError::Unauthenticated)?;
    load_visible(store, requester, id).await?;

    store
        .toggle_like(id, principal_id)
        .await?
        .ok_or(SubmissionError::NotFound)
}

/// Public gallery: approved and published submissions, newest first.
pub async fn list_visible<S>(
    store: &S,
    query: ListSubmissionsQuery,
) -> Result<PaginatedSubmissions, SubmissionError>
where
    S: SubmissionStore + ?Sized,
{
    let (limit, offset) = clamp_paging(query.limit, query.offset);
    let items = store
        .list_submissions(&SubmissionQuery {
            featured: query.featured,
            limit,
            offset,
            ..SubmissionQuery::public()
        })
        .await?;

    Ok(PaginatedSubmissions {
        items,
        limit,
        offset,
    })
}

/// The requester's own submissions in every state.
pub async fn list_mine<S>(
    store: &S,
    requester: &Requester,
    query: ListSubmissionsQuery,
) -> Result<PaginatedSubmissions, SubmissionError>
where
    S: SubmissionStore + ?Sized,
{
    let owner_id = requester.id().ok_or(SubmissionError::Unauthenticated)?;
    let (limit, offset) = clamp_paging(query.limit, query.offset);
    let items = store
        .list_submissions(&SubmissionQuery {
            owner_id: Some(owner_id),
            featured: query.featured,
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
