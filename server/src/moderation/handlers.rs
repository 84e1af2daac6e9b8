//! Moderation Admin Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use super::processor;
use super::types::{
    ApproveRequest, ModerationError, ModerationQueueQuery, RejectRequest, SetFlagRequest,
};
use crate::api::AppState;
use crate::identity::Requester;
use crate::submissions::{PaginatedSubmissions, StatusCounts, Submission};

/// GET /api/admin/submissions
#[utoipa::path(
    get,
    path = "/api/admin/submissions",
    tag = "moderation",
    params(ModerationQueueQuery),
    responses(
        (status = 200, description = "Moderation queue", body = PaginatedSubmissions),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_queue(
    State(state): State<AppState>,
    requester: Requester,
    Query(query): Query<ModerationQueueQuery>,
) -> Result<Json<PaginatedSubmissions>, ModerationError> {
    let page = processor::moderation_queue(state.store.as_ref(), &requester, query).await?;
    Ok(Json(page))
}

/// GET /api/admin/submissions/stats
#[utoipa::path(
    get,
    path = "/api/admin/submissions/stats",
    tag = "moderation",
    responses(
        (status = 200, description = "Counts per status", body = StatusCounts),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn stats(
    State(state): State<AppState>,
    requester: Requester,
) -> Result<Json<StatusCounts>, ModerationError> {
    let counts = processor::moderation_stats(state.store.as_ref(), &requester).await?;
    Ok(Json(counts))
}

/// POST /api/admin/submissions/{id}/approve
#[utoipa::path(
    post,
    path = "/api/admin/submissions/{id}/approve",
    tag = "moderation",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body(content = ApproveRequest, description = "Optional precondition"),
    responses(
        (status = 200, description = "Submission approved", body = Submission),
        (status = 409, description = "Submission changed since it was loaded"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn approve(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
    body: Option<Json<ApproveRequest>>,
) -> Result<Json<Submission>, ModerationError> {
    let Json(body) = body.unwrap_or_default();
    let submission = processor::approve(
        state.store.as_ref(),
        &state.notifier,
        &requester,
        id,
        body.expected_updated_at,
    )
    .await?;
    Ok(Json(submission))
}

/// POST /api/admin/submissions/{id}/reject
#[utoipa::path(
    post,
    path = "/api/admin/submissions/{id}/reject",
    tag = "moderation",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Submission rejected", body = Submission),
        (status = 400, description = "Missing or oversized reason"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn reject(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<Submission>, ModerationError> {
    let submission = processor::reject(
        state.store.as_ref(),
        &state.notifier,
        &requester,
        id,
        body.reason,
        body.expected_updated_at,
    )
    .await?;
    Ok(Json(submission))
}

/// PUT /api/admin/submissions/{id}/featured
#[utoipa::path(
    put,
    path = "/api/admin/submissions/{id}/featured",
    tag = "moderation",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = SetFlagRequest,
    responses(
        (status = 200, description = "Featured flag set", body = Submission),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn set_featured(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
    Json(body): Json<SetFlagRequest>,
) -> Result<Json<Submission>, ModerationError> {
    let submission = processor::set_featured(
        state.store.as_ref(),
        &state.notifier,
        &requester,
        id,
        body.value,
        body.expected_updated_at,
    )
    .await?;
    Ok(Json(submission))
}

/// PUT /api/admin/submissions/{id}/published
#[utoipa::path(
    put,
    path = "/api/admin/submissions/{id}/published",
    tag = "moderation",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = SetFlagRequest,
    responses(
        (status = 200, description = "Published flag set", body = Submission),
        (status = 400, description = "Only approved submissions can be published"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn set_published(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
    Json(body): Json<SetFlagRequest>,
) -> Result<Json<Submission>, ModerationError> {
    let submission = processor::set_published(
        state.store.as_ref(),
        &state.notifier,
        &requester,
        id,
        body.value,
        body.expected_updated_at,
    )
    .await?;
    Ok(Json(submission))
}
