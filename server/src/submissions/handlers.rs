//! Submission HTTP Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::service;
use super::types::{
    CreateSubmissionRequest, LikeOutcome, ListSubmissionsQuery, PaginatedSubmissions, Submission,
    SubmissionError, UpdateSubmissionRequest,
};
use crate::api::AppState;
use crate::identity::Requester;

/// GET /api/submissions
#[utoipa::path(
    get,
    path = "/api/submissions",
    tag = "submissions",
    params(ListSubmissionsQuery),
    responses(
        (status = 200, description = "Public gallery", body = PaginatedSubmissions),
    ),
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<ListSubmissionsQuery>,
) -> Result<Json<PaginatedSubmissions>, SubmissionError> {
    let page = service::list_visible(state.store.as_ref(), query).await?;
    Ok(Json(page))
}

/// POST /api/submissions
#[utoipa::path(
    post,
    path = "/api/submissions",
    tag = "submissions",
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission created", body = Submission),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn create_submission(
    State(state): State<AppState>,
    requester: Requester,
    Json(body): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<Submission>), SubmissionError> {
    let submission =
        service::create(state.store.as_ref(), &state.notifier, &requester, body).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /api/submissions/mine
#[utoipa::path(
    get,
    path = "/api/submissions/mine",
    tag = "submissions",
    params(ListSubmissionsQuery),
    responses(
        (status = 200, description = "Own submissions in every state", body = PaginatedSubmissions),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_my_submissions(
    State(state): State<AppState>,
    requester: Requester,
    Query(query): Query<ListSubmissionsQuery>,
) -> Result<Json<PaginatedSubmissions>, SubmissionError> {
    let page = service::list_mine(state.store.as_ref(), &requester, query).await?;
    Ok(Json(page))
}

/// GET /api/submissions/{id}
#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    tag = "submissions",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission", body = Submission),
        (status = 404, description = "Not found or not visible"),
    ),
)]
pub async fn get_submission(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<Json<Submission>, SubmissionError> {
    let submission = service::view(state.store.as_ref(), &requester, id).await?;
    Ok(Json(submission))
}

/// PATCH /api/submissions/{id}
#[utoipa::path(
    patch,
    path = "/api/submissions/{id}",
    tag = "submissions",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = UpdateSubmissionRequest,
    responses(
        (status = 200, description = "Submission updated", body = Submission),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn update_submission(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSubmissionRequest>,
) -> Result<Json<Submission>, SubmissionError> {
    let submission = service::edit(state.store.as_ref(), &requester, id, body).await?;
    Ok(Json(submission))
}

/// DELETE /api/submissions/{id}
#[utoipa::path(
    delete,
    path = "/api/submissions/{id}",
    tag = "submissions",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 204, description = "Submission deleted"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn delete_submission(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, SubmissionError> {
    service::delete(state.store.as_ref(), &requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/submissions/{id}/like
#[utoipa::path(
    post,
    path = "/api/submissions/{id}/like",
    tag = "submissions",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Like toggled", body = LikeOutcome),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn toggle_like(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeOutcome>, SubmissionError> {
    let outcome = service::toggle_like(state.store.as_ref(), &requester, id).await?;
    Ok(Json(outcome))
}
