//! Profile HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};

use super::service;
use super::types::{ProfileError, ProfilePage, TeamMember, UpdateProfileRequest};
use crate::api::AppState;
use crate::auth::Authenticated;

/// GET /api/profiles/team
#[utoipa::path(
    get,
    path = "/api/profiles/team",
    tag = "profiles",
    responses(
        (status = 200, description = "Team roster", body = Vec<TeamMember>),
    ),
)]
pub async fn team(State(state): State<AppState>) -> Result<Json<Vec<TeamMember>>, ProfileError> {
    let team = service::team_roster(state.store.as_ref()).await?;
    Ok(Json(team))
}

/// GET /api/profiles/me
#[utoipa::path(
    get,
    path = "/api/profiles/me",
    tag = "profiles",
    responses(
        (status = 200, description = "Own profile page", body = ProfilePage),
        (status = 401, description = "Authentication required"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn get_mine(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Result<Json<ProfilePage>, ProfileError> {
    let page = service::get_mine(state.store.as_ref(), &principal).await?;
    Ok(Json(page))
}

/// PUT /api/profiles/me
#[utoipa::path(
    put,
    path = "/api/profiles/me",
    tag = "profiles",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile page updated", body = ProfilePage),
        (status = 400, description = "Invalid or taken username/slug"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn update_mine(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfilePage>, ProfileError> {
    let page = service::update_mine(state.store.as_ref(), &principal, body).await?;
    Ok(Json(page))
}

/// GET /api/profiles/{slug}
#[utoipa::path(
    get,
    path = "/api/profiles/{slug}",
    tag = "profiles",
    params(("slug" = String, Path, description = "Profile slug")),
    responses(
        (status = 200, description = "Public profile page", body = ProfilePage),
        (status = 404, description = "No public page with that slug"),
    ),
)]
pub async fn get_public(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProfilePage>, ProfileError> {
    let page = service::get_public(state.store.as_ref(), &slug).await?;
    Ok(Json(page))
}
