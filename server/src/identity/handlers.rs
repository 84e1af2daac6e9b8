//! Role administration handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::types::{ChangeRoleRequest, Principal, Requester, RoleError};
use crate::api::AppState;

/// PUT /api/admin/principals/{id}/role
/// Assign a new role to another principal (network admin only).
#[utoipa::path(
    put,
    path = "/api/admin/principals/{id}/role",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Principal ID")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = Principal),
        (status = 400, description = "Cannot change own role"),
        (status = 403, description = "Network admin required"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn change_role(
    State(state): State<AppState>,
    requester: Requester,
    Path(principal_id): Path<Uuid>,
    Json(body): Json<ChangeRoleRequest>,
) -> Result<Json<Principal>, RoleError> {
    let principal =
        super::assign::change_role(state.store.as_ref(), &requester, principal_id, body.role)
            .await?;
    Ok(Json(principal))
}
