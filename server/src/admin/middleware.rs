//! Admin authorization middleware.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use super::types::AdminError;
use crate::identity::{Requester, Role};

/// Middleware that requires a staff principal (project lead or above).
///
/// Finer-grained checks (which submissions a lead may moderate, who may
/// change roles) stay with the operations themselves.
#[tracing::instrument(skip(request, next))]
pub async fn require_staff(request: Request, next: Next) -> Result<Response, AdminError> {
    let role = request
        .extensions()
        .get::<Requester>()
        .and_then(Requester::role)
        .ok_or(AdminError::Unauthenticated)?;

    if !role.at_least(Role::ProjectLead) {
        tracing::debug!(role = %role, "Non-staff principal refused at admin gate");
        return Err(AdminError::NotStaff);
    }

    Ok(next.run(request).await)
}
