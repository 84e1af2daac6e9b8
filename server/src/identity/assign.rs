//! Role assignment.

use tracing::info;
use uuid::Uuid;

use super::role::Role;
use super::types::{Principal, Requester, RoleError};
use crate::store::IdentityStore;

/// Change the role of `target_id`.
///
/// Only a network admin may assign roles, and never to themselves.
#[tracing::instrument(skip(store, actor), fields(actor_id = ?actor.id()))]
pub async fn change_role<S>(
    store: &S,
    actor: &Requester,
    target_id: Uuid,
    role: Role,
) -> Result<Principal, RoleError>
where
    S: IdentityStore + ?Sized,
{
    let actor_role = actor.role().ok_or(RoleError::Unauthenticated)?;
    if !actor_role.can_assign_roles() {
        return Err(RoleError::Forbidden);
    }
    if actor.is(target_id) {
        return Err(RoleError::SelfChange);
    }

    let principal = store
        .set_role(target_id, role)
        .await?
        .ok_or(RoleError::NotFound)?;

    info!(target_id = %target_id, role = %role, "Principal role changed");
    Ok(principal)
}
