//! Requester resolution.
//!
//! Turns a bearer token into a [`Requester`]. Resolution always fails closed:
//! anything short of a verified token for an existing principal whose role
//! could be loaded yields [`Requester::Anonymous`].

use tracing::{debug, warn};

use super::types::{PrincipalContext, Requester};
use crate::auth::jwt::validate_access_token;
use crate::store::IdentityStore;

/// Resolve the requester for a single logical operation.
///
/// The role and project memberships are read from `store` on every call and
/// must not be cached by callers beyond the operation they were resolved for.
pub async fn resolve<S>(store: &S, bearer: Option<&str>, jwt_secret: &str) -> Requester
where
    S: IdentityStore + ?Sized,
{
    let Some(token) = bearer else {
        return Requester::Anonymous;
    };

    let principal_id = match validate_access_token(token, jwt_secret)
        .and_then(|claims| claims.principal_id())
    {
        Ok(id) => id,
        Err(e) => {
            debug!(error = %e, "Bearer token rejected");
            return Requester::Anonymous;
        }
    };

    let principal = match store.find_principal(principal_id).await {
        Ok(Some(principal)) => principal,
        Ok(None) => {
            debug!(principal_id = %principal_id, "Token subject has no principal record");
            return Requester::Anonymous;
        }
        Err(e) => {
            warn!(
                principal_id = %principal_id,
                error = %e,
                "Identity store unavailable, resolving as anonymous"
            );
            return Requester::Anonymous;
        }
    };

    let memberships = match store.project_memberships(principal_id).await {
        Ok(memberships) => memberships,
        Err(e) => {
            warn!(
                principal_id = %principal_id,
                error = %e,
                "Failed to load project memberships, resolving as anonymous"
            );
            return Requester::Anonymous;
        }
    };

    Requester::Principal(PrincipalContext {
        id: principal.id,
        email: principal.email,
        role: principal.role,
        memberships,
    })
}
