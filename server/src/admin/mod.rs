//! Admin Module
//!
//! Staff-only endpoints: the moderation queue and actions, and role
//! assignment.

pub mod middleware;
pub mod types;

use axum::{middleware::from_fn, routing::put, Router};

use crate::api::AppState;
use crate::{identity, moderation};

pub use middleware::require_staff;
pub use types::AdminError;

/// Create the admin router, nested under `/api/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/submissions", moderation::router())
        .route(
            "/principals/{id}/role",
            put(identity::handlers::change_role),
        )
        .layer(from_fn(require_staff))
}
