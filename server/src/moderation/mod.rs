//! Moderation
//!
//! Approve, reject, feature and publish submissions, plus the admin queue.

pub mod handlers;
pub mod processor;
pub mod types;

use axum::{
    routing::{get, post, put},
    Router,
};

pub use processor::{
    approve, moderation_queue, moderation_stats, reject, set_featured, set_published,
};
pub use types::*;

use crate::api::AppState;

/// Routes under `/api/admin/submissions`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_queue))
        .route("/stats", get(handlers::stats))
        .route("/{id}/approve", post(handlers::approve))
        .route("/{id}/reject", post(handlers::reject))
        .route("/{id}/featured", put(handlers::set_featured))
        .route("/{id}/published", put(handlers::set_published))
}
