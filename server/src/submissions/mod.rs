//! Content Submissions
//!
//! Creation, owner edits, views, likes and the approval state machine of
//! user-generated portfolio items.

pub mod handlers;
pub mod lifecycle;
pub mod service;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};

pub use lifecycle::{ModerationAction, ModerationState, Transition, TransitionError};
pub use types::*;

use crate::api::AppState;

/// Routes under `/api/submissions`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_submissions).post(handlers::create_submission),
        )
        .route("/mine", get(handlers::list_my_submissions))
        .route(
            "/{id}",
            get(handlers::get_submission)
                .patch(handlers::update_submission)
                .delete(handlers::delete_submission),
        )
        .route("/{id}/like", post(handlers::toggle_like))
}
