//! Profile Pages
//!
//! Owner-managed personal pages, resolvable publicly by slug once published
//! and made public.

pub mod handlers;
pub mod service;
pub mod slug;
pub mod types;

use axum::{routing::get, Router};

pub use slug::{slugify, validate_slug, RESERVED_SLUGS};
pub use types::*;

use crate::api::AppState;

/// Routes under `/api/profiles`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/team", get(handlers::team))
        .route("/me", get(handlers::get_mine).put(handlers::update_mine))
        .route("/{slug}", get(handlers::get_public))
}
