//! API Router and Application State
//!
//! Central routing configuration and shared state.

use std::sync::Arc;

use axum::{extract::State, middleware::from_fn_with_state, routing::get, Json, Router};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    admin, auth, config::Config, identity, moderation, notifications::NotificationDispatcher,
    profiles, store::Store, submissions,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn Store>,
    /// Server configuration
    pub config: Arc<Config>,
    /// Notification fan-out
    pub notifier: NotificationDispatcher,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: Config, notifier: NotificationDispatcher) -> Self {
        Self {
            store,
            config: Arc::new(config),
            notifier,
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/api/submissions", submissions::router())
        .nest("/api/profiles", profiles::router())
        .nest("/api/admin", admin::router());

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .merge(api_routes)
        // API documentation
        .merge(api_docs())
        // Every route sees a resolved requester, anonymous or not
        .layer(from_fn_with_state(state.clone(), auth::resolve_requester))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Number of configured notification channels
    notification_channels: usize,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        notification_channels: state.notifier.channel_count(),
    })
}

/// OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(title = "Folio API", description = "Portfolio submissions, moderation and profile pages"),
    paths(
        submissions::handlers::list_submissions,
        submissions::handlers::create_submission,
        submissions::handlers::list_my_submissions,
        submissions::handlers::get_submission,
        submissions::handlers::update_submission,
        submissions::handlers::delete_submission,
        submissions::handlers::toggle_like,
        moderation::handlers::list_queue,
        moderation::handlers::stats,
        moderation::handlers::approve,
        moderation::handlers::reject,
        moderation::handlers::set_featured,
        moderation::handlers::set_published,
        identity::handlers::change_role,
        profiles::handlers::team,
        profiles::handlers::get_mine,
        profiles::handlers::update_mine,
        profiles::handlers::get_public,
    ),
    components(schemas(
        submissions::Submission,
        submissions::ApprovalStatus,
        submissions::CreateSubmissionRequest,
        submissions::UpdateSubmissionRequest,
        submissions::PaginatedSubmissions,
        submissions::LikeOutcome,
        submissions::StatusCounts,
        moderation::ApproveRequest,
        moderation::RejectRequest,
        moderation::SetFlagRequest,
        identity::Principal,
        identity::Role,
        identity::ChangeRoleRequest,
        profiles::ProfilePage,
        profiles::UpdateProfileRequest,
        profiles::TeamMember,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "submissions", description = "Submission lifecycle"),
        (name = "moderation", description = "Staff moderation actions"),
        (name = "admin", description = "Role administration"),
        (name = "profiles", description = "Profile pages"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// API documentation routes.
fn api_docs() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
