//! Admin Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Errors from the admin gate.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// No principal on the request.
    #[error("Authentication required")]
    Unauthenticated,

    /// Principal lacks a staff role.
    #[error("Project lead or network admin privileges required")]
    NotStaff,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            Self::NotStaff => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        };
        (
            status,
            Json(serde_json::json!({ "error": code, "message": self.to_string() })),
        )
            .into_response()
    }
}
