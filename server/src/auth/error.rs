//! Authentication Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid or malformed token.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// Operation requires a signed-in principal.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// JWT encoding error.
    #[error("Token error")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            Self::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            Self::AuthenticationRequired => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            Self::Jwt(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;
