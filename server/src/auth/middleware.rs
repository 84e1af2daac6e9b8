//! Authentication Middleware

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::error::AuthError;
use crate::api::AppState;
use crate::identity::{self, PrincipalContext, Requester};

/// Extract the bearer token from the Authorization header, if well-formed.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware resolving the [`Requester`] for every request.
///
/// Never rejects: a missing, malformed or unverifiable token, or an identity
/// store outage, yields an anonymous requester. Handlers decide whether an
/// anonymous requester is acceptable.
pub async fn resolve_requester(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Request is not Sync; nothing borrowed from it may cross the await.
    let token = bearer_token(request.headers()).map(str::to_owned);
    let requester = identity::resolve(
        state.store.as_ref(),
        token.as_deref(),
        &state.config.jwt_secret,
    )
    .await;

    request.extensions_mut().insert(requester);
    next.run(request).await
}

/// Extractor for the current requester. Falls back to anonymous when the
/// resolution middleware did not run.
impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}

/// Extractor that requires a signed-in principal.
///
/// ```ignore
/// async fn handler(Authenticated(principal): Authenticated) -> impl IntoResponse {
///     format!("Hello, {}!", principal.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authenticated(pub PrincipalContext);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Requester>() {
            Some(Requester::Principal(principal)) => Ok(Self(principal.clone())),
            _ => Err(AuthError::AuthenticationRequired),
        }
    }
}
