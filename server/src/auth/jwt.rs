//! JWT Validation
//!
//! Access tokens are issued by the hosted identity provider and signed with a
//! shared HS256 secret. The token only establishes *who* the caller is; the
//! role is always loaded from the identity store afterwards.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AuthError, AuthResult};

/// JWT claims carried by access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal ID as UUID string).
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Email as known to the identity provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    /// Parse the subject as a principal ID.
    pub fn principal_id(&self) -> AuthResult<Uuid> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Issue an access token for `principal_id`.
///
/// Deployed servers only validate tokens minted by the identity provider.
/// Nothing in the request path calls this; the integration-test helpers use
/// it to act as a given principal.
pub fn issue_access_token(
    principal_id: Uuid,
    email: Option<&str>,
    secret: &str,
    expiry_seconds: i64,
) -> AuthResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: principal_id.to_string(),
        exp: (now + Duration::seconds(expiry_seconds)).timestamp(),
        iat: now.timestamp(),
        email: email.map(str::to_string),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Validate and decode an access token.
pub fn validate_access_token(token: &str, secret: &str) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
