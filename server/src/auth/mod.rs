//! Authentication
//!
//! Verifies bearer tokens issued by the hosted identity provider and resolves
//! the requester for each request. Sign-up, login and session refresh are
//! handled by the identity provider itself.

mod error;
pub mod jwt;
mod middleware;

pub use error::{AuthError, AuthResult, ErrorResponse};
pub use middleware::{bearer_token, resolve_requester, Authenticated};
