//! Shared helpers for HTTP integration tests.
//!
//! Every test gets its own in-memory store and router, so tests are
//! independent and need no database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use folio_server::api::{create_router, AppState};
use folio_server::auth::jwt;
use folio_server::config::Config;
use folio_server::identity::{Principal, Role};
use folio_server::notifications::NotificationDispatcher;
use folio_server::store::MemoryStore;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

/// Router plus direct handle on its backing store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: Arc<Config>,
}

impl TestApp {
    /// Fresh app on an empty in-memory store with notifications disabled.
    pub fn new() -> Self {
        let config = Config::default_for_test();
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config.clone(), NotificationDispatcher::disabled());

        Self {
            router: create_router(state),
            store,
            config: Arc::new(config),
        }
    }

    /// Create a principal with the given role.
    pub async fn principal(&self, email: &str, role: Role) -> Principal {
        self.store.add_principal(email, role).await
    }

    /// Access token acting as `principal`.
    pub fn token_for(&self, principal: &Principal) -> String {
        jwt::issue_access_token(
            principal.id,
            Some(&principal.email),
            &self.config.jwt_secret,
            3600,
        )
        .expect("Failed to issue test token")
    }

    /// Start building a request, optionally authenticated.
    pub fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Send a request through a clone of the router.
    pub async fn oneshot(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    /// Send a request with an optional JSON body and return status plus parsed body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Self::request(method, uri, token);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self.oneshot(request).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    /// Create a submission as `token` and return its id.
    pub async fn create_submission(&self, token: &str, title: &str) -> Uuid {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/submissions",
                Some(token),
                Some(serde_json::json!({ "title": title, "body": { "blocks": [] } })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("Response carries an id")
    }
}

/// Collect a response body as JSON; empty bodies become `Value::Null`.
pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }
}
