//! HTTP integration tests for the staff moderation and role routes.

mod helpers;

use axum::http::{Method, StatusCode};
use folio_server::identity::Role;
use folio_server::store::SubmissionStore;
use helpers::TestApp;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_reject_then_approve_scenario() {
    let app = TestApp::new();
    let owner = app.principal("owner@example.com", Role::Contributor).await;
    let admin = app.principal("admin@example.com", Role::NetworkAdmin).await;
    let admin_token = app.token_for(&admin);
    let id = app.create_submission(&app.token_for(&owner), "Scenario").await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/admin/submissions/{id}/reject"),
            Some(&admin_token),
            Some(json!({ "reason": "  needs a demo video  " })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approval_status"], "rejected");
    assert_eq!(body["rejection_reason"], "needs a demo video");
    assert_eq!(body["published"], false);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/admin/submissions/{id}/approve"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approval_status"], "approved");
    assert!(body["rejection_reason"].is_null());
    assert_eq!(body["published"], true);

    // Now visible to everyone.
    let (status, _) = app
        .send(Method::GET, &format!("/api/submissions/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_blank_reason_is_rejected_without_changes() {
    let app = TestApp::new();
    let owner = app.principal("owner@example.com", Role::Contributor).await;
    let admin = app.principal("admin@example.com", Role::NetworkAdmin).await;
    let id = app.create_submission(&app.token_for(&owner), "Keep me").await;
    let before = app.store.get_submission(id).await.unwrap().unwrap();

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/admin/submissions/{id}/reject"),
            Some(&app.token_for(&admin)),
            Some(json!({ "reason": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let after = app.store.get_submission(id).await.unwrap().unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_approve_twice_is_a_no_op() {
    let app = TestApp::new();
    let owner = app.principal("owner@example.com", Role::Contributor).await;
    let admin = app.principal("admin@example.com", Role::NetworkAdmin).await;
    let admin_token = app.token_for(&admin);
    let id = app.create_submission(&app.token_for(&owner), "Twice").await;
    let uri = format!("/api/admin/submissions/{id}/approve");

    let (status, first) = app.send(Method::POST, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = app.send(Method::POST, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["updated_at"], second["updated_at"]);
}

#[tokio::test]
async fn test_publish_requires_approval() {
    let app = TestApp::new();
    let owner = app.principal("owner@example.com", Role::Contributor).await;
    let admin = app.principal("admin@example.com", Role::NetworkAdmin).await;
    let id = app.create_submission(&app.token_for(&owner), "Early").await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/admin/submissions/{id}/published"),
            Some(&app.token_for(&admin)),
            Some(json!({ "value": true })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stale_precondition_conflicts() {
    let app = TestApp::new();
    let owner = app.principal("owner@example.com", Role::Contributor).await;
    let admin = app.principal("admin@example.com", Role::NetworkAdmin).await;
    let admin_token = app.token_for(&admin);
    let owner_token = app.token_for(&owner);
    let id = app.create_submission(&owner_token, "Moving target").await;
    let loaded = app.store.get_submission(id).await.unwrap().unwrap();

    // The owner edits after the moderator loaded the item.
    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/api/submissions/{id}"),
            Some(&owner_token),
            Some(json!({ "title": "Moved" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/admin/submissions/{id}/approve"),
            Some(&admin_token),
            Some(json!({ "expected_updated_at": loaded.updated_at })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_stale_no_op_approve_conflicts() {
    let app = TestApp::new();
    let owner = app.principal("owner@example.com", Role::Contributor).await;
    let first_admin = app.principal("a@example.com", Role::NetworkAdmin).await;
    let second_admin = app.principal("b@example.com", Role::NetworkAdmin).await;
    let first_token = app.token_for(&first_admin);
    let id = app.create_submission(&app.token_for(&owner), "Shown").await;

    let (status, loaded) = app
        .send(
            Method::POST,
            &format!("/api/admin/submissions/{id}/approve"),
            Some(&first_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["published"], true);

    // Someone else takes it down in the meantime.
    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/admin/submissions/{id}/published"),
            Some(&app.token_for(&second_admin)),
            Some(json!({ "value": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/admin/submissions/{id}/approve"),
            Some(&first_token),
            Some(json!({ "expected_updated_at": loaded["updated_at"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_admin_routes_require_staff() {
    let app = TestApp::new();
    let owner = app.principal("owner@example.com", Role::Contributor).await;
    let owner_token = app.token_for(&owner);
    let id = app.create_submission(&owner_token, "Mine").await;
    let uri = format!("/api/admin/submissions/{id}/approve");

    let (status, _) = app.send(Method::POST, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::POST, &uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let stored = app.store.get_submission(id).await.unwrap().unwrap();
    assert_eq!(stored.approval_status.as_str(), "pending");
}

#[tokio::test]
async fn test_project_lead_moderates_only_their_projects() {
    let app = TestApp::new();
    let project = Uuid::new_v4();
    let other_project = Uuid::new_v4();

    let lead = app.principal("lead@example.com", Role::ProjectLead).await;
    app.store.add_membership(lead.id, project, "lead").await;
    let owner = app.principal("owner@example.com", Role::Contributor).await;
    app.store.add_membership(owner.id, project, "member").await;
    app.store.add_membership(owner.id, other_project, "member").await;

    let owner_token = app.token_for(&owner);
    let lead_token = app.token_for(&lead);

    let (_, led) = app
        .send(
            Method::POST,
            "/api/submissions",
            Some(&owner_token),
            Some(json!({ "title": "In project", "project_id": project })),
        )
        .await;
    let (_, foreign) = app
        .send(
            Method::POST,
            "/api/submissions",
            Some(&owner_token),
            Some(json!({ "title": "Elsewhere", "project_id": other_project })),
        )
        .await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/admin/submissions/{}/approve", led["id"].as_str().unwrap()),
            Some(&lead_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approval_status"], "approved");

    let (status, _) = app
        .send(
            Method::POST,
            &format!(
                "/api/admin/submissions/{}/approve",
                foreign["id"].as_str().unwrap()
            ),
            Some(&lead_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Queue and stats are reserved for network admins.
    let (status, _) = app
        .send(Method::GET, "/api/admin/submissions/stats", Some(&lead_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_queue_and_stats() {
    let app = TestApp::new();
    let owner = app.principal("owner@example.com", Role::Contributor).await;
    let admin = app.principal("admin@example.com", Role::NetworkAdmin).await;
    let owner_token = app.token_for(&owner);
    let admin_token = app.token_for(&admin);

    let first = app.create_submission(&owner_token, "First").await;
    app.create_submission(&owner_token, "Second").await;
    app.send(
        Method::POST,
        &format!("/api/admin/submissions/{first}/reject"),
        Some(&admin_token),
        Some(json!({ "reason": "Off topic" })),
    )
    .await;

    let (status, body) = app
        .send(
            Method::GET,
            "/api/admin/submissions?status=pending",
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Second");

    let (status, body) = app
        .send(
            Method::GET,
            "/api/admin/submissions/stats",
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "pending": 1, "approved": 0, "rejected": 1 }));
}

#[tokio::test]
async fn test_role_change() {
    let app = TestApp::new();
    let admin = app.principal("admin@example.com", Role::NetworkAdmin).await;
    let user = app.principal("user@example.com", Role::Viewer).await;
    let admin_token = app.token_for(&admin);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/admin/principals/{}/role", user.id),
            Some(&admin_token),
            Some(json!({ "role": "contributor" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "contributor");

    // The new role takes effect on the very next request.
    let (status, _) = app
        .send(
            Method::POST,
            "/api/submissions",
            Some(&app.token_for(&user)),
            Some(json!({ "title": "Now allowed" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/admin/principals/{}/role", admin.id),
            Some(&admin_token),
            Some(json!({ "role": "viewer" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
