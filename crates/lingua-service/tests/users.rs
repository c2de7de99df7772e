//! User integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn create_user_starts_as_student() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/users")
        .json(&json!({"email": "A@X.com", "name": "A", "photoURL": "http://img/a.png"}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["role"], "student");
    assert_eq!(body["photoURL"], "http://img/a.png");
    assert!(!body["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let harness = TestHarness::new();
    harness
        .server
        .post("/users")
        .json(&json!({"email": "a@x.com"}))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post("/users")
        .json(&json!({"email": " a@X.com "}))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["message"], "user already exists");

    let users: Vec<serde_json::Value> = harness.server.get("/users").await.json();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn invalid_email_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/users")
        .json(&json!({"email": "not-an-email"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn role_lookup_for_unknown_email_is_none() {
    let harness = TestHarness::new();

    let response = harness.server.get("/users/role/ghost@x.com").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["role"], "none");
}

#[tokio::test]
async fn role_update_is_visible_in_lookup() {
    let harness = TestHarness::new();
    let created: serde_json::Value = harness
        .server
        .post("/users")
        .json(&json!({"email": "t@x.com"}))
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    harness
        .server
        .patch(&format!("/users/{id}"))
        .json(&json!({"role": "instructor"}))
        .await
        .assert_status_ok();

    let body: serde_json::Value = harness.server.get("/users/role/t@x.com").await.json();
    assert_eq!(body["role"], "instructor");
}

#[tokio::test]
async fn role_update_for_missing_user_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .patch("/users/NOPE")
        .json(&json!({"role": "admin"}))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_role_rejected() {
    let harness = TestHarness::new();
    let created: serde_json::Value = harness
        .server
        .post("/users")
        .json(&json!({"email": "t@x.com"}))
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let response = harness
        .server
        .patch(&format!("/users/{id}"))
        .json(&json!({"role": "superuser"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
