mod common;

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{Value, json};

use common::TestApp;

#[tokio::test]
async fn test_redirect_returns_302_and_counts_visit() {
    let app = TestApp::new();
    let server = app.server();
    let (_, token) = app.create_user("alice").await;

    server
        .post("/v1/urls")
        .authorization_bearer(&token)
        .json(&json!({ "url": "https://example.com/target?q=1" }))
        .await;

    let response = server.get("/6sdd").await;

    response.assert_status(axum::http::StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/target?q=1");

    let body = server
        .get("/v1/urls")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(body["items"][0]["visit_count"], 1);
}

#[tokio::test]
async fn test_redirect_unknown_code() {
    let app = TestApp::new();
    let server = app.server();

    let response = server.get("/nope").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_malformed_code() {
    let app = TestApp::new();
    let server = app.server();

    server.get("/not-base62!").await.assert_status_not_found();
    server.get("/aaaaaaaaaaaaaaaaaaaa").await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_expired_link() {
    let app = TestApp::new();
    let server = app.server();
    let (_, token) = app.create_user("alice").await;

    let expired = (Utc::now() - ChronoDuration::minutes(1)).to_rfc3339();
    server
        .post("/v1/urls")
        .authorization_bearer(&token)
        .json(&json!({ "url": "https://example.com", "expires_at": expired }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    server.get("/6sdd").await.assert_status_not_found();
}
