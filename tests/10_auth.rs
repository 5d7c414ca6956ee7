mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{error_of, TestApp};
use forum_api::database::ForumStore;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = TestApp::new()?;
    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    Ok(())
}

#[tokio::test]
async fn signup_returns_account_without_hash() -> Result<()> {
    let app = TestApp::new()?;
    let (status, body) = app
        .post("/auth/signup", json!({ "username": "  alice  ", "password": "password123" }))
        .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "signup ok");
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"]["id"].as_i64().unwrap() > 0);
    assert!(!body.to_string().contains("$2"), "hash leaked: {body}");
    Ok(())
}

#[tokio::test]
async fn signup_with_taken_username_conflicts() -> Result<()> {
    let app = TestApp::new()?;
    app.signup("alice").await?;

    let (status, body) = app
        .post("/auth/signup", json!({ "username": "alice", "password": "different-pass" }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_of(&body), "username already taken");

    // The first account keeps its own password.
    let (status, _) = app
        .post("/auth/login", json!({ "username": "alice", "password": "password123" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post("/auth/login", json!({ "username": "alice", "password": "different-pass" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn signup_validation_messages() -> Result<()> {
    let app = TestApp::new()?;
    let cases = [
        (json!({ "username": "   ", "password": "password123" }), "username cannot be empty"),
        (json!({ "username": "a".repeat(33), "password": "password123" }), "username too long (max 32)"),
        (json!({ "username": "bob", "password": "short" }), "password too short (min 8)"),
        (json!({ "username": "bob" }), "password too short (min 8)"),
    ];

    for (body, message) in cases {
        let (status, response) = app.post("/auth/signup", body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&response), message);
    }

    assert!(app.store.find_user_by_username("bob").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn login_returns_account() -> Result<()> {
    let app = TestApp::new()?;
    let id = app.signup("alice").await?;

    let (status, body) = app
        .post("/auth/login", json!({ "username": " alice ", "password": "password123" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "login ok");
    assert_eq!(body["user"], json!({ "id": id, "username": "alice", "role": "user" }));
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() -> Result<()> {
    let app = TestApp::new()?;
    app.signup("alice").await?;

    let wrong = app
        .post("/auth/login", json!({ "username": "alice", "password": "not-the-password" }))
        .await?;
    let unknown = app
        .post("/auth/login", json!({ "username": "nobody", "password": "password123" }))
        .await?;

    assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
    assert_eq!(error_of(&wrong.1), "invalid credentials");
    Ok(())
}

#[tokio::test]
async fn login_requires_both_fields() -> Result<()> {
    let app = TestApp::new()?;
    for body in [
        json!({ "username": "  ", "password": "password123" }),
        json!({ "username": "alice", "password": "" }),
        json!({}),
    ] {
        let (status, response) = app.post("/auth/login", body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&response), "username and password required");
    }
    Ok(())
}

#[tokio::test]
async fn malformed_and_unknown_fields_are_invalid_json() -> Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app.request_raw(Method::POST, "/auth/signup", "{not json").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "invalid json body");

    let (status, body) = app
        .post(
            "/auth/signup",
            json!({ "username": "alice", "password": "password123", "role": "admin" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "invalid json body");
    assert!(app.store.find_user_by_username("alice").await?.is_none());
    Ok(())
}
