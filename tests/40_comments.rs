mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{error_of, tick, timestamp, TestApp};
use forum_api::database::models::Role;

async fn fixture(app: &TestApp) -> Result<(i64, i64)> {
    let alice = app.signup("alice").await?;
    let topic = app.create_topic("Tech", None).await?;
    let post = app.create_post(topic, alice, "Hello", "World").await?;
    Ok((alice, post))
}

#[tokio::test]
async fn comments_list_oldest_first() -> Result<()> {
    let app = TestApp::new()?;
    let (alice, post) = fixture(&app).await?;
    let bob = app.signup("bob").await?;

    app.create_comment(post, alice, "first", None).await?;
    app.create_comment(post, bob, "second", None).await?;
    app.create_comment(post, alice, "third", None).await?;

    let (status, body) = app.get(&format!("/posts/{post}/comments")).await?;
    assert_eq!(status, StatusCode::OK);
    let bodies: Vec<&str> = body.as_array().unwrap().iter().map(|c| c["body"].as_str().unwrap()).collect();
    assert_eq!(bodies, ["first", "second", "third"]);
    assert_eq!(body[1]["author"], json!({ "id": bob, "username": "bob" }));
    assert!(body[0].get("parentCommentId").is_none());
    assert!(body[0].get("editedAt").is_none());
    Ok(())
}

#[tokio::test]
async fn comment_create_validation() -> Result<()> {
    let app = TestApp::new()?;
    let (alice, post) = fixture(&app).await?;
    let uri = format!("/posts/{post}/comments");

    let (status, body) = app.post(&uri, json!({ "body": "hi" })).await?;
    assert_eq!((status, error_of(&body)), (StatusCode::BAD_REQUEST, "userId is required"));

    let (status, body) = app.post(&uri, json!({ "userId": alice, "body": "  " })).await?;
    assert_eq!((status, error_of(&body)), (StatusCode::BAD_REQUEST, "body cannot be empty"));

    let (status, body) = app.post(&uri, json!({ "userId": 999, "body": "hi" })).await?;
    assert_eq!((status, error_of(&body)), (StatusCode::BAD_REQUEST, "user not found"));

    let (status, body) = app.post("/posts/999/comments", json!({ "userId": alice, "body": "hi" })).await?;
    assert_eq!((status, error_of(&body)), (StatusCode::NOT_FOUND, "post not found"));

    let (status, body) = app.get("/posts/999/comments").await?;
    assert_eq!((status, error_of(&body)), (StatusCode::NOT_FOUND, "post not found"));

    let (_, comments) = app.get(&uri).await?;
    assert_eq!(comments, json!([]));
    Ok(())
}

#[tokio::test]
async fn replies_must_target_the_same_post() -> Result<()> {
    let app = TestApp::new()?;
    let (alice, post) = fixture(&app).await?;
    let topic = app.create_topic("Games", None).await?;
    let other_post = app.create_post(topic, alice, "Other", "post").await?;
    let foreign = app.create_comment(other_post, alice, "elsewhere", None).await?;
    let parent = app.create_comment(post, alice, "parent", None).await?;

    let reply = app.create_comment(post, alice, "reply", Some(parent)).await?;
    let (_, comments) = app.get(&format!("/posts/{post}/comments")).await?;
    assert_eq!(comments[1]["id"], reply);
    assert_eq!(comments[1]["parentCommentId"], parent);

    for bad_parent in [foreign, 999] {
        let (status, body) = app
            .post(
                &format!("/posts/{post}/comments"),
                json!({ "userId": alice, "body": "lost", "parentCommentId": bad_parent }),
            )
            .await?;
        assert_eq!((status, error_of(&body)), (StatusCode::BAD_REQUEST, "parent comment not found"));
    }
    Ok(())
}

#[tokio::test]
async fn deleting_a_parent_orphans_its_replies() -> Result<()> {
    let app = TestApp::new()?;
    let (alice, post) = fixture(&app).await?;
    let parent = app.create_comment(post, alice, "parent", None).await?;
    let reply = app.create_comment(post, alice, "reply", Some(parent)).await?;

    let (status, _) = app.delete(&format!("/comments/{parent}"), alice).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, comments) = app.get(&format!("/posts/{post}/comments")).await?;
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["id"], reply);
    assert!(comments[0].get("parentCommentId").is_none());
    Ok(())
}

#[tokio::test]
async fn patch_comment_body() -> Result<()> {
    let app = TestApp::new()?;
    let (alice, post) = fixture(&app).await?;
    let comment = app.create_comment(post, alice, "typo", None).await?;
    let uri = format!("/comments/{comment}");

    let (status, body) = app.patch(&uri, json!({ "userId": alice })).await?;
    assert_eq!((status, error_of(&body)), (StatusCode::BAD_REQUEST, "nothing to update"));

    let (_, listed) = app.get(&format!("/posts/{post}/comments")).await?;
    let before = listed[0].clone();
    assert!(before.get("editedAt").is_none());
    tick().await;

    let (status, body) = app.patch(&uri, json!({ "userId": alice, "body": " fixed " })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["body"], "fixed");
    assert!(body["editedAt"].is_string());
    assert!(timestamp(&body["updatedAt"]) > timestamp(&before["updatedAt"]));
    assert_eq!(body["createdAt"], before["createdAt"]);

    let (status, body) = app.patch(&uri, json!({ "userId": alice, "body": "" })).await?;
    assert_eq!((status, error_of(&body)), (StatusCode::BAD_REQUEST, "body cannot be empty"));

    let (status, body) = app.patch(&uri, json!({ "userId": alice, "title": "no" })).await?;
    assert_eq!((status, error_of(&body)), (StatusCode::BAD_REQUEST, "invalid json body"));

    let (status, body) = app.patch("/comments/x", json!({ "userId": alice, "body": "b" })).await?;
    assert_eq!((status, error_of(&body)), (StatusCode::BAD_REQUEST, "invalid commentId"));

    let (status, body) = app.patch("/comments/999", json!({ "userId": alice, "body": "b" })).await?;
    assert_eq!((status, error_of(&body)), (StatusCode::NOT_FOUND, "comment not found"));
    Ok(())
}

#[tokio::test]
async fn comment_permissions() -> Result<()> {
    let app = TestApp::new()?;
    let (alice, post) = fixture(&app).await?;
    let bob = app.signup("bob").await?;
    let admin = app.signup_as("root", Role::Admin).await?;
    let comment = app.create_comment(post, alice, "mine", None).await?;
    let uri = format!("/comments/{comment}");

    let (status, _) = app.patch(&uri, json!({ "userId": bob, "body": "yours" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&uri, bob).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, comments) = app.get(&format!("/posts/{post}/comments")).await?;
    assert_eq!(comments[0]["body"], "mine");

    let (status, _) = app.delete(&uri, admin).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.delete(&uri, admin).await?;
    assert_eq!((status, error_of(&body)), (StatusCode::NOT_FOUND, "comment not found"));
    Ok(())
}
