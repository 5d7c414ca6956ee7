#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use forum_api::auth::PasswordHasher;
use forum_api::config::AppConfig;
use forum_api::database::models::{Id, Role};
use forum_api::database::{ForumStore, MemoryStore};
use forum_api::{router, AppState};

/// The real router over a fresh in-memory store.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let passwords = PasswordHasher::new(4 /* bcrypt minimum cost */).context("bcrypt setup")?;
        let state = AppState::new(store.clone(), passwords);
        let router = router(state, &AppConfig::development());
        Ok(Self { store, router })
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let body = match body {
            Some(value) => Body::from(serde_json::to_vec(&value)?),
            None => Body::empty(),
        };
        self.send(method, uri, body).await
    }

    /// Send raw bytes as the body, for malformed-input cases.
    pub async fn request_raw(&self, method: Method, uri: &str, body: &'static str) -> Result<(StatusCode, Value)> {
        self.send(method, uri, Body::from(body)).await
    }

    async fn send(&self, method: Method, uri: &str, body: Body) -> Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response was not JSON")?
        };
        Ok((status, value))
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user_id: Id) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, Some(json!({ "userId": user_id }))).await
    }

    /// Register an account and return its id.
    pub async fn signup(&self, username: &str) -> Result<Id> {
        let (status, body) = self
            .post("/auth/signup", json!({ "username": username, "password": "password123" }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "signup failed: {status} {body}");
        body["user"]["id"].as_i64().context("signup response without id")
    }

    /// Register an account and give it `role` directly in the store.
    pub async fn signup_as(&self, username: &str, role: Role) -> Result<Id> {
        let id = self.signup(username).await?;
        anyhow::ensure!(self.store.set_user_role(id, role).await?, "role change failed");
        Ok(id)
    }

    pub async fn create_topic(&self, title: &str, user_id: Option<Id>) -> Result<Id> {
        let mut body = json!({ "title": title, "description": "" });
        if let Some(user_id) = user_id {
            body["userId"] = json!(user_id);
        }
        let (status, body) = self.post("/topics", body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "topic create failed: {status} {body}");
        body["id"].as_i64().context("topic response without id")
    }

    pub async fn create_post(&self, topic_id: Id, user_id: Id, title: &str, text: &str) -> Result<Id> {
        let (status, body) = self
            .post(
                &format!("/topics/{topic_id}/posts"),
                json!({ "userId": user_id, "title": title, "body": text }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "post create failed: {status} {body}");
        body["id"].as_i64().context("post response without id")
    }

    pub async fn create_comment(&self, post_id: Id, user_id: Id, text: &str, parent: Option<Id>) -> Result<Id> {
        let mut body = json!({ "userId": user_id, "body": text });
        if let Some(parent) = parent {
            body["parentCommentId"] = json!(parent);
        }
        let (status, body) = self.post(&format!("/posts/{post_id}/comments"), body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "comment create failed: {status} {body}");
        body["id"].as_i64().context("comment response without id")
    }
}

/// Parse an RFC 3339 timestamp field such as `updatedAt`.
pub fn timestamp(value: &Value) -> chrono::DateTime<chrono::FixedOffset> {
    let raw = value.as_str().unwrap_or_default();
    chrono::DateTime::parse_from_rfc3339(raw).unwrap_or_else(|err| panic!("bad timestamp {raw:?}: {err}"))
}

/// Give the clock a moment so a later write gets a later timestamp.
pub async fn tick() {
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
}

pub fn error_of(body: &Value) -> &str {
    body["error"].as_str().unwrap_or_default()
}
