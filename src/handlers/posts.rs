// handlers/posts.rs - /topics/:topic_id/posts and /posts/:post_id

use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::info;

use crate::api::PostView;
use crate::app::AppState;
use crate::auth::ensure_can_modify;
use crate::database::models::{Id, NewPost};
use crate::database::{Changes, PostField};
use crate::error::{ApiError, StoreResultExt};
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{self, ValidationError};

use super::utils::{load_actor, parse_id, search_term, JsonBody};
use super::{ActingUser, SearchQuery};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreatePost {
    #[serde(default)]
    pub user_id: Option<Id>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdatePost {
    #[serde(default)]
    pub user_id: Option<Id>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// GET /topics/:topic_id/posts?q= - posts in a topic, newest first
pub async fn list(
    State(state): State<AppState>,
    Path(raw_topic_id): Path<String>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<PostView>> {
    let topic_id = parse_id(&raw_topic_id, "topicId")?;
    ensure_topic_exists(&state, topic_id).await?;

    let posts = state
        .store
        .list_posts(topic_id, search_term(query.q.as_deref()))
        .await
        .or_internal("failed to fetch posts")?;

    Ok(ApiResponse::ok(posts.into_iter().map(PostView::from).collect()))
}

/// POST /topics/:topic_id/posts
pub async fn create(
    State(state): State<AppState>,
    Path(raw_topic_id): Path<String>,
    JsonBody(req): JsonBody<CreatePost>,
) -> ApiResult<PostView> {
    let topic_id = parse_id(&raw_topic_id, "topicId")?;
    let user_id = validation::acting_user(req.user_id)?;
    let title = validation::post_title(&req.title)?;
    let body = validation::body(&req.body)?;

    ensure_topic_exists(&state, topic_id).await?;
    let author = load_actor(&state, user_id).await?;

    let post = state
        .store
        .create_post(NewPost {
            topic_id,
            user_id: author.id,
            title,
            body,
        })
        .await
        .or_internal("failed to create post")?;

    info!(post_id = post.id, topic_id, user_id = author.id, "Created post");
    let view = reload(&state, post.id, "failed to fetch created post").await?;
    Ok(ApiResponse::created(view))
}

/// GET /posts/:post_id
pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<PostView> {
    let post_id = parse_id(&raw_id, "postId")?;

    let post = state
        .store
        .post_with_author(post_id)
        .await
        .or_internal("failed to fetch post")?
        .ok_or_else(|| ApiError::not_found("post not found"))?;

    Ok(ApiResponse::ok(PostView::from(post)))
}

/// PATCH /posts/:post_id - edit title and/or body; stamps `editedAt`
pub async fn patch(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(req): JsonBody<UpdatePost>,
) -> ApiResult<PostView> {
    let post_id = parse_id(&raw_id, "postId")?;
    let user_id = validation::acting_user(req.user_id)?;
    if req.title.is_none() && req.body.is_none() {
        return Err(ValidationError::NothingToUpdate.into());
    }

    let post = state
        .store
        .find_post(post_id)
        .await
        .or_internal("failed to fetch post")?
        .ok_or_else(|| ApiError::not_found("post not found"))?;
    let actor = load_actor(&state, user_id).await?;
    ensure_can_modify(&actor, Some(post.user_id), "post")?;

    let mut changes = Changes::new();
    if let Some(title) = req.title.as_deref() {
        changes.set(PostField::Title, validation::post_title(title)?);
    }
    if let Some(body) = req.body.as_deref() {
        changes.set(PostField::Body, validation::body(body)?);
    }

    if !state.store.update_post(post_id, &changes).await.or_internal("failed to update post")? {
        return Err(ApiError::not_found("post not found"));
    }

    info!(post_id, actor_id = actor.id, fields = changes.len(), "Updated post");
    let view = reload(&state, post_id, "failed to fetch updated post").await?;
    Ok(ApiResponse::ok(view))
}

/// DELETE /posts/:post_id - remove a post and its comments
pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(req): JsonBody<ActingUser>,
) -> ApiResult<()> {
    let post_id = parse_id(&raw_id, "postId")?;
    let user_id = validation::acting_user(req.user_id)?;

    let post = state
        .store
        .find_post(post_id)
        .await
        .or_internal("failed to fetch post")?
        .ok_or_else(|| ApiError::not_found("post not found"))?;
    let actor = load_actor(&state, user_id).await?;
    ensure_can_modify(&actor, Some(post.user_id), "post")?;

    if !state.store.delete_post(post_id).await.or_internal("failed to delete post")? {
        return Err(ApiError::not_found("post not found"));
    }

    info!(post_id, actor_id = actor.id, "Deleted post");
    Ok(ApiResponse::no_content())
}

async fn ensure_topic_exists(state: &AppState, topic_id: Id) -> Result<(), ApiError> {
    state
        .store
        .find_topic(topic_id)
        .await
        .or_internal("failed to fetch topic")?
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found("topic not found"))
}

async fn reload(state: &AppState, post_id: Id, message: &'static str) -> Result<PostView, ApiError> {
    state
        .store
        .post_with_author(post_id)
        .await
        .or_internal(message)?
        .map(PostView::from)
        .ok_or_else(|| ApiError::internal_server_error(message))
}
