// handlers/comments.rs - /posts/:post_id/comments and /comments/:comment_id

use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::info;

use crate::api::CommentView;
use crate::app::AppState;
use crate::auth::ensure_can_modify;
use crate::database::models::{Comment, Id, NewComment};
use crate::database::{Changes, CommentField};
use crate::error::{ApiError, StoreResultExt};
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{self, ValidationError};

use super::utils::{load_actor, parse_id, JsonBody};
use super::ActingUser;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateComment {
    #[serde(default)]
    pub user_id: Option<Id>,
    #[serde(default)]
    pub body: String,
    /// Reply target; must be a comment on the same post.
    #[serde(default)]
    pub parent_comment_id: Option<Id>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateComment {
    #[serde(default)]
    pub user_id: Option<Id>,
    #[serde(default)]
    pub body: Option<String>,
}

/// GET /posts/:post_id/comments - oldest first
pub async fn list(State(state): State<AppState>, Path(raw_post_id): Path<String>) -> ApiResult<Vec<CommentView>> {
    let post_id = parse_id(&raw_post_id, "postId")?;
    ensure_post_exists(&state, post_id).await?;

    let comments = state
        .store
        .list_comments(post_id)
        .await
        .or_internal("failed to fetch comments")?;

    Ok(ApiResponse::ok(comments.into_iter().map(CommentView::from).collect()))
}

/// POST /posts/:post_id/comments
pub async fn create(
    State(state): State<AppState>,
    Path(raw_post_id): Path<String>,
    JsonBody(req): JsonBody<CreateComment>,
) -> ApiResult<CommentView> {
    let post_id = parse_id(&raw_post_id, "postId")?;
    let user_id = validation::acting_user(req.user_id)?;
    let body = validation::body(&req.body)?;

    ensure_post_exists(&state, post_id).await?;
    let author = load_actor(&state, user_id).await?;

    if let Some(parent_id) = req.parent_comment_id {
        let parent = state
            .store
            .find_comment(parent_id)
            .await
            .or_internal("failed to fetch parent comment")?;
        if !parent.is_some_and(|parent| parent.post_id == post_id) {
            return Err(ApiError::bad_request("parent comment not found"));
        }
    }

    let comment = state
        .store
        .create_comment(NewComment {
            post_id,
            user_id: author.id,
            parent_comment_id: req.parent_comment_id,
            body,
        })
        .await
        .or_internal("failed to create comment")?;

    info!(
        comment_id = comment.id,
        post_id,
        user_id = author.id,
        parent = ?comment.parent_comment_id,
        "Created comment"
    );
    let view = reload(&state, comment.id, "failed to fetch created comment").await?;
    Ok(ApiResponse::created(view))
}

/// PATCH /comments/:comment_id - edit the body; stamps `editedAt`
pub async fn patch(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(req): JsonBody<UpdateComment>,
) -> ApiResult<CommentView> {
    let comment_id = parse_id(&raw_id, "commentId")?;
    let user_id = validation::acting_user(req.user_id)?;
    let Some(body) = req.body.as_deref() else {
        return Err(ValidationError::NothingToUpdate.into());
    };

    let comment = load_comment(&state, comment_id).await?;
    let actor = load_actor(&state, user_id).await?;
    ensure_can_modify(&actor, Some(comment.user_id), "comment")?;

    let mut changes = Changes::new();
    changes.set(CommentField::Body, validation::body(body)?);

    if !state
        .store
        .update_comment(comment_id, &changes)
        .await
        .or_internal("failed to update comment")?
    {
        return Err(ApiError::not_found("comment not found"));
    }

    info!(comment_id, actor_id = actor.id, "Updated comment");
    let view = reload(&state, comment_id, "failed to fetch updated comment").await?;
    Ok(ApiResponse::ok(view))
}

/// DELETE /comments/:comment_id - replies survive with no parent
pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(req): JsonBody<ActingUser>,
) -> ApiResult<()> {
    let comment_id = parse_id(&raw_id, "commentId")?;
    let user_id = validation::acting_user(req.user_id)?;

    let comment = load_comment(&state, comment_id).await?;
    let actor = load_actor(&state, user_id).await?;
    ensure_can_modify(&actor, Some(comment.user_id), "comment")?;

    if !state
        .store
        .delete_comment(comment_id)
        .await
        .or_internal("failed to delete comment")?
    {
        return Err(ApiError::not_found("comment not found"));
    }

    info!(comment_id, actor_id = actor.id, "Deleted comment");
    Ok(ApiResponse::no_content())
}

async fn ensure_post_exists(state: &AppState, post_id: Id) -> Result<(), ApiError> {
    state
        .store
        .find_post(post_id)
        .await
        .or_internal("failed to fetch post")?
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found("post not found"))
}

async fn load_comment(state: &AppState, comment_id: Id) -> Result<Comment, ApiError> {
    state
        .store
        .find_comment(comment_id)
        .await
        .or_internal("failed to fetch comment")?
        .ok_or_else(|| ApiError::not_found("comment not found"))
}

async fn reload(state: &AppState, comment_id: Id, message: &'static str) -> Result<CommentView, ApiError> {
    state
        .store
        .comment_with_author(comment_id)
        .await
        .or_internal(message)?
        .map(CommentView::from)
        .ok_or_else(|| ApiError::internal_server_error(message))
}
