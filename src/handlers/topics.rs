// handlers/topics.rs - /topics collection and /topics/:topic_id

use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::info;

use crate::api::TopicView;
use crate::app::AppState;
use crate::auth::ensure_can_modify;
use crate::database::models::{Id, NewTopic};
use crate::database::{Changes, TopicField};
use crate::error::{ApiError, StoreResultExt};
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{self, ValidationError};

use super::utils::{conflict_or_internal, load_actor, parse_id, search_term, JsonBody};
use super::{ActingUser, SearchQuery};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateTopic {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Optional; anonymous topics have no creator.
    #[serde(default)]
    pub user_id: Option<Id>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateTopic {
    #[serde(default)]
    pub user_id: Option<Id>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// GET /topics?q= - all topics, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<TopicView>> {
    let topics = state
        .store
        .list_topics(search_term(query.q.as_deref()))
        .await
        .or_internal("failed to fetch topics")?;

    Ok(ApiResponse::ok(topics.into_iter().map(TopicView::from).collect()))
}

/// POST /topics - create a topic, optionally attributed to a user
pub async fn create(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateTopic>,
) -> ApiResult<TopicView> {
    let title = validation::topic_title(&req.title)?;
    let description = validation::topic_description(&req.description)?;

    let created_by_user_id = match req.user_id {
        Some(user_id) => Some(load_actor(&state, user_id).await?.id),
        None => None,
    };

    let topic = state
        .store
        .create_topic(NewTopic {
            title,
            description,
            created_by_user_id,
        })
        .await
        .map_err(|err| conflict_or_internal(err, "topic title already exists", "failed to create topic"))?;

    info!(topic_id = topic.id, creator = ?created_by_user_id, "Created topic");
    let view = reload(&state, topic.id, "failed to fetch created topic").await?;
    Ok(ApiResponse::created(view))
}

/// PATCH /topics/:topic_id - edit title and/or description
pub async fn patch(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(req): JsonBody<UpdateTopic>,
) -> ApiResult<TopicView> {
    let topic_id = parse_id(&raw_id, "topicId")?;
    let user_id = validation::acting_user(req.user_id)?;
    if req.title.is_none() && req.description.is_none() {
        return Err(ValidationError::NothingToUpdate.into());
    }

    let topic = state
        .store
        .find_topic(topic_id)
        .await
        .or_internal("failed to fetch topic")?
        .ok_or_else(|| ApiError::not_found("topic not found"))?;
    let actor = load_actor(&state, user_id).await?;
    ensure_can_modify(&actor, topic.created_by_user_id, "topic")?;

    let mut changes = Changes::new();
    if let Some(title) = req.title.as_deref() {
        changes.set(TopicField::Title, validation::topic_title(title)?);
    }
    if let Some(description) = req.description.as_deref() {
        changes.set(TopicField::Description, validation::topic_description(description)?);
    }

    let updated = state
        .store
        .update_topic(topic_id, &changes)
        .await
        .map_err(|err| conflict_or_internal(err, "topic title already exists", "failed to update topic"))?;
    if !updated {
        return Err(ApiError::not_found("topic not found"));
    }

    info!(topic_id, actor_id = actor.id, fields = changes.len(), "Updated topic");
    let view = reload(&state, topic_id, "failed to fetch updated topic").await?;
    Ok(ApiResponse::ok(view))
}

/// DELETE /topics/:topic_id - remove a topic with its posts and comments
pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(req): JsonBody<ActingUser>,
) -> ApiResult<()> {
    let topic_id = parse_id(&raw_id, "topicId")?;
    let user_id = validation::acting_user(req.user_id)?;

    let topic = state
        .store
        .find_topic(topic_id)
        .await
        .or_internal("failed to fetch topic")?
        .ok_or_else(|| ApiError::not_found("topic not found"))?;
    let actor = load_actor(&state, user_id).await?;
    ensure_can_modify(&actor, topic.created_by_user_id, "topic")?;

    if !state.store.delete_topic(topic_id).await.or_internal("failed to delete topic")? {
        return Err(ApiError::not_found("topic not found"));
    }

    info!(topic_id, actor_id = actor.id, "Deleted topic");
    Ok(ApiResponse::no_content())
}

async fn reload(state: &AppState, topic_id: Id, message: &'static str) -> Result<TopicView, ApiError> {
    state
        .store
        .topic_with_creator(topic_id)
        .await
        .or_internal(message)?
        .map(TopicView::from)
        .ok_or_else(|| ApiError::internal_server_error(message))
}
