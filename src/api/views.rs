//! Public JSON shapes.
//!
//! Views are built only from rows reloaded from the store, so a response always
//! reflects committed state. None of them can carry a password hash, and only
//! `AccountView` (returned to the account owner at signup/login) carries a role.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::{
    CommentWithAuthor, Id, PostWithAuthor, Role, TopicWithCreator, User, UserSummary,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPublic {
    pub id: Id,
    pub username: String,
}

impl From<UserSummary> for UserPublic {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicView {
    pub id: Id,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_user_id: Option<Id>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserPublic>,
}

impl From<TopicWithCreator> for TopicView {
    fn from(row: TopicWithCreator) -> Self {
        let TopicWithCreator { topic, creator } = row;
        Self {
            id: topic.id,
            title: topic.title,
            description: topic.description,
            created_by_user_id: topic.created_by_user_id,
            created_at: topic.created_at,
            updated_at: topic.updated_at,
            author: creator.map(UserPublic::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Id,
    pub topic_id: Id,
    pub user_id: Id,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    pub author: UserPublic,
}

impl From<PostWithAuthor> for PostView {
    fn from(row: PostWithAuthor) -> Self {
        let PostWithAuthor { post, author } = row;
        Self {
            id: post.id,
            topic_id: post.topic_id,
            user_id: post.user_id,
            title: post.title,
            body: post.body,
            created_at: post.created_at,
            updated_at: post.updated_at,
            edited_at: post.edited_at,
            author: author.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Id,
    pub post_id: Id,
    pub user_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<Id>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    pub author: UserPublic,
}

impl From<CommentWithAuthor> for CommentView {
    fn from(row: CommentWithAuthor) -> Self {
        let CommentWithAuthor { comment, author } = row;
        Self {
            id: comment.id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            parent_comment_id: comment.parent_comment_id,
            body: comment.body,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            edited_at: comment.edited_at,
            author: author.into(),
        }
    }
}

/// The caller's own account, returned from signup and login.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: Id,
    pub username: String,
    pub role: Role,
}

impl From<&User> for AccountView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: AccountView,
}
