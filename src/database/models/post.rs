use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Id, UserSummary};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Post {
    pub id: Id,
    pub topic_id: Id,
    pub user_id: Id,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: UserSummary,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub topic_id: Id,
    pub user_id: Id,
    pub title: String,
    pub body: String,
}
