use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Id, UserSummary};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Comment {
    pub id: Id,
    pub post_id: Id,
    pub user_id: Id,
    /// Reply target. Cleared, not cascaded, when the parent is deleted.
    pub parent_comment_id: Option<Id>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author: UserSummary,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Id,
    pub user_id: Id,
    pub parent_comment_id: Option<Id>,
    pub body: String,
}
