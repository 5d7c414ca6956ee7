use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Id, UserSummary};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Topic {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub created_by_user_id: Option<Id>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A topic with its creator resolved. `creator` is `None` for anonymous
/// topics and for topics whose creator has been deleted.
#[derive(Debug, Clone)]
pub struct TopicWithCreator {
    pub topic: Topic,
    pub creator: Option<UserSummary>,
}

#[derive(Debug, Clone)]
pub struct NewTopic {
    pub title: String,
    pub description: String,
    pub created_by_user_id: Option<Id>,
}
