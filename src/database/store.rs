use async_trait::async_trait;
use thiserror::Error;

use super::changes::{Changes, CommentField, PostField, TopicField};
use super::models::{
    Comment, CommentWithAuthor, Id, NewComment, NewPost, NewTopic, NewUser, Post,
    PostWithAuthor, Role, Topic, TopicWithCreator, User,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (duplicate username or topic title).
    #[error("unique constraint violated")]
    Conflict,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence seam for every handler group.
///
/// Implementations own referential behaviour: deleting a topic removes its
/// posts and their comments, deleting a user removes their posts and comments
/// and orphans their topics, and deleting a comment clears the parent
/// reference of its replies.
#[async_trait]
pub trait ForumStore: Send + Sync {
    async fn health_check(&self) -> StoreResult<()>;

    // Users
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: Id) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn set_user_role(&self, id: Id, role: Role) -> StoreResult<bool>;
    async fn delete_user(&self, id: Id) -> StoreResult<bool>;

    // Topics
    /// Newest first; `search` is a case-insensitive substring of the title.
    async fn list_topics(&self, search: Option<&str>) -> StoreResult<Vec<TopicWithCreator>>;
    async fn find_topic(&self, id: Id) -> StoreResult<Option<Topic>>;
    async fn topic_with_creator(&self, id: Id) -> StoreResult<Option<TopicWithCreator>>;
    async fn create_topic(&self, new: NewTopic) -> StoreResult<Topic>;
    /// Inserts each topic whose title is not taken yet; returns how many were added.
    async fn seed_topics(&self, topics: Vec<NewTopic>) -> StoreResult<u64>;
    async fn update_topic(&self, id: Id, changes: &Changes<TopicField>) -> StoreResult<bool>;
    async fn delete_topic(&self, id: Id) -> StoreResult<bool>;

    // Posts
    /// Newest first; `search` matches title or body, case-insensitively.
    async fn list_posts(&self, topic_id: Id, search: Option<&str>) -> StoreResult<Vec<PostWithAuthor>>;
    async fn find_post(&self, id: Id) -> StoreResult<Option<Post>>;
    async fn post_with_author(&self, id: Id) -> StoreResult<Option<PostWithAuthor>>;
    async fn create_post(&self, new: NewPost) -> StoreResult<Post>;
    /// Stamps `edited_at` only when the body changes.
    async fn update_post(&self, id: Id, changes: &Changes<PostField>) -> StoreResult<bool>;
    async fn delete_post(&self, id: Id) -> StoreResult<bool>;

    // Comments
    /// Oldest first.
    async fn list_comments(&self, post_id: Id) -> StoreResult<Vec<CommentWithAuthor>>;
    async fn find_comment(&self, id: Id) -> StoreResult<Option<Comment>>;
    async fn comment_with_author(&self, id: Id) -> StoreResult<Option<CommentWithAuthor>>;
    async fn create_comment(&self, new: NewComment) -> StoreResult<Comment>;
    /// Stamps `edited_at` only when the body changes.
    async fn update_comment(&self, id: Id, changes: &Changes<CommentField>) -> StoreResult<bool>;
    async fn delete_comment(&self, id: Id) -> StoreResult<bool>;
}
