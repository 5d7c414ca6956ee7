pub mod comment;
pub mod post;
pub mod topic;
pub mod user;

/// Store-assigned primary key (BIGSERIAL).
pub type Id = i64;

pub use comment::{Comment, CommentWithAuthor, NewComment};
pub use post::{NewPost, Post, PostWithAuthor};
pub use topic::{NewTopic, Topic, TopicWithCreator};
pub use user::{NewUser, ParseRoleError, Role, User, UserSummary};
