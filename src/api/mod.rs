pub mod views;

pub use views::{AccountView, AuthResponse, CommentView, PostView, TopicView, UserPublic};
