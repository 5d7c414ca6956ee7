// handlers/mod.rs - one module per resource, routed from app.rs

use serde::Deserialize;

use crate::database::models::Id;

pub mod auth;
pub mod comments;
pub mod health;
pub mod posts;
pub mod topics;
pub mod utils;

// Re-export handler functions for use in routing
pub use auth::login as auth_login;
pub use auth::signup as auth_signup;

pub use topics::create as topic_create;
pub use topics::delete as topic_delete;
pub use topics::list as topic_list;
pub use topics::patch as topic_patch;

pub use posts::create as post_create;
pub use posts::delete as post_delete;
pub use posts::get as post_get;
pub use posts::list as post_list;
pub use posts::patch as post_patch;

pub use comments::create as comment_create;
pub use comments::delete as comment_delete;
pub use comments::list as comment_list;
pub use comments::patch as comment_patch;

pub use health::get as health_get;

/// `?q=` on the collection endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Body of every DELETE: who is asking.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ActingUser {
    #[serde(default)]
    pub user_id: Option<Id>,
}
