//! In-process `ForumStore` used by the test-suite and `--in-memory` mode.
//!
//! Rows live in id-ordered maps behind a single `RwLock`, so every trait call
//! is atomic. Comment threading is kept as a separate parent -> children
//! adjacency map; comments never own each other.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::changes::{Changes, CommentField, PostField, TopicField};
use super::models::{
    Comment, CommentWithAuthor, Id, NewComment, NewPost, NewTopic, NewUser, Post,
    PostWithAuthor, Role, Topic, TopicWithCreator, User, UserSummary,
};
use super::store::{ForumStore, StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    last_id: Id,
    users: BTreeMap<Id, User>,
    topics: BTreeMap<Id, Topic>,
    posts: BTreeMap<Id, Post>,
    comments: BTreeMap<Id, Comment>,
    replies: HashMap<Id, BTreeSet<Id>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

impl Tables {
    fn next_id(&mut self) -> Id {
        self.last_id += 1;
        self.last_id
    }

    fn summary(&self, user_id: Id) -> Option<UserSummary> {
        self.users.get(&user_id).map(User::summary)
    }

    fn with_creator(&self, topic: &Topic) -> TopicWithCreator {
        TopicWithCreator {
            topic: topic.clone(),
            creator: topic.created_by_user_id.and_then(|id| self.summary(id)),
        }
    }

    fn post_with_author(&self, post: &Post) -> Option<PostWithAuthor> {
        Some(PostWithAuthor {
            post: post.clone(),
            author: self.summary(post.user_id)?,
        })
    }

    fn comment_with_author(&self, comment: &Comment) -> Option<CommentWithAuthor> {
        Some(CommentWithAuthor {
            comment: comment.clone(),
            author: self.summary(comment.user_id)?,
        })
    }

    fn title_taken(&self, title: &str, except: Option<Id>) -> bool {
        self.topics
            .values()
            .any(|t| t.title == title && Some(t.id) != except)
    }

    fn remove_comment(&mut self, id: Id) -> bool {
        let Some(comment) = self.comments.remove(&id) else {
            return false;
        };
        if let Some(parent) = comment.parent_comment_id {
            if let Some(siblings) = self.replies.get_mut(&parent) {
                siblings.remove(&id);
                if siblings.is_empty() {
                    self.replies.remove(&parent);
                }
            }
        }
        for child in self.replies.remove(&id).unwrap_or_default() {
            if let Some(reply) = self.comments.get_mut(&child) {
                reply.parent_comment_id = None;
            }
        }
        true
    }

    fn remove_post(&mut self, id: Id) -> bool {
        if self.posts.remove(&id).is_none() {
            return false;
        }
        let doomed: Vec<Id> = self
            .comments
            .values()
            .filter(|c| c.post_id == id)
            .map(|c| c.id)
            .collect();
        for comment_id in doomed {
            self.remove_comment(comment_id);
        }
        true
    }
}

#[async_trait]
impl ForumStore for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut db = self.inner.write().await;
        if db.users.values().any(|u| u.username == new.username) {
            return Err(StoreError::Conflict);
        }
        let now = Utc::now();
        let user = User {
            id: db.next_id(),
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        db.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Id) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let db = self.inner.read().await;
        Ok(db.users.values().find(|u| u.username == username).cloned())
    }

    async fn set_user_role(&self, id: Id, role: Role) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        Ok(match db.users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete_user(&self, id: Id) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        if db.users.remove(&id).is_none() {
            return Ok(false);
        }

        let posts: Vec<Id> = db.posts.values().filter(|p| p.user_id == id).map(|p| p.id).collect();
        for post_id in posts {
            db.remove_post(post_id);
        }
        let comments: Vec<Id> = db
            .comments
            .values()
            .filter(|c| c.user_id == id)
            .map(|c| c.id)
            .collect();
        for comment_id in comments {
            db.remove_comment(comment_id);
        }
        for topic in db.topics.values_mut() {
            if topic.created_by_user_id == Some(id) {
                topic.created_by_user_id = None;
            }
        }
        Ok(true)
    }

    async fn list_topics(&self, search: Option<&str>) -> StoreResult<Vec<TopicWithCreator>> {
        let db = self.inner.read().await;
        let needle = search.map(str::to_lowercase);
        let mut topics: Vec<&Topic> = db
            .topics
            .values()
            .filter(|t| needle.as_deref().map_or(true, |n| contains_ci(&t.title, n)))
            .collect();
        topics.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(topics.into_iter().map(|t| db.with_creator(t)).collect())
    }

    async fn find_topic(&self, id: Id) -> StoreResult<Option<Topic>> {
        Ok(self.inner.read().await.topics.get(&id).cloned())
    }

    async fn topic_with_creator(&self, id: Id) -> StoreResult<Option<TopicWithCreator>> {
        let db = self.inner.read().await;
        Ok(db.topics.get(&id).map(|t| db.with_creator(t)))
    }

    async fn create_topic(&self, new: NewTopic) -> StoreResult<Topic> {
        let mut db = self.inner.write().await;
        if db.title_taken(&new.title, None) {
            return Err(StoreError::Conflict);
        }
        let now = Utc::now();
        let topic = Topic {
            id: db.next_id(),
            title: new.title,
            description: new.description,
            created_by_user_id: new.created_by_user_id,
            created_at: now,
            updated_at: now,
        };
        db.topics.insert(topic.id, topic.clone());
        Ok(topic)
    }

    async fn seed_topics(&self, topics: Vec<NewTopic>) -> StoreResult<u64> {
        let mut inserted = 0;
        for topic in topics {
            match self.create_topic(topic).await {
                Ok(_) => inserted += 1,
                Err(StoreError::Conflict) => {}
                Err(other) => return Err(other),
            }
        }
        Ok(inserted)
    }

    async fn update_topic(&self, id: Id, changes: &Changes<TopicField>) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        if let Some(title) = changes.get(TopicField::Title) {
            if db.title_taken(title, Some(id)) {
                return Err(StoreError::Conflict);
            }
        }
        let Some(topic) = db.topics.get_mut(&id) else {
            return Ok(false);
        };
        for (field, value) in changes.iter() {
            match field {
                TopicField::Title => topic.title = value.to_string(),
                TopicField::Description => topic.description = value.to_string(),
            }
        }
        topic.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_topic(&self, id: Id) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        if db.topics.remove(&id).is_none() {
            return Ok(false);
        }
        let posts: Vec<Id> = db.posts.values().filter(|p| p.topic_id == id).map(|p| p.id).collect();
        for post_id in posts {
            db.remove_post(post_id);
        }
        Ok(true)
    }

    async fn list_posts(&self, topic_id: Id, search: Option<&str>) -> StoreResult<Vec<PostWithAuthor>> {
        let db = self.inner.read().await;
        let needle = search.map(str::to_lowercase);
        let mut posts: Vec<&Post> = db
            .posts
            .values()
            .filter(|p| p.topic_id == topic_id)
            .filter(|p| {
                needle
                    .as_deref()
                    .map_or(true, |n| contains_ci(&p.title, n) || contains_ci(&p.body, n))
            })
            .collect();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(posts.into_iter().filter_map(|p| db.post_with_author(p)).collect())
    }

    async fn find_post(&self, id: Id) -> StoreResult<Option<Post>> {
        Ok(self.inner.read().await.posts.get(&id).cloned())
    }

    async fn post_with_author(&self, id: Id) -> StoreResult<Option<PostWithAuthor>> {
        let db = self.inner.read().await;
        Ok(db.posts.get(&id).and_then(|p| db.post_with_author(p)))
    }

    async fn create_post(&self, new: NewPost) -> StoreResult<Post> {
        let mut db = self.inner.write().await;
        let now = Utc::now();
        let post = Post {
            id: db.next_id(),
            topic_id: new.topic_id,
            user_id: new.user_id,
            title: new.title,
            body: new.body,
            created_at: now,
            updated_at: now,
            edited_at: None,
        };
        db.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Id, changes: &Changes<PostField>) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        let Some(post) = db.posts.get_mut(&id) else {
            return Ok(false);
        };
        for (field, value) in changes.iter() {
            match field {
                PostField::Title => post.title = value.to_string(),
                PostField::Body => post.body = value.to_string(),
            }
        }
        let now = Utc::now();
        post.updated_at = now;
        if changes.touches_body() {
            post.edited_at = Some(now);
        }
        Ok(true)
    }

    async fn delete_post(&self, id: Id) -> StoreResult<bool> {
        Ok(self.inner.write().await.remove_post(id))
    }

    async fn list_comments(&self, post_id: Id) -> StoreResult<Vec<CommentWithAuthor>> {
        let db = self.inner.read().await;
        let mut comments: Vec<&Comment> = db.comments.values().filter(|c| c.post_id == post_id).collect();
        comments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(comments
            .into_iter()
            .filter_map(|c| db.comment_with_author(c))
            .collect())
    }

    async fn find_comment(&self, id: Id) -> StoreResult<Option<Comment>> {
        Ok(self.inner.read().await.comments.get(&id).cloned())
    }

    async fn comment_with_author(&self, id: Id) -> StoreResult<Option<CommentWithAuthor>> {
        let db = self.inner.read().await;
        Ok(db.comments.get(&id).and_then(|c| db.comment_with_author(c)))
    }

    async fn create_comment(&self, new: NewComment) -> StoreResult<Comment> {
        let mut db = self.inner.write().await;
        let now = Utc::now();
        let comment = Comment {
            id: db.next_id(),
            post_id: new.post_id,
            user_id: new.user_id,
            parent_comment_id: new.parent_comment_id,
            body: new.body,
            created_at: now,
            updated_at: now,
            edited_at: None,
        };
        if let Some(parent) = comment.parent_comment_id {
            db.replies.entry(parent).or_default().insert(comment.id);
        }
        db.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(&self, id: Id, changes: &Changes<CommentField>) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        let Some(comment) = db.comments.get_mut(&id) else {
            return Ok(false);
        };
        if let Some(body) = changes.get(CommentField::Body) {
            comment.body = body.to_string();
        }
        let now = Utc::now();
        comment.updated_at = now;
        if changes.touches_body() {
            comment.edited_at = Some(now);
        }
        Ok(true)
    }

    async fn delete_comment(&self, id: Id) -> StoreResult<bool> {
        Ok(self.inner.write().await.remove_comment(id))
    }
}
