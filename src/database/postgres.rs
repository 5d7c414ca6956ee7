use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;

use super::changes::{Changes, CommentField, Field, PostField, TopicField};
use super::models::{
    Comment, CommentWithAuthor, Id, NewComment, NewPost, NewTopic, NewUser, Post,
    PostWithAuthor, Role, Topic, TopicWithCreator, User, UserSummary,
};
use super::store::{ForumStore, StoreError, StoreResult};

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at, updated_at";
const TOPIC_COLUMNS: &str = "id, title, description, created_by_user_id, created_at, updated_at";
const POST_COLUMNS: &str = "id, topic_id, user_id, title, body, created_at, updated_at, edited_at";
const COMMENT_COLUMNS: &str =
    "id, post_id, user_id, parent_comment_id, body, created_at, updated_at, edited_at";

/// `ForumStore` backed by a Postgres pool. Cascades and set-null behaviour
/// come from the foreign keys in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn apply_changes<F: Field>(
        &self,
        table: &'static str,
        id: Id,
        changes: &Changes<F>,
        stamp_edited: bool,
    ) -> StoreResult<bool> {
        let mut qb = build_update(table, id, changes, stamp_edited);
        debug!("{}", qb.sql());
        let result = qb.build().execute(&self.pool).await.map_err(classify)?;
        Ok(result.rows_affected() > 0)
    }
}

fn build_update<'a, F: Field>(
    table: &'static str,
    id: Id,
    changes: &'a Changes<F>,
    stamp_edited: bool,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("UPDATE {table} SET "));
    {
        let mut set = qb.separated(", ");
        for (field, value) in changes.iter() {
            set.push(field.column())
                .push_unseparated(" = ")
                .push_bind_unseparated(value);
        }
        set.push("updated_at = now()");
        if stamp_edited {
            set.push("edited_at = now()");
        }
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb
}

/// Builds an ILIKE pattern that matches `search` literally as a substring.
pub fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn classify(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
        _ => StoreError::Sqlx(err),
    }
}

#[derive(FromRow)]
struct TopicRow {
    #[sqlx(flatten)]
    topic: Topic,
    creator_username: Option<String>,
}

impl From<TopicRow> for TopicWithCreator {
    fn from(row: TopicRow) -> Self {
        let creator = match (row.topic.created_by_user_id, row.creator_username) {
            (Some(id), Some(username)) => Some(UserSummary { id, username }),
            _ => None,
        };
        TopicWithCreator {
            topic: row.topic,
            creator,
        }
    }
}

#[derive(FromRow)]
struct PostRow {
    #[sqlx(flatten)]
    post: Post,
    author_username: String,
}

impl From<PostRow> for PostWithAuthor {
    fn from(row: PostRow) -> Self {
        let author = UserSummary {
            id: row.post.user_id,
            username: row.author_username,
        };
        PostWithAuthor {
            post: row.post,
            author,
        }
    }
}

#[derive(FromRow)]
struct CommentRow {
    #[sqlx(flatten)]
    comment: Comment,
    author_username: String,
}

impl From<CommentRow> for CommentWithAuthor {
    fn from(row: CommentRow) -> Self {
        let author = UserSummary {
            id: row.comment.user_id,
            username: row.author_username,
        };
        CommentWithAuthor {
            comment: row.comment,
            author,
        }
    }
}

const TOPIC_SELECT: &str = "SELECT t.id, t.title, t.description, t.created_by_user_id, \
     t.created_at, t.updated_at, u.username AS creator_username \
     FROM topics t LEFT JOIN users u ON u.id = t.created_by_user_id";

const POST_SELECT: &str = "SELECT p.id, p.topic_id, p.user_id, p.title, p.body, \
     p.created_at, p.updated_at, p.edited_at, u.username AS author_username \
     FROM posts p JOIN users u ON u.id = p.user_id";

const COMMENT_SELECT: &str = "SELECT c.id, c.post_id, c.user_id, c.parent_comment_id, c.body, \
     c.created_at, c.updated_at, c.edited_at, u.username AS author_username \
     FROM comments c JOIN users u ON u.id = c.user_id";

#[async_trait]
impl ForumStore for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&new.username)
            .bind(&new.password_hash)
            .bind(new.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_user(&self, id: Id) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn set_user_role(&self, id: Id, role: Role) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET role = $1, updated_at = now() WHERE id = $2")
            .bind(role.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: Id) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_topics(&self, search: Option<&str>) -> StoreResult<Vec<TopicWithCreator>> {
        let mut qb = QueryBuilder::<Postgres>::new(TOPIC_SELECT);
        if let Some(search) = search {
            qb.push(" WHERE t.title ILIKE ")
                .push_bind(like_pattern(search))
                .push(" ESCAPE '\\'");
        }
        qb.push(" ORDER BY t.created_at DESC, t.id DESC");

        let rows = qb.build_query_as::<TopicRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_topic(&self, id: Id) -> StoreResult<Option<Topic>> {
        let sql = format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE id = $1");
        Ok(sqlx::query_as::<_, Topic>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn topic_with_creator(&self, id: Id) -> StoreResult<Option<TopicWithCreator>> {
        let sql = format!("{TOPIC_SELECT} WHERE t.id = $1");
        let row = sqlx::query_as::<_, TopicRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn create_topic(&self, new: NewTopic) -> StoreResult<Topic> {
        let sql = format!(
            "INSERT INTO topics (title, description, created_by_user_id) VALUES ($1, $2, $3) RETURNING {TOPIC_COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.created_by_user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn seed_topics(&self, topics: Vec<NewTopic>) -> StoreResult<u64> {
        if topics.is_empty() {
            return Ok(0);
        }
        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO topics (title, description, created_by_user_id) ",
        );
        qb.push_values(topics, |mut row, topic| {
            row.push_bind(topic.title)
                .push_bind(topic.description)
                .push_bind(topic.created_by_user_id);
        });
        qb.push(" ON CONFLICT (title) DO NOTHING");

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn update_topic(&self, id: Id, changes: &Changes<TopicField>) -> StoreResult<bool> {
        self.apply_changes("topics", id, changes, false).await
    }

    async fn delete_topic(&self, id: Id) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM topics WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self, topic_id: Id, search: Option<&str>) -> StoreResult<Vec<PostWithAuthor>> {
        let mut qb = QueryBuilder::<Postgres>::new(POST_SELECT);
        qb.push(" WHERE p.topic_id = ").push_bind(topic_id);
        if let Some(search) = search {
            let pattern = like_pattern(search);
            qb.push(" AND (p.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR p.body ILIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        qb.push(" ORDER BY p.created_at DESC, p.id DESC");

        let rows = qb.build_query_as::<PostRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_post(&self, id: Id) -> StoreResult<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn post_with_author(&self, id: Id) -> StoreResult<Option<PostWithAuthor>> {
        let sql = format!("{POST_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn create_post(&self, new: NewPost) -> StoreResult<Post> {
        let sql = format!(
            "INSERT INTO posts (topic_id, user_id, title, body) VALUES ($1, $2, $3, $4) RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(new.topic_id)
            .bind(new.user_id)
            .bind(&new.title)
            .bind(&new.body)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update_post(&self, id: Id, changes: &Changes<PostField>) -> StoreResult<bool> {
        self.apply_changes("posts", id, changes, changes.touches_body()).await
    }

    async fn delete_post(&self, id: Id) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, post_id: Id) -> StoreResult<Vec<CommentWithAuthor>> {
        let sql = format!("{COMMENT_SELECT} WHERE c.post_id = $1 ORDER BY c.created_at ASC, c.id ASC");
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_comment(&self, id: Id) -> StoreResult<Option<Comment>> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1");
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn comment_with_author(&self, id: Id) -> StoreResult<Option<CommentWithAuthor>> {
        let sql = format!("{COMMENT_SELECT} WHERE c.id = $1");
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn create_comment(&self, new: NewComment) -> StoreResult<Comment> {
        let sql = format!(
            "INSERT INTO comments (post_id, user_id, parent_comment_id, body) VALUES ($1, $2, $3, $4) RETURNING {COMMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(new.post_id)
            .bind(new.user_id)
            .bind(new.parent_comment_id)
            .bind(&new.body)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update_comment(&self, id: Id, changes: &Changes<CommentField>) -> StoreResult<bool> {
        self.apply_changes("comments", id, changes, changes.touches_body()).await
    }

    async fn delete_comment(&self, id: Id) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
