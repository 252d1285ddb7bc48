/// Posts and the post store
///
/// Plain persistence for the posting collaborator. Callers pass an account
/// id that was already resolved from a token; the store does no
/// authorization of its own.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::db::StoreError;

const POST_COLUMNS: &str = "id, title, content, user_id, likes_count, created_at, updated_at";

/// A post authored by an account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a post
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    pub user_id: i64,
}

/// Post persistence bound to one Unit of Work
pub struct PostStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> PostStore<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Creates a post
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the author does not exist or the
    /// insert fails
    pub async fn create(&mut self, data: CreatePost) -> Result<Post, StoreError> {
        let now = Utc::now();

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (title, content, user_id, likes_count, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(data.title)
        .bind(data.content)
        .bind(data.user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(StoreError::from_write)?;

        Ok(post)
    }

    /// Finds a post by id
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails
    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(post)
    }

    /// Lists an account's posts, newest first
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails
    pub async fn list_by_user(&mut self, user_id: i64) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(posts)
    }

    /// Deletes a post; returns whether a row was removed
    ///
    /// Comments and likes on the post go with it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the delete fails
    pub async fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
