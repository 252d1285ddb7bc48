/// Comments and the comment store

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::db::StoreError;

const COMMENT_COLUMNS: &str = "id, content, user_id, post_id, created_at, updated_at";

/// A comment left on a post
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub content: String,
    pub user_id: i64,
    pub post_id: i64,
}

/// Comment persistence bound to one Unit of Work
pub struct CommentStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> CommentStore<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Creates a comment
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the post or author does not exist
    pub async fn create(&mut self, data: CreateComment) -> Result<Comment, StoreError> {
        let now = Utc::now();

        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (content, user_id, post_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(data.content)
        .bind(data.user_id)
        .bind(data.post_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(StoreError::from_write)?;

        Ok(comment)
    }

    /// Lists a post's comments in the order they were written
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails
    pub async fn list_for_post(&mut self, post_id: i64) -> Result<Vec<Comment>, StoreError> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ? ORDER BY id"
        ))
        .bind(post_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(comments)
    }

    /// Deletes a comment; returns whether a row was removed
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the delete fails
    pub async fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
