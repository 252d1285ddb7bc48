/// Likes and the like store
///
/// An account likes a post at most once. The post's `likes_count` column is
/// kept in step inside the same unit, so a rolled-back like leaves the count
/// untouched as well.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::db::StoreError;

/// A like on a post
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Like persistence bound to one Unit of Work
pub struct LikeStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> LikeStore<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Records a like and bumps the post's counter
    ///
    /// # Errors
    ///
    /// - `StoreError::Duplicate` if the account already likes the post
    /// - `StoreError::Database` for anything else
    pub async fn create(&mut self, user_id: i64, post_id: i64) -> Result<Like, StoreError> {
        let like = sqlx::query_as::<_, Like>(
            r#"
            INSERT INTO likes (user_id, post_id, created_at)
            VALUES (?, ?, ?)
            RETURNING id, user_id, post_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(StoreError::from_write)?;

        sqlx::query("UPDATE posts SET likes_count = likes_count + 1 WHERE id = ?")
            .bind(post_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(like)
    }

    /// Removes an account's like on a post; returns whether one existed
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the delete fails
    pub async fn delete_by_user_and_post(
        &mut self,
        user_id: i64,
        post_id: i64,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND post_id = ?")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE posts SET likes_count = MAX(likes_count - 1, 0) WHERE id = ?")
            .bind(post_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(true)
    }

    /// Counts likes on a post
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails
    pub async fn count_for_post(&mut self, post_id: i64) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM likes WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count)
    }
}
