/// Friendships and the friendship store
///
/// A friendship row is directed (`user_id` befriended `friend_id`). Each
/// ordered pair appears at most once and an account cannot befriend itself.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::db::StoreError;

/// A directed friendship between two accounts
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Friendship {
    pub id: i64,
    pub user_id: i64,
    pub friend_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Friendship persistence bound to one Unit of Work
pub struct FriendshipStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> FriendshipStore<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Creates a friendship
    ///
    /// # Errors
    ///
    /// - `StoreError::Duplicate` if the pair already exists
    /// - `StoreError::Database` for self-friendship or unknown accounts
    pub async fn create(&mut self, user_id: i64, friend_id: i64) -> Result<Friendship, StoreError> {
        let friendship = sqlx::query_as::<_, Friendship>(
            r#"
            INSERT INTO friendships (user_id, friend_id, created_at)
            VALUES (?, ?, ?)
            RETURNING id, user_id, friend_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(StoreError::from_write)?;

        Ok(friendship)
    }

    /// Finds the friendship `user_id -> friend_id`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails
    pub async fn find(
        &mut self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<Option<Friendship>, StoreError> {
        let friendship = sqlx::query_as::<_, Friendship>(
            "SELECT id, user_id, friend_id, created_at FROM friendships WHERE user_id = ? AND friend_id = ?",
        )
        .bind(user_id)
        .bind(friend_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(friendship)
    }

    /// Lists the friendships an account started
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails
    pub async fn list_for_user(&mut self, user_id: i64) -> Result<Vec<Friendship>, StoreError> {
        let friendships = sqlx::query_as::<_, Friendship>(
            "SELECT id, user_id, friend_id, created_at FROM friendships WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(friendships)
    }

    /// Removes the friendship `user_id -> friend_id`; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the delete fails
    pub async fn delete_by_users(&mut self, user_id: i64, friend_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM friendships WHERE user_id = ? AND friend_id = ?")
            .bind(user_id)
            .bind(friend_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
