/// Roles and the role store
///
/// Every account references exactly one role. The row with id
/// [`DEFAULT_ROLE_ID`] is the default "user" role and is created on demand
/// by [`RoleStore::ensure_default_role`].

use serde::Serialize;
use sqlx::SqliteConnection;

use crate::db::StoreError;

/// Id of the default role assigned at registration
pub const DEFAULT_ROLE_ID: i64 = 1;

/// Name of the default role
pub const DEFAULT_ROLE_NAME: &str = "user";

/// Description of the default role
pub const DEFAULT_ROLE_DESCRIPTION: &str = "Default user role";

/// A role accounts can belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Role persistence bound to one Unit of Work
pub struct RoleStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> RoleStore<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Finds a role by id
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails
    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<Role>, StoreError> {
        let role = sqlx::query_as::<_, Role>("SELECT id, name, description FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(role)
    }

    /// Lists all roles by id
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails
    pub async fn list_all(&mut self) -> Result<Vec<Role>, StoreError> {
        let roles = sqlx::query_as::<_, Role>("SELECT id, name, description FROM roles ORDER BY id")
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(roles)
    }

    /// Makes sure the default role exists and returns it
    ///
    /// Idempotent: calling it any number of times, from any number of
    /// units, leaves exactly one default role row behind.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the insert or read fails
    pub async fn ensure_default_role(&mut self) -> Result<Role, StoreError> {
        sqlx::query(
            "INSERT INTO roles (id, name, description) VALUES (?, ?, ?) ON CONFLICT (id) DO NOTHING",
        )
        .bind(DEFAULT_ROLE_ID)
        .bind(DEFAULT_ROLE_NAME)
        .bind(DEFAULT_ROLE_DESCRIPTION)
        .execute(&mut *self.conn)
        .await
        .map_err(StoreError::from_write)?;

        let role = sqlx::query_as::<_, Role>("SELECT id, name, description FROM roles WHERE id = ?")
            .bind(DEFAULT_ROLE_ID)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(role)
    }
}
