/// Account records and the account store
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id              INTEGER PRIMARY KEY AUTOINCREMENT,
///     name            VARCHAR(100) NOT NULL,
///     email           VARCHAR(255) NOT NULL,   -- unique index users_email_key
///     hashed_password VARCHAR(300) NOT NULL,
///     is_admin        BOOLEAN NOT NULL DEFAULT FALSE,
///     role_id         INTEGER NOT NULL REFERENCES roles (id),
///     created_at      TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use betony_shared::db::UnitOfWork;
/// use betony_shared::models::account::CreateAccount;
/// use betony_shared::models::role::DEFAULT_ROLE_ID;
/// # use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
/// let mut uow = UnitOfWork::begin(&pool).await?;
///
/// let account = uow
///     .accounts()
///     .insert(CreateAccount {
///         name: "Alice".to_string(),
///         email: "alice@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         is_admin: false,
///         role_id: DEFAULT_ROLE_ID,
///     })
///     .await?;
///
/// uow.commit().await?;
/// println!("Created account {}", account.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;
use std::fmt;

use crate::db::StoreError;

const ACCOUNT_COLUMNS: &str = "id, name, email, hashed_password, is_admin, role_id, created_at";

/// A registered account
///
/// The password hash never leaves the process: it is skipped when
/// serializing and redacted from `Debug` output.
#[derive(Clone, Serialize, sqlx::FromRow)]
pub struct Account {
    /// Store-assigned id, immutable
    pub id: i64,

    /// Display name
    pub name: String,

    /// Login key, unique across all accounts
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing)]
    #[sqlx(rename = "hashed_password")]
    pub password_hash: String,

    /// Whether the account may administer other accounts
    pub is_admin: bool,

    /// Role this account belongs to
    pub role_id: i64,

    /// When the account was registered
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("is_admin", &self.is_admin)
            .field("role_id", &self.role_id)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Input for inserting an account
///
/// Carries the hash, never the plaintext password.
#[derive(Clone)]
pub struct CreateAccount {
    /// Display name
    pub name: String,

    /// Login key
    pub email: String,

    /// Argon2id PHC string
    pub password_hash: String,

    /// Initial admin flag
    pub is_admin: bool,

    /// Role reference
    pub role_id: i64,
}

/// Account persistence bound to one Unit of Work
pub struct AccountStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> AccountStore<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Finds an account by id
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails
    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(account)
    }

    /// Finds an account by its (already normalized) email
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails
    pub async fn find_by_email(&mut self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(account)
    }

    /// Inserts an account; the store assigns the id
    ///
    /// # Errors
    ///
    /// - `StoreError::Duplicate` if the email is already taken (including
    ///   when a concurrent unit inserted it after our pre-check)
    /// - `StoreError::Database` for anything else, e.g. an unknown role
    pub async fn insert(&mut self, data: CreateAccount) -> Result<Account, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO users (name, email, hashed_password, is_admin, role_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.is_admin)
        .bind(data.role_id)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(StoreError::from_write)?;

        Ok(account)
    }

    /// Lists every account, oldest first
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails
    pub async fn list_all(&mut self) -> Result<Vec<Account>, StoreError> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(accounts)
    }

    /// Counts all accounts
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails
    pub async fn count(&mut self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count)
    }

    /// Sets the admin flag, returning the updated account if it exists
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the update fails
    pub async fn set_admin(&mut self, id: i64, is_admin: bool) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "UPDATE users SET is_admin = ? WHERE id = ? RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(is_admin)
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(StoreError::from_write)?;

        Ok(account)
    }
}
