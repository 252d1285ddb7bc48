//! Shared fixtures for betony-shared integration tests
//!
//! Every test gets its own SQLite file inside a temporary directory, so
//! tests are isolated and can run in parallel.

#![allow(dead_code)]

use betony_shared::auth::{jwt::TokenIssuer, password::CredentialHasher};
use betony_shared::config::{AuthConfig, HashingConfig};
use betony_shared::db::migrations::run_migrations;
use betony_shared::db::pool::{create_pool, DatabaseConfig};
use betony_shared::identity::{IdentityService, RegisterAccount};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const TEST_SECRET: &str = "integration-test-secret-key-0123456789";

/// Migrated database living as long as this value
pub struct TestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        Self::with_limits(4, 5).await
    }

    /// Like [`TestDb::new`] with a custom pool size and lock wait
    pub async fn with_limits(max_connections: u32, busy_timeout_seconds: u64) -> Self {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let url = format!("sqlite://{}", dir.path().join("betony-test.db").display());

        let pool = create_pool(DatabaseConfig {
            url,
            max_connections,
            busy_timeout_seconds,
            ..Default::default()
        })
        .await
        .expect("pool creation should succeed");

        run_migrations(&pool).await.expect("migrations should succeed");

        Self { pool, _dir: dir }
    }

    /// Identity service over this database with cheap hashing parameters
    pub fn identity(&self) -> IdentityService {
        self.identity_with(HashingConfig::minimal())
    }

    pub fn identity_with(&self, hashing: HashingConfig) -> IdentityService {
        IdentityService::new(
            self.pool.clone(),
            CredentialHasher::new(hashing).expect("hasher should build"),
            TokenIssuer::new(test_auth_config()),
        )
    }

    /// Counts rows in `users` with the given email, outside any unit
    pub async fn count_accounts_with_email(&self, email: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .expect("count should succeed")
    }
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig::new(TEST_SECRET, "HS256", 30).expect("test auth config should be valid")
}

pub fn registration(email: &str, name: &str) -> RegisterAccount {
    RegisterAccount {
        email: email.to_string(),
        password: "pw123456".to_string(),
        name: name.to_string(),
    }
}
