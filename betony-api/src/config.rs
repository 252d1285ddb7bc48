/// Configuration management for the API server
///
/// Settings come from the process environment (and a `.env` file in
/// development), are validated once at startup and then shared read-only.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: SQLite connection string (default: `sqlite://betony.db`)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SECRET_KEY`: Token signing secret, at least 32 characters (required)
/// - `ALGORITHM`: Token signing algorithm, HS256/HS384/HS512 (default: HS256)
/// - `ACCESS_TOKEN_EXPIRE_MINUTES`: Access token lifetime (default: 30)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: `*`)
/// - `RUST_LOG`: Log filter (default: debug for Betony crates)
///
/// # Example
///
/// ```no_run
/// use betony_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use betony_shared::config::{AuthConfig, HashingConfig, DEFAULT_ACCESS_TOKEN_TTL_MINUTES, DEFAULT_ALGORITHM};
use serde::Deserialize;
use std::collections::HashMap;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token signing configuration
    pub auth: AuthConfig,

    /// Password hashing cost
    pub hashing: HashingConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Flat view of the environment, one field per variable
#[derive(Deserialize)]
struct EnvSettings {
    database_url: String,
    database_max_connections: u32,
    secret_key: Option<String>,
    algorithm: String,
    access_token_expire_minutes: i64,
    api_host: String,
    api_port: u16,
    cors_origins: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SECRET_KEY` is missing or shorter than 32 characters
    /// - `ALGORITHM` is not an HMAC algorithm
    /// - A numeric variable cannot be parsed
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::load(config::Environment::default())
    }

    /// Loads configuration from an explicit set of variables
    ///
    /// Keys use the same names as the environment (`SECRET_KEY`, ...).
    /// Handy for tests, which must not depend on the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`]
    pub fn from_vars(vars: HashMap<String, String>) -> anyhow::Result<Self> {
        Self::load(config::Environment::default().source(Some(vars)))
    }

    // Values stay strings until deserialised, so an all-digit secret is kept verbatim
    fn load(source: config::Environment) -> anyhow::Result<Self> {
        let settings: EnvSettings = config::Config::builder()
            .set_default("database_url", "sqlite://betony.db")?
            .set_default("database_max_connections", 10)?
            .set_default("algorithm", DEFAULT_ALGORITHM)?
            .set_default("access_token_expire_minutes", DEFAULT_ACCESS_TOKEN_TTL_MINUTES)?
            .set_default("api_host", "0.0.0.0")?
            .set_default("api_port", 8080)?
            .set_default("cors_origins", "*")?
            .add_source(source)
            .build()?
            .try_deserialize()
            .context("Invalid configuration value")?;

        let secret = settings
            .secret_key
            .ok_or_else(|| anyhow::anyhow!("SECRET_KEY environment variable is required"))?;

        let auth = AuthConfig::new(secret, &settings.algorithm, settings.access_token_expire_minutes)
            .context("Invalid token configuration")?;

        let cors_origins = settings
            .cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            api: ApiConfig {
                host: settings.api_host,
                port: settings.api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: settings.database_url,
                max_connections: settings.database_max_connections,
            },
            auth,
            hashing: HashingConfig::default(),
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
