/// Database layer for Betony
///
/// # Modules
///
/// - `pool`: SQLite connection pool management with health checks
/// - `migrations`: Embedded schema migrations
/// - `unit_of_work`: Transaction-scoped access to every store
/// - `error`: Store error type
///
/// Store implementations live next to their records in the `models` module.
///
/// # Example
///
/// ```no_run
/// use betony_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod unit_of_work;

pub use error::StoreError;
pub use unit_of_work::UnitOfWork;
