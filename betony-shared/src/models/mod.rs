/// Persistent records and their stores
///
/// Each module holds one record type plus the store that reads and writes
/// it. Stores are only reachable through a [`UnitOfWork`](crate::db::UnitOfWork),
/// so every write lands in the caller's transaction.
///
/// # Models
///
/// - `account`: Registered accounts (identity core)
/// - `role`: Roles and the default-role bootstrap
/// - `post`: Posts
/// - `comment`: Comments on posts
/// - `like`: Likes on posts
/// - `friendship`: Directed friendships between accounts
///
/// # Example
///
/// ```no_run
/// use betony_shared::db::UnitOfWork;
/// use betony_shared::models::post::CreatePost;
/// # use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool, author_id: i64) -> Result<(), Box<dyn std::error::Error>> {
/// let mut uow = UnitOfWork::begin(&pool).await?;
///
/// let post = uow
///     .posts()
///     .create(CreatePost {
///         title: "Hello".to_string(),
///         content: "First post".to_string(),
///         user_id: author_id,
///     })
///     .await?;
/// uow.likes().create(author_id, post.id).await?;
///
/// uow.commit().await?;
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod comment;
pub mod friendship;
pub mod like;
pub mod post;
pub mod role;
