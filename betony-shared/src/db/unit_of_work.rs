/// Unit of Work: one atomic set of changes across every store
///
/// A `UnitOfWork` owns one database transaction. Store handles borrow that
/// transaction's connection mutably, so:
///
/// - everything done through one unit is serialized and lands in the same
///   transaction;
/// - [`commit`](UnitOfWork::commit) consumes the unit, so it can commit at
///   most once;
/// - dropping an uncommitted unit (early return, `?`, panic, cancelled
///   future) rolls the transaction back and releases the connection.
///
/// One unit per request. Units are not `Clone` and are never shared between
/// concurrent callers; concurrent units run on independent connections and
/// see each other only through SQLite's isolation.
///
/// # Example
///
/// ```no_run
/// use betony_shared::db::unit_of_work::UnitOfWork;
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
/// let mut uow = UnitOfWork::begin(&pool).await?;
///
/// let role = uow.roles().ensure_default_role().await?;
/// let total = uow.accounts().count().await?;
/// println!("default role {} / {} accounts", role.name, total);
///
/// uow.commit().await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{sqlite::SqlitePool, Sqlite, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::error::StoreError;
use crate::models::{
    account::AccountStore, comment::CommentStore, friendship::FriendshipStore, like::LikeStore,
    post::PostStore, role::RoleStore,
};

/// Scoped persistence session exposing typed store handles
pub struct UnitOfWork {
    id: Uuid,
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    /// Opens a new unit on a pooled connection
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if no connection can be acquired or
    /// the transaction cannot be started.
    pub async fn begin(pool: &SqlitePool) -> Result<Self, StoreError> {
        let tx = pool.begin().await?;
        let id = Uuid::new_v4();
        debug!(unit_of_work = %id, "Unit of work opened");

        Ok(Self { id, tx })
    }

    /// Identifier used to correlate log lines of one unit
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Account store bound to this unit
    pub fn accounts(&mut self) -> AccountStore<'_> {
        AccountStore::new(&mut self.tx)
    }

    /// Role store bound to this unit
    pub fn roles(&mut self) -> RoleStore<'_> {
        RoleStore::new(&mut self.tx)
    }

    /// Post store bound to this unit
    pub fn posts(&mut self) -> PostStore<'_> {
        PostStore::new(&mut self.tx)
    }

    /// Comment store bound to this unit
    pub fn comments(&mut self) -> CommentStore<'_> {
        CommentStore::new(&mut self.tx)
    }

    /// Like store bound to this unit
    pub fn likes(&mut self) -> LikeStore<'_> {
        LikeStore::new(&mut self.tx)
    }

    /// Friendship store bound to this unit
    pub fn friendships(&mut self) -> FriendshipStore<'_> {
        FriendshipStore::new(&mut self.tx)
    }

    /// Persists every change made through this unit atomically
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the commit fails; nothing is
    /// persisted in that case.
    pub async fn commit(self) -> Result<(), StoreError> {
        let id = self.id;
        self.tx.commit().await?;
        debug!(unit_of_work = %id, "Unit of work committed");
        Ok(())
    }

    /// Discards every change made through this unit
    ///
    /// Dropping the unit has the same effect; this variant reports failures.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the rollback statement fails.
    pub async fn rollback(self) -> Result<(), StoreError> {
        let id = self.id;
        self.tx.rollback().await?;
        debug!(unit_of_work = %id, "Unit of work rolled back");
        Ok(())
    }
}
