/// Store-level error type
///
/// Stores report exactly two things: a uniqueness conflict, which callers
/// translate into a domain condition, and everything else, which is an
/// infrastructure failure propagated untouched.

/// Error returned by every store operation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("record already exists")]
    Duplicate,

    /// Connection, I/O or any other database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps a write error, turning unique violations into [`StoreError::Duplicate`]
    ///
    /// Use on the insert/update path so a race that slips past a pre-check
    /// still lands on the same domain condition.
    pub fn from_write(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Database(err),
        }
    }

    /// Whether this is a uniqueness conflict
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate)
    }
}
