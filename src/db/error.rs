use thiserror::Error;

/// Errors raised by the store.
///
/// Missing rows are not errors: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{0} already exists")]
    Conflict(String),

    #[error("migration {id} failed: {source}")]
    Migration {
        id: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("unsupported database URL {0}: expected a SQLite path or sqlite:// URL")]
    UnsupportedUrl(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Map a unique-constraint failure to [`StoreError::Conflict`], keeping
    /// every other SQLite error as is.
    pub(super) fn unique(err: rusqlite::Error, what: impl FnOnce() -> String) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Self::Conflict(what())
            }
            _ => Self::Sqlite(err),
        }
    }
}
