use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A unique or primary-key constraint rejected the write.
    #[error("unique constraint violated")]
    Conflict,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DbResult<T> = Result<T, DbError>;

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        if is_unique_violation(&err) {
            DbError::Conflict
        } else {
            DbError::Sqlite(err)
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}
