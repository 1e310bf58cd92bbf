//! Error types for dig-db

use thiserror::Error;

/// Metadata access errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Metadata source unreachable: {0}")]
    ConnectionError(String),

    /// Requested object does not exist (D002)
    #[error("[D002] Object not found: {0}")]
    ObjectNotFound(String),

    /// Catalog query failed (D003)
    #[error("[D003] Metadata query failed: {0}")]
    QueryError(String),

    /// Catalog snapshot unreadable or malformed (D004)
    #[error("[D004] Invalid catalog {path}: {message}")]
    CatalogError { path: String, message: String },

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

impl DbError {
    /// Whether the error only concerns one missing object.
    ///
    /// Everything else means the metadata source itself is unusable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::ObjectNotFound(_))
    }
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::QueryError(err.to_string())
    }
}
