//! Error types for dig-migrate

use dig_db::DbError;
use std::path::PathBuf;
use thiserror::Error;

/// Migration planning and writing errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// M001: Migration folder or file cannot be read or written
    #[error("[M001] Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    /// M002: An existing migration file cannot be used for the index
    #[error("[M002] Cannot index migration {}: {reason}", path.display())]
    UnparseableMigration { path: PathBuf, reason: String },

    /// M003: DDL text could not be fetched
    #[error("[M003] {0}")]
    Metadata(#[from] DbError),

    /// M004: Version string is malformed or not newer than the folder
    #[error("[M004] Invalid migration version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// M005: Migration name is empty after sanitizing
    #[error("[M005] Invalid migration name '{0}': use letters, digits, or underscores")]
    InvalidMigrationName(String),
}

impl MigrateError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MigrateError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
