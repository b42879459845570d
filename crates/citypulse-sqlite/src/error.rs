//! Error types for SQLite storage backend

use citypulse_core::storage::StoreError;
use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, SqliteError>;

/// Errors that can occur during SQLite storage operations
#[derive(Debug, Error)]
pub enum SqliteError {
    /// Database connection or query error
    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored row could not be turned back into a subcategory
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Subcategory with given ID already exists
    #[error("Subcategory {0} already exists")]
    AlreadyExists(String),

    /// Optimistic update kept losing to concurrent writers
    #[error("Update of {0} contended too long")]
    Contended(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),
}

impl SqliteError {
    /// Database is locked or busy
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SqliteError::Database(rusqlite::Error::SqliteFailure(e, _))
                if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
        )
    }

    /// Insert hit a UNIQUE or PRIMARY KEY constraint
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            SqliteError::Database(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
        )
    }
}

/// Convert SqliteError to StoreError for the storage trait
impl From<SqliteError> for StoreError {
    fn from(err: SqliteError) -> Self {
        if err.is_busy() {
            return StoreError::Unavailable(err.to_string());
        }
        match err {
            SqliteError::AlreadyExists(id) => StoreError::AlreadyExists(id),
            SqliteError::Json(e) => StoreError::Serialization(e.to_string()),
            SqliteError::InvalidRow(msg) => StoreError::InvalidData(msg),
            SqliteError::Contended(id) => StoreError::Unavailable(format!("contended: {}", id)),
            SqliteError::Database(e) => StoreError::Backend(format!("SQLite: {}", e)),
            SqliteError::Migration(msg) => StoreError::Backend(format!("Migration: {}", msg)),
        }
    }
}
