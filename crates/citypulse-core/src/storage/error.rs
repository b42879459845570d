//! Storage error types

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Subcategory with this ID already exists
    #[error("subcategory already exists: {0}")]
    AlreadyExists(String),

    /// Subcategory not found
    #[error("subcategory not found: {0}")]
    NotFound(String),

    /// Invalid subcategory data
    #[error("invalid subcategory data: {0}")]
    InvalidData(String),

    /// Edit would break a naming rule (alias collision, merged entry)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backend could not be reached (connection lost, database locked)
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Storage backend error (database, filesystem, etc.)
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Whether the failure is a recoverable backend condition rather than a
    /// definitive answer about the data
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Backend(_))
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
