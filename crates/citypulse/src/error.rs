//! Common error types for CityPulse components.

use citypulse_core::storage::StoreError;
use citypulse_core::taxonomy::UnknownVariant;
use thiserror::Error;

/// Common error type for CityPulse operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage error
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Database open/migration error
    #[error("database error: {0}")]
    Database(#[from] citypulse_sqlite::SqliteError),

    /// Rejected request
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequest),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias using CityPulse Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation failure of a caller's request, distinct from classification failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidRequest {
    #[error("{0}")]
    UnknownTopic(#[from] UnknownVariant),

    #[error("report has neither title nor description")]
    EmptyText,

    #[error("confidence threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f64),
}
