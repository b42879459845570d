//! JSON and timestamp helpers for SQLite columns

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Result, SqliteError};

/// Serialize a value into a JSON text column
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Deserialize a JSON text column; empty text yields the default value
pub fn from_json<T: DeserializeOwned + Default>(json: &str) -> Result<T> {
    if json.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(json)?)
}

/// Format a timestamp as RFC3339 with nanosecond precision
pub fn timestamp_to_sql(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse an RFC3339 timestamp column
pub fn sql_to_timestamp(datetime_str: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(datetime_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SqliteError::InvalidRow(format!("invalid datetime '{}': {}", datetime_str, e)))
}
