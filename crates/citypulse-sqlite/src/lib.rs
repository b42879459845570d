//! SQLite storage backend for the CityPulse taxonomy
//!
//! Persistent implementation of the `citypulse-core` [`TaxonomyStore`] trait.
//!
//! # Features
//!
//! - Embedded, versioned migrations tracked in `schema_migrations`
//! - `(topic, name)` uniqueness among non-merged entries via a partial unique index
//! - Per-row optimistic concurrency for usage statistics
//! - In-memory databases for testing
//!
//! # Example
//!
//! ```rust,no_run
//! use citypulse_core::storage::TaxonomyStore;
//! use citypulse_core::taxonomy::{SubcategoryBuilder, Topic, UsageUpdate};
//! use citypulse_sqlite::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::open("taxonomy.db")?;
//!
//! let (entry, _) = store.get_or_create(SubcategoryBuilder::new(Topic::Weather, "flood").build())?;
//! store.update_usage(&entry.id, &UsageUpdate::classification(0.85))?;
//!
//! let flood = store.get(&entry.id)?.unwrap();
//! assert!(flood.metadata.usage_count >= 1);
//! # Ok(())
//! # }
//! ```
//!
//! [`TaxonomyStore`]: citypulse_core::storage::TaxonomyStore

pub mod error;
pub mod json;
pub mod migrate;
pub mod store;

// Re-export main types
pub use error::{Result, SqliteError};
pub use store::SqliteStore;
