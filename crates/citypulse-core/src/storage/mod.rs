//! Storage abstraction for the subcategory taxonomy
//!
//! [`TaxonomyStore`] abstracts over storage backends. Implementations exist for:
//!
//! - **Memory**: in-process map with per-entry locks (`MemoryStore`)
//! - **SQLite**: durable store via rusqlite (`citypulse-sqlite` crate)
//!
//! All methods take `&self`; backends are shared across request tasks behind an
//! `Arc` and handle their own synchronization.
//!
//! # Example
//!
//! ```rust
//! use citypulse_core::storage::{MemoryStore, TaxonomyStore};
//! use citypulse_core::taxonomy::{SubcategoryBuilder, SubcategorySource, Topic};
//!
//! let store = MemoryStore::new();
//!
//! let candidate = SubcategoryBuilder::new(Topic::Traffic, "drone_sighting")
//!     .source(SubcategorySource::AiGenerated)
//!     .created_by("ai_classification")
//!     .build();
//!
//! let (entry, created) = store.get_or_create(candidate.clone()).unwrap();
//! assert!(created);
//!
//! let (again, created) = store.get_or_create(candidate).unwrap();
//! assert!(!created);
//! assert_eq!(entry.id, again.id);
//! ```

mod error;
mod memory;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::{validate_update, TaxonomyStore};
