//! CityPulse Taxonomy Core
//!
//! Synchronous building blocks of the report classification engine: the
//! subcategory model, the storage trait with an in-memory backend, similarity
//! scoring, the keyword fallback, model prompt/parse helpers and analytics.
//!
//! # Example
//!
//! ```rust
//! use citypulse_core::classify::classify_by_keywords;
//! use citypulse_core::similarity::rank_matches;
//! use citypulse_core::taxonomy::{SubcategoryBuilder, Topic};
//!
//! let fallback = classify_by_keywords(Topic::Weather, "Flooding waterlogging near the station");
//! assert_eq!(fallback.name, "flood");
//!
//! let entries = vec![SubcategoryBuilder::new(Topic::Traffic, "congestion").alias("jam").build()];
//! let ranked = rank_matches("jam", &entries, 10);
//! assert_eq!(ranked[0].score, 0.7);
//! ```

pub mod analytics;
pub mod classify;
pub mod similarity;
pub mod storage;
pub mod taxonomy;

// Re-export main types at crate root
pub use analytics::{AnalyticsReport, PerformanceSummary, ReviewReason};
pub use classify::{
    ClassificationContext, ClassificationPath, ClassificationResult, ParsedCompletion, Severity,
};
pub use similarity::SimilarityMatch;
pub use storage::{MemoryStore, StoreError, StoreResult, TaxonomyStore};
pub use taxonomy::{
    Subcategory, SubcategoryBuilder, SubcategorySource, SubcategoryStatus, SubcategoryUpdate,
    Topic, UsageUpdate,
};
