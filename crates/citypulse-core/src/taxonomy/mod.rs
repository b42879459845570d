//! Subcategory taxonomy model
//!
//! Every report is filed under a fixed [`Topic`] and a canonical subcategory
//! within that topic. Subcategories are created once, either from the seed
//! table at bootstrap or lazily during classification, and are never deleted:
//! retirement is a status transition.
//!
//! # Example
//!
//! ```rust
//! use citypulse_core::taxonomy::{SubcategoryBuilder, SubcategorySource, Topic};
//!
//! let entry = SubcategoryBuilder::new(Topic::Traffic, "accident")
//!     .description("Vehicle accidents and collisions")
//!     .source(SubcategorySource::Predefined)
//!     .created_by("system")
//!     .build();
//!
//! assert_eq!(entry.display_name, "Accident");
//! assert!(entry.metadata.avg_confidence.is_none());
//! ```

mod subcategory;
mod types;

pub use subcategory::{
    display_name_for, Subcategory, SubcategoryBuilder, SubcategoryMetadata,
    SubcategoryRelationships, SubcategoryUpdate, UsageUpdate, CONFIDENCE_WINDOW,
};
pub use types::{SubcategorySource, SubcategoryStatus, Topic, UnknownVariant};
