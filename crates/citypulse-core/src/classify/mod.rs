//! Report classification building blocks
//!
//! Everything here is synchronous and side-effect free; the orchestrating
//! engine in the `citypulse` crate wires these pieces to a store and a text
//! generator.
//!
//! - [`normalize_subcategory_name`]: canonical token form of a name
//! - [`classify_by_keywords`]: rule-based fallback over the seed table
//! - [`build_prompt`] / [`parse_completion`]: the model round trip
//! - [`severity_hint`]: suggested severity per subcategory
//!
//! # Example
//!
//! ```rust
//! use citypulse_core::classify::{classify_by_keywords, normalize_subcategory_name};
//! use citypulse_core::taxonomy::Topic;
//!
//! assert_eq!(normalize_subcategory_name("Road  Construction!"), "road_construction");
//!
//! let result = classify_by_keywords(Topic::Traffic, "Accident: vehicle collisions");
//! assert_eq!(result.name, "accident");
//! ```

mod fallback;
mod normalize;
mod parse;
mod prompt;
mod seed;
mod severity;
mod types;

pub use fallback::{classify_by_keywords, FallbackClassification, FALLBACK_FLOOR, GENERAL};
pub use normalize::normalize_subcategory_name;
pub use parse::{
    heuristic_classification, parse_completion, AiClassification, ParsedCompletion,
    DEFAULT_CONFIDENCE, HEURISTIC_CONFIDENCE,
};
pub use prompt::build_prompt;
pub use seed::{keyword_rules, seed_description, seed_entries, SeedEntry};
pub use severity::{severity_hint, Severity};
pub use types::{
    ClassificationContext, ClassificationPath, ClassificationResult, NewSubcategoryInfo,
    LAST_RESORT_CONFIDENCE,
};
