//! # CityPulse Taxonomy Engine
//!
//! Classifies citizen reports into a per-topic subcategory taxonomy that grows
//! as new kinds of reports arrive:
//! - **engine**: the tiered classifier and taxonomy management operations
//! - **generator**: text-generation backends (Gemini, disabled)
//! - **config**: engine and generator settings from the environment
//! - **cancel**: request cancellation tokens
//! - **error**: crate error types
//! - **tracing**: logging setup with CityPulse segment prefixes
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use citypulse::{ClassifyRequest, DisabledGenerator, EngineConfig, TaxonomyEngine};
//! use citypulse_core::{ClassificationContext, MemoryStore};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let engine = TaxonomyEngine::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(DisabledGenerator),
//!     EngineConfig::default(),
//! );
//! engine.seed_predefined().await.unwrap();
//!
//! let context = ClassificationContext::new("Accident", "Vehicle collisions");
//! let result = engine.classify(ClassifyRequest::new("traffic", context)).await.unwrap();
//! assert_eq!(result.subcategory_name, "accident");
//! # });
//! ```

pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod tracing;

// Re-export commonly used items at crate root
pub use cancel::CancellationToken;
pub use config::{EngineConfig, GeneratorConfig};
pub use engine::{
    ClassifyRequest, HealthReport, SeedReport, SubcategoryInfo, Suggestion, TaxonomyEngine,
};
pub use error::{Error, InvalidRequest, Result};
pub use generator::{DisabledGenerator, GeminiGenerator, GenerationError, TextGenerator};
