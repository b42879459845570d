//! Logging utilities with CityPulse segment prefixes.
//!
//! Provides consistent logging setup across CityPulse binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing with CityPulse defaults.
///
/// Sets up tracing-subscriber with:
/// - Environment filter (RUST_LOG)
/// - Compact format suitable for terminal output
pub fn init() {
    init_with_filter("info");
}

/// Initialize tracing with a custom default filter.
///
/// `RUST_LOG` wins over `default_filter` when set. Safe to call more than
/// once; later calls are ignored.
pub fn init_with_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

/// CityPulse segment prefixes for logging.
pub mod prefix {
    /// Database operations prefix
    pub const DB: &str = "⊔";
    /// Taxonomy resolution prefix
    pub const TAXONOMY: &str = "⌬";
    /// Text-generation calls prefix
    pub const AI: &str = "✦";
}
