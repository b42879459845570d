//! Suggested severity per subcategory

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        })
    }
}

/// Severity the event pipeline should default to for a subcategory name.
///
/// `None` for names without a rule.
pub fn severity_hint(name: &str) -> Option<Severity> {
    match name {
        "fire" => Some(Severity::Critical),
        "accident" | "flood" => Some(Severity::High),
        "power_outage" | "congestion" => Some(Severity::Medium),
        "construction" | "rain" | "cultural" => Some(Severity::Low),
        _ => None,
    }
}
