//! Taxonomy enumerations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when parsing a topic, source or status from an unknown string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Fixed top-level category of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Traffic,
    Infrastructure,
    Weather,
    Events,
    Safety,
}

impl Topic {
    /// All topics, in reporting order
    pub const ALL: [Topic; 5] = [
        Topic::Traffic,
        Topic::Infrastructure,
        Topic::Weather,
        Topic::Events,
        Topic::Safety,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Traffic => "traffic",
            Self::Infrastructure => "infrastructure",
            Self::Weather => "weather",
            Self::Events => "events",
            Self::Safety => "safety",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownVariant {
                kind: "topic",
                value: s.to_string(),
            })
    }
}

/// Provenance of a subcategory, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubcategorySource {
    /// Seeded from the built-in table
    Predefined,
    /// Proposed by the text-generation model
    AiGenerated,
    /// Derived from a citizen report
    UserSubmitted,
    /// Added manually by an administrator
    AdminAdded,
}

impl SubcategorySource {
    pub const ALL: [SubcategorySource; 4] = [
        SubcategorySource::Predefined,
        SubcategorySource::AiGenerated,
        SubcategorySource::UserSubmitted,
        SubcategorySource::AdminAdded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Predefined => "predefined",
            Self::AiGenerated => "ai_generated",
            Self::UserSubmitted => "user_submitted",
            Self::AdminAdded => "admin_added",
        }
    }
}

impl fmt::Display for SubcategorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubcategorySource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "source",
                value: s.to_string(),
            })
    }
}

/// Lifecycle state of a subcategory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubcategoryStatus {
    /// Used for classification
    Active,
    /// Still valid but no longer offered
    Deprecated,
    /// Folded into another entry (see `merged_into`)
    Merged,
    /// Awaiting administrator approval
    PendingReview,
}

impl SubcategoryStatus {
    pub const ALL: [SubcategoryStatus; 4] = [
        SubcategoryStatus::Active,
        SubcategoryStatus::Deprecated,
        SubcategoryStatus::Merged,
        SubcategoryStatus::PendingReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deprecated => "deprecated",
            Self::Merged => "merged",
            Self::PendingReview => "pending_review",
        }
    }

    /// Whether entries in this state take part in `(topic, name)` uniqueness
    pub fn is_live(&self) -> bool {
        !matches!(self, Self::Merged)
    }
}

impl fmt::Display for SubcategoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubcategoryStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}
