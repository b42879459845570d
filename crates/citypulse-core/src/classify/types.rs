//! Classification input and output types

use serde::{Deserialize, Serialize};
use std::fmt;

use super::severity::Severity;

/// Confidence reported when every tier failed
pub const LAST_RESORT_CONFIDENCE: f64 = 0.1;

/// Free text of one report plus what the classifier knows about the topic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationContext {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Short descriptions of attached media ("photo of flooded underpass")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media_hints: Vec<String>,
    /// Names of active subcategories for the topic at request time
    #[serde(default)]
    pub existing_subcategories: Vec<String>,
}

impl ClassificationContext {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_media_hint(mut self, hint: impl Into<String>) -> Self {
        self.media_hints.push(hint.into());
        self
    }

    /// Title and description joined by a space
    pub fn text(&self) -> String {
        format!("{} {}", self.title.trim(), self.description.trim())
            .trim()
            .to_string()
    }

    /// True when neither title nor description carries any text
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.description.trim().is_empty()
    }
}

/// Which tier produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationPath {
    /// Model answer at or above the threshold, resolved against the store
    Ai,
    /// Keyword fallback, resolved against the store
    Fallback,
    /// Classified, but the store was unreachable so nothing was persisted
    Degraded,
    /// Every tier failed, or the request was cancelled
    LastResort,
}

impl fmt::Display for ClassificationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ai => "ai",
            Self::Fallback => "fallback",
            Self::Degraded => "degraded",
            Self::LastResort => "last_resort",
        })
    }
}

/// Details of an entry created by this classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubcategoryInfo {
    pub id: String,
    pub display_name: String,
    pub description: Option<String>,
}

/// Uniform result of `classify`, whichever tier produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Canonical name of the resolved entry
    pub subcategory_name: String,
    /// ID of the resolved entry; absent when nothing was persisted
    pub subcategory_id: Option<String>,
    pub confidence: f64,
    pub is_new_subcategory: bool,
    pub reasoning: String,
    pub alternative_suggestions: Vec<String>,
    pub path: ClassificationPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_subcategory: Option<NewSubcategoryInfo>,
    /// Default severity for events filed under the resolved name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_severity: Option<Severity>,
}

impl ClassificationResult {
    /// The catch-all answer used when nothing else worked
    pub fn last_resort(reason: impl Into<String>) -> Self {
        Self {
            subcategory_name: super::GENERAL.to_string(),
            subcategory_id: None,
            confidence: LAST_RESORT_CONFIDENCE,
            is_new_subcategory: false,
            reasoning: reason.into(),
            alternative_suggestions: Vec::new(),
            path: ClassificationPath::LastResort,
            new_subcategory: None,
            suggested_severity: None,
        }
    }
}
