//! Subcategory entry and its usage metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{SubcategorySource, SubcategoryStatus, Topic};

/// Number of most recent confidence observations kept per entry
pub const CONFIDENCE_WINDOW: usize = 10;

/// Usage and feedback statistics for a subcategory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubcategoryMetadata {
    /// Number of classifications resolved to this entry (plus feedback events)
    pub usage_count: u64,
    pub last_used: Option<DateTime<Utc>>,
    /// Sliding window, oldest first, at most [`CONFIDENCE_WINDOW`] long
    pub confidence_scores: Vec<f64>,
    /// Mean of `confidence_scores`; absent until the first observation
    pub avg_confidence: Option<f64>,
    pub user_confirmations: u64,
    pub user_rejections: u64,
    /// Confidence of the classification that created the entry, if any
    pub creation_confidence: Option<f64>,
}

impl SubcategoryMetadata {
    /// Apply one usage event.
    pub fn record(&mut self, usage: &UsageUpdate, now: DateTime<Utc>) {
        self.usage_count += 1;
        self.last_used = Some(now);

        if let Some(confidence) = usage.confidence {
            self.confidence_scores.push(confidence);
            if self.confidence_scores.len() > CONFIDENCE_WINDOW {
                let excess = self.confidence_scores.len() - CONFIDENCE_WINDOW;
                self.confidence_scores.drain(..excess);
            }
            let sum: f64 = self.confidence_scores.iter().sum();
            self.avg_confidence = Some(sum / self.confidence_scores.len() as f64);
        }

        if usage.confirmed {
            self.user_confirmations += 1;
        }
        if usage.rejected {
            self.user_rejections += 1;
        }
    }

    /// confirmations / (confirmations + rejections), or `None` without feedback
    pub fn satisfaction_rate(&self) -> Option<f64> {
        let total = self.user_confirmations + self.user_rejections;
        if total == 0 {
            None
        } else {
            Some(self.user_confirmations as f64 / total as f64)
        }
    }
}

/// A single usage event passed to `update_usage`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageUpdate {
    pub confidence: Option<f64>,
    pub confirmed: bool,
    pub rejected: bool,
}

impl UsageUpdate {
    /// A classification resolved to the entry with the given confidence
    pub fn classification(confidence: f64) -> Self {
        Self {
            confidence: Some(confidence),
            ..Default::default()
        }
    }

    /// A user confirmed or rejected the entry for their report
    pub fn feedback(confirmed: bool) -> Self {
        Self {
            confidence: None,
            confirmed,
            rejected: !confirmed,
        }
    }
}

/// Links between subcategories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubcategoryRelationships {
    /// Alternative names resolving to this entry
    pub aliases: Vec<String>,
    /// Related subcategory IDs
    pub similar_subcategories: Vec<String>,
    pub parent_subcategory: Option<String>,
    pub child_subcategories: Vec<String>,
    /// IDs of entries folded into this one
    pub merged_from: Vec<String>,
    /// Set when this entry was folded into another
    pub merged_into: Option<String>,
}

/// Canonical taxonomy entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: String,
    /// Lowercase/underscore token, unique per topic among live entries
    pub name: String,
    pub topic: Topic,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: SubcategorySource,
    pub status: SubcategoryStatus,
    #[serde(default)]
    pub relationships: SubcategoryRelationships,
    #[serde(default)]
    pub metadata: SubcategoryMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Subcategory {
    /// Record a usage event and bump `updated_at`.
    pub fn apply_usage(&mut self, usage: &UsageUpdate, now: DateTime<Utc>) {
        self.metadata.record(usage, now);
        self.updated_at = now;
    }

    /// Case-insensitive comparison against the canonical name.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }

    /// Case-insensitive comparison against the aliases.
    pub fn has_alias(&self, name: &str) -> bool {
        let name = name.trim();
        self.relationships
            .aliases
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(name))
    }

    pub fn is_active(&self) -> bool {
        self.status == SubcategoryStatus::Active
    }

    /// Apply an administrative edit. Alias collisions are checked by the store.
    pub fn apply_update(&mut self, update: &SubcategoryUpdate, now: DateTime<Utc>) {
        if let Some(display_name) = &update.display_name {
            self.display_name = display_name.clone();
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(status) = update.status {
            self.status = status;
        }

        let aliases = &mut self.relationships.aliases;
        aliases.retain(|alias| {
            !update
                .remove_aliases
                .iter()
                .any(|r| r.trim().eq_ignore_ascii_case(alias))
        });
        for alias in &update.add_aliases {
            let alias = alias.trim().to_lowercase();
            if !alias.is_empty() && alias != self.name && !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }

        self.updated_at = now;
    }
}

/// Administrative edit of a subcategory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubcategoryUpdate {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<SubcategoryStatus>,
    pub add_aliases: Vec<String>,
    pub remove_aliases: Vec<String>,
}

/// "road_damage" -> "Road Damage"
pub fn display_name_for(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builder for new subcategories
#[derive(Debug)]
pub struct SubcategoryBuilder {
    subcategory: Subcategory,
}

impl SubcategoryBuilder {
    /// Start a new entry; the name is lowercased and trimmed, the display name
    /// is derived from it unless overridden.
    pub fn new(topic: Topic, name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim().to_lowercase();
        let now = Utc::now();
        Self {
            subcategory: Subcategory {
                id: Uuid::new_v4().to_string(),
                display_name: display_name_for(&name),
                name,
                topic,
                description: None,
                source: SubcategorySource::Predefined,
                status: SubcategoryStatus::Active,
                relationships: SubcategoryRelationships::default(),
                metadata: SubcategoryMetadata::default(),
                created_at: now,
                updated_at: now,
                created_by: None,
            },
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.subcategory.id = id.into();
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.subcategory.display_name = display_name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.subcategory.description = Some(description.into());
        self
    }

    pub fn maybe_description(mut self, description: Option<String>) -> Self {
        self.subcategory.description = description;
        self
    }

    pub fn source(mut self, source: SubcategorySource) -> Self {
        self.subcategory.source = source;
        self
    }

    pub fn status(mut self, status: SubcategoryStatus) -> Self {
        self.subcategory.status = status;
        self
    }

    pub fn alias(mut self, alias: impl AsRef<str>) -> Self {
        self.subcategory
            .relationships
            .aliases
            .push(alias.as_ref().trim().to_lowercase());
        self
    }

    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.subcategory.created_by = Some(created_by.into());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.subcategory.created_at = created_at;
        self.subcategory.updated_at = created_at;
        self
    }

    pub fn creation_confidence(mut self, confidence: f64) -> Self {
        self.subcategory.metadata.creation_confidence = Some(confidence);
        self
    }

    pub fn build(self) -> Subcategory {
        self.subcategory
    }
}
