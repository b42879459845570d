//! Rule-based fallback classifier

use super::seed::seed_entries;
use crate::similarity::{jaccard, word_set};
use crate::taxonomy::Topic;

/// Catch-all subcategory name
pub const GENERAL: &str = "general";

/// Overlap a seed must strictly exceed to be chosen; also the score reported
/// for the catch-all result
pub const FALLBACK_FLOOR: f64 = 0.2;

/// Outcome of the keyword fallback
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackClassification {
    pub name: String,
    /// Seed description, absent for the catch-all
    pub description: Option<String>,
    pub score: f64,
}

/// Pick the seed entry whose `name + " " + description` word set overlaps the
/// report text best.
///
/// Ties keep the earlier seed. When nothing beats [`FALLBACK_FLOOR`] the
/// result is `"general"` at the floor score. Deterministic for a given input.
pub fn classify_by_keywords(topic: Topic, text: &str) -> FallbackClassification {
    let text_words = word_set(text);

    let mut best: Option<(f64, &'static str, &'static str)> = None;
    for entry in seed_entries(topic) {
        let candidate = word_set(&format!("{} {}", entry.name, entry.description));
        let score = jaccard(&text_words, &candidate);
        if score > FALLBACK_FLOOR && best.map_or(true, |(top, _, _)| score > top) {
            best = Some((score, entry.name, entry.description));
        }
    }

    match best {
        Some((score, name, description)) => FallbackClassification {
            name: name.to_string(),
            description: Some(description.to_string()),
            score,
        },
        None => FallbackClassification {
            name: GENERAL.to_string(),
            description: None,
            score: FALLBACK_FLOOR,
        },
    }
}
