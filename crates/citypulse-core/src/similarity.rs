//! Similarity scoring of free text against taxonomy entries
//!
//! Two pure scorers live here:
//! - field matching for `suggest`, a fixed ladder of checks over name,
//!   display name, aliases and description
//! - word-set overlap (Jaccard) used by the rule-based fallback

use ahash::AHashSet;

use crate::taxonomy::Subcategory;

/// Which field produced a match, and how strongly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMatch {
    pub score: f64,
    pub field: &'static str,
}

/// A ranked suggestion
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    pub subcategory: Subcategory,
    pub score: f64,
    pub field: &'static str,
}

/// Query equals the canonical name (score: 1.0)
#[inline]
pub fn exact_name_match(query: &str, name: &str) -> Option<FieldMatch> {
    (query == name).then_some(FieldMatch {
        score: 1.0,
        field: "name",
    })
}

/// Query is contained in the canonical name (score: 0.8)
#[inline]
pub fn name_substring_match(query: &str, name: &str) -> Option<FieldMatch> {
    name.contains(query).then_some(FieldMatch {
        score: 0.8,
        field: "name",
    })
}

/// Query is contained in the display name (score: 0.6)
#[inline]
pub fn display_name_match(query: &str, display_name: &str) -> Option<FieldMatch> {
    display_name.contains(query).then_some(FieldMatch {
        score: 0.6,
        field: "display_name",
    })
}

/// Query is contained in any alias (score: 0.7)
#[inline]
pub fn alias_match(query: &str, aliases: &[String]) -> Option<FieldMatch> {
    aliases
        .iter()
        .any(|alias| alias.trim().to_lowercase().contains(query))
        .then_some(FieldMatch {
            score: 0.7,
            field: "alias",
        })
}

/// Query is contained in the description (score: 0.4)
#[inline]
pub fn description_match(query: &str, description: Option<&str>) -> Option<FieldMatch> {
    description
        .filter(|d| d.trim().to_lowercase().contains(query))
        .map(|_| FieldMatch {
            score: 0.4,
            field: "description",
        })
}

/// Score one entry. Checks run in a fixed order and the first hit wins, so a
/// display-name hit (0.6) shadows a stronger alias hit (0.7).
pub fn score_subcategory(query: &str, subcategory: &Subcategory) -> Option<FieldMatch> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    let name = subcategory.name.trim().to_lowercase();
    let display_name = subcategory.display_name.trim().to_lowercase();

    exact_name_match(&query, &name)
        .or_else(|| name_substring_match(&query, &name))
        .or_else(|| display_name_match(&query, &display_name))
        .or_else(|| alias_match(&query, &subcategory.relationships.aliases))
        .or_else(|| description_match(&query, subcategory.description.as_deref()))
}

/// Rank entries against a query, highest score first, at most `limit` results.
///
/// Ties keep the input order.
pub fn rank_matches(query: &str, entries: &[Subcategory], limit: usize) -> Vec<SimilarityMatch> {
    let mut matches: Vec<SimilarityMatch> = entries
        .iter()
        .filter_map(|entry| {
            score_subcategory(query, entry).map(|m| SimilarityMatch {
                subcategory: entry.clone(),
                score: m.score,
                field: m.field,
            })
        })
        .collect();

    // sort_by is stable
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches.truncate(limit);
    matches
}

/// Lowercase whitespace-separated word set
pub fn word_set(text: &str) -> AHashSet<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// Jaccard overlap |A ∩ B| / |A ∪ B| of two word sets; 0.0 when both are empty
pub fn jaccard(a: &AHashSet<String>, b: &AHashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
