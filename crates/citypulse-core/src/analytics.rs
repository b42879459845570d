//! Taxonomy analytics
//!
//! A read-only aggregation over a snapshot of every entry. Nothing here
//! touches a store; callers pass in `list_all()` output.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::taxonomy::{Subcategory, SubcategorySource, SubcategoryStatus, Topic};

/// Entries listed as most used per topic
pub const MOST_USED_LIMIT: usize = 5;
/// Unused entries listed per topic
pub const LEAST_USED_LIMIT: usize = 5;
/// Entries listed as top performers across topics
pub const TOP_PERFORMERS_LIMIT: usize = 10;
/// Window for "recently created"
pub const RECENT_DAYS: i64 = 30;
/// Average confidence below which an entry is flagged
pub const REVIEW_CONFIDENCE_THRESHOLD: f64 = 0.5;
/// Average confidence above which an entry counts as high confidence
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Short view of an entry used in rankings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub topic: Topic,
    pub usage_count: u64,
    pub avg_confidence: Option<f64>,
}

impl From<&Subcategory> for UsageSummary {
    fn from(s: &Subcategory) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            display_name: s.display_name.clone(),
            topic: s.topic,
            usage_count: s.metadata.usage_count,
            avg_confidence: s.metadata.avg_confidence,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicStats {
    pub total: usize,
    pub active: usize,
    pub most_used: Vec<UsageSummary>,
    pub least_used: Vec<UsageSummary>,
    pub recently_created: usize,
    /// Mean of the entries' average confidences, ignoring entries without one
    pub avg_confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    LowConfidence,
    MoreRejectionsThanConfirmations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFlag {
    pub id: String,
    pub name: String,
    pub topic: Topic,
    pub reason: ReviewReason,
    pub avg_confidence: Option<f64>,
    pub user_confirmations: u64,
    pub user_rejections: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionEntry {
    pub id: String,
    pub name: String,
    pub topic: Topic,
    pub rate: f64,
    pub user_confirmations: u64,
    pub user_rejections: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_subcategories: usize,
    pub ai_generated: usize,
    pub ai_generated_percentage: f64,
    pub high_confidence: usize,
    pub total_feedback: u64,
    /// Confirmations over all feedback; absent without feedback
    pub satisfaction_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub topics: BTreeMap<Topic, TopicStats>,
    pub by_source: BTreeMap<SubcategorySource, usize>,
    pub by_status: BTreeMap<SubcategoryStatus, usize>,
    pub top_performers: Vec<UsageSummary>,
    pub satisfaction: Vec<SatisfactionEntry>,
    pub needs_review: Vec<ReviewFlag>,
    pub performance: PerformanceSummary,
}

/// Why an entry needs administrator attention, if it does
pub fn review_reason(subcategory: &Subcategory) -> Option<ReviewReason> {
    let metadata = &subcategory.metadata;
    if metadata
        .avg_confidence
        .is_some_and(|avg| avg < REVIEW_CONFIDENCE_THRESHOLD)
    {
        return Some(ReviewReason::LowConfidence);
    }
    if metadata.user_rejections > 0 && metadata.user_rejections > metadata.user_confirmations {
        return Some(ReviewReason::MoreRejectionsThanConfirmations);
    }
    None
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn by_usage_desc(entries: &mut [&Subcategory]) {
    entries.sort_by_key(|s| Reverse(s.metadata.usage_count));
}

impl AnalyticsReport {
    /// Aggregate a snapshot of entries. `now` anchors the recent-creation window.
    pub fn from_subcategories(entries: &[Subcategory], now: DateTime<Utc>) -> Self {
        let recent_cutoff = now - Duration::days(RECENT_DAYS);

        let mut topics = BTreeMap::new();
        for topic in Topic::ALL {
            let in_topic: Vec<&Subcategory> = entries.iter().filter(|s| s.topic == topic).collect();

            let mut used: Vec<&Subcategory> = in_topic
                .iter()
                .copied()
                .filter(|s| s.metadata.usage_count > 0)
                .collect();
            by_usage_desc(&mut used);

            let stats = TopicStats {
                total: in_topic.len(),
                active: in_topic.iter().filter(|s| s.is_active()).count(),
                most_used: used
                    .iter()
                    .take(MOST_USED_LIMIT)
                    .map(|s| UsageSummary::from(*s))
                    .collect(),
                least_used: in_topic
                    .iter()
                    .filter(|s| s.metadata.usage_count == 0)
                    .take(LEAST_USED_LIMIT)
                    .map(|s| UsageSummary::from(*s))
                    .collect(),
                recently_created: in_topic
                    .iter()
                    .filter(|s| s.created_at >= recent_cutoff)
                    .count(),
                avg_confidence: mean(in_topic.iter().filter_map(|s| s.metadata.avg_confidence)),
            };
            topics.insert(topic, stats);
        }

        let mut by_source = BTreeMap::new();
        let mut by_status = BTreeMap::new();
        for entry in entries {
            *by_source.entry(entry.source).or_insert(0) += 1;
            *by_status.entry(entry.status).or_insert(0) += 1;
        }

        let mut ranked: Vec<&Subcategory> = entries
            .iter()
            .filter(|s| s.metadata.usage_count > 0)
            .collect();
        by_usage_desc(&mut ranked);
        let top_performers = ranked
            .into_iter()
            .take(TOP_PERFORMERS_LIMIT)
            .map(UsageSummary::from)
            .collect();

        let satisfaction = entries
            .iter()
            .filter_map(|s| {
                s.metadata.satisfaction_rate().map(|rate| SatisfactionEntry {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    topic: s.topic,
                    rate,
                    user_confirmations: s.metadata.user_confirmations,
                    user_rejections: s.metadata.user_rejections,
                })
            })
            .collect();

        let needs_review = entries
            .iter()
            .filter(|s| s.status.is_live())
            .filter_map(|s| {
                review_reason(s).map(|reason| ReviewFlag {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    topic: s.topic,
                    reason,
                    avg_confidence: s.metadata.avg_confidence,
                    user_confirmations: s.metadata.user_confirmations,
                    user_rejections: s.metadata.user_rejections,
                })
            })
            .collect();

        Self {
            generated_at: now,
            topics,
            by_source,
            by_status,
            top_performers,
            satisfaction,
            needs_review,
            performance: PerformanceSummary::from_subcategories(entries),
        }
    }
}

impl PerformanceSummary {
    pub fn from_subcategories(entries: &[Subcategory]) -> Self {
        let total = entries.len();
        let ai_generated = entries
            .iter()
            .filter(|s| s.source == SubcategorySource::AiGenerated)
            .count();
        let high_confidence = entries
            .iter()
            .filter(|s| {
                s.metadata
                    .avg_confidence
                    .is_some_and(|avg| avg > HIGH_CONFIDENCE_THRESHOLD)
            })
            .count();
        let confirmations: u64 = entries.iter().map(|s| s.metadata.user_confirmations).sum();
        let rejections: u64 = entries.iter().map(|s| s.metadata.user_rejections).sum();
        let total_feedback = confirmations + rejections;

        Self {
            total_subcategories: total,
            ai_generated,
            ai_generated_percentage: if total == 0 {
                0.0
            } else {
                ai_generated as f64 * 100.0 / total as f64
            },
            high_confidence,
            total_feedback,
            satisfaction_rate: (total_feedback > 0)
                .then(|| confirmations as f64 / total_feedback as f64),
        }
    }
}
