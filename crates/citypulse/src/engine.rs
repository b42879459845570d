//! Classification orchestrator
//!
//! [`TaxonomyEngine::classify`] runs the tiers in order:
//!
//! ```text
//! snapshot active names ─► model call (bounded) ─► parse / heuristic scan
//!        │                                              │
//!        │                   confidence >= threshold ───┤─── below / failed
//!        ▼                                              ▼
//!   get_or_create (ai_generated)          keyword fallback ─► get_or_create (predefined)
//!        └──────────────► update_usage ◄────────────────────┘
//! ```
//!
//! Store calls run on the blocking pool. If the store is unreachable the
//! computed classification is returned unpersisted (`degraded`). Cancellation
//! or a request deadline before the store write, or any other failure, yields
//! the last-resort `"general"` result and aborts the model call. Only request
//! validation is reported as an error.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use citypulse_core::analytics::AnalyticsReport;
use citypulse_core::classify::{
    build_prompt, classify_by_keywords, parse_completion, seed_entries, severity_hint,
    AiClassification, ClassificationContext, ClassificationPath, ClassificationResult,
    NewSubcategoryInfo, ParsedCompletion, GENERAL,
};
use citypulse_core::similarity::rank_matches;
use citypulse_core::storage::{StoreError, StoreResult, TaxonomyStore};
use citypulse_core::taxonomy::{
    Subcategory, SubcategoryBuilder, SubcategorySource, SubcategoryStatus, SubcategoryUpdate,
    Topic, UsageUpdate,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::EngineConfig;
use crate::error::{InvalidRequest, Result};
use crate::generator::TextGenerator;
use crate::tracing::prefix;

const AI_CREATOR: &str = "ai_classification";
const FALLBACK_CREATOR: &str = "fallback_classification";
const SEED_CREATOR: &str = "system";

/// One call to [`TaxonomyEngine::classify`]
#[derive(Debug, Clone)]
pub struct ClassifyRequest {
    /// Topic name as supplied by the caller; parsed case-insensitively
    pub topic: String,
    pub context: ClassificationContext,
    /// Overrides the engine's configured threshold
    pub min_confidence_threshold: Option<f64>,
    /// Ask the model to propose a new subcategory rather than reuse one
    pub force_create_new: bool,
    /// Overrides the engine's configured request deadline
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl ClassifyRequest {
    pub fn new(topic: impl Into<String>, context: ClassificationContext) -> Self {
        Self {
            topic: topic.into(),
            context,
            min_confidence_threshold: None,
            force_create_new: false,
            timeout: None,
            cancel: None,
        }
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.min_confidence_threshold = Some(threshold);
        self
    }

    pub fn force_create_new(mut self, force: bool) -> Self {
        self.force_create_new = force;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn validate(&self, default_threshold: f64) -> std::result::Result<(Topic, f64), InvalidRequest> {
        let topic: Topic = self.topic.parse()?;
        if self.context.is_blank() {
            return Err(InvalidRequest::EmptyText);
        }
        let threshold = self.min_confidence_threshold.unwrap_or(default_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(InvalidRequest::ThresholdOutOfRange(threshold));
        }
        Ok((topic, threshold))
    }
}

/// Row of `list_available`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryInfo {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub usage_count: u64,
    pub avg_confidence: Option<f64>,
    pub source: SubcategorySource,
    pub status: SubcategoryStatus,
}

impl From<Subcategory> for SubcategoryInfo {
    fn from(s: Subcategory) -> Self {
        Self {
            id: s.id,
            name: s.name,
            display_name: s.display_name,
            description: s.description,
            usage_count: s.metadata.usage_count,
            avg_confidence: s.metadata.avg_confidence,
            source: s.source,
            status: s.status,
        }
    }
}

/// Row of `suggest`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub similarity_score: f64,
    pub usage_count: u64,
}

/// Outcome of `seed_predefined`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub created: usize,
    pub existing: usize,
}

/// Outcome of `health_check`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub store_reachable: bool,
    pub total_subcategories: Option<usize>,
    /// Every predefined entry is present
    pub seeded: bool,
    pub generator: String,
    pub generator_configured: bool,
}

/// Taxonomy-backed report classifier
pub struct TaxonomyEngine {
    store: Arc<dyn TaxonomyStore>,
    generator: Arc<dyn TextGenerator>,
    config: EngineConfig,
}

impl TaxonomyEngine {
    pub fn new(
        store: Arc<dyn TaxonomyStore>,
        generator: Arc<dyn TextGenerator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn TaxonomyStore> {
        &self.store
    }

    /// Run a store operation on the blocking pool.
    async fn blocking<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&dyn TaxonomyStore) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store task failed: {}", e)))?
    }

    /// Classify a report.
    ///
    /// Returns `Err` only for invalid requests. Every other failure is folded
    /// into the result (see [`ClassificationPath`]). Cancellation and the
    /// request deadline apply until a subcategory has been picked; once the
    /// store write starts it runs to completion and its outcome is returned.
    pub async fn classify(
        &self,
        request: ClassifyRequest,
    ) -> std::result::Result<ClassificationResult, InvalidRequest> {
        let (topic, threshold) = request.validate(self.config.min_confidence_threshold)?;
        let cancel = request.cancel.unwrap_or_default();
        let deadline = request.timeout.or(self.config.request_timeout);

        let decide = self.decide(topic, request.context, threshold, request.force_create_new);

        let decided = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("{} classification of {} cancelled", prefix::TAXONOMY, topic);
                Err("Classification cancelled")
            }
            _ = deadline_elapsed(deadline) => {
                warn!("{} classification of {} exceeded its deadline", prefix::TAXONOMY, topic);
                Err("Classification deadline exceeded")
            }
            pending = decide => Ok(pending),
        };

        let mut result = match decided {
            Ok((candidate, mut result)) => {
                self.persist(candidate, &mut result).await;
                result
            }
            Err(reason) => ClassificationResult::last_resort(reason),
        };
        result.suggested_severity = severity_hint(&result.subcategory_name);

        info!(
            topic = %topic,
            subcategory = %result.subcategory_name,
            confidence = result.confidence,
            path = %result.path,
            is_new = result.is_new_subcategory,
            "{} classified report",
            prefix::TAXONOMY
        );
        Ok(result)
    }

    /// Pick a candidate entry and the unpersisted result. No store writes.
    async fn decide(
        &self,
        topic: Topic,
        mut context: ClassificationContext,
        threshold: f64,
        force_create_new: bool,
    ) -> (Subcategory, ClassificationResult) {
        match self
            .blocking(move |store| store.list_by_topic(topic, Some(SubcategoryStatus::Active)))
            .await
        {
            Ok(active) => {
                context.existing_subcategories = active.into_iter().map(|s| s.name).collect();
            }
            Err(e) => {
                warn!("{} snapshot of {} failed, continuing without it: {}", prefix::DB, topic, e);
                context.existing_subcategories.clear();
            }
        }

        let ai = self.ai_classify(topic, &context, force_create_new).await;

        let mut below_threshold = None;
        if let Some(ai) = ai {
            if ai.confidence >= threshold {
                return ai_candidate(topic, ai);
            }
            debug!(
                "{} model answer {} ({:.2}) below threshold {:.2}",
                prefix::AI,
                ai.subcategory_name,
                ai.confidence,
                threshold
            );
            below_threshold = Some(ai);
        }

        fallback_candidate(topic, &context, below_threshold)
    }

    /// Model round trip. `None` on any failure.
    async fn ai_classify(
        &self,
        topic: Topic,
        context: &ClassificationContext,
        force_create_new: bool,
    ) -> Option<AiClassification> {
        let prompt = build_prompt(topic, context, force_create_new);
        let generator = Arc::clone(&self.generator);

        // Own task so a panicking generator can't take the request down; the
        // guard aborts it when this future is dropped or times out
        let mut call = AbortOnDrop(tokio::spawn(async move { generator.generate(&prompt).await }));
        let completion = match tokio::time::timeout(self.config.generation_timeout, &mut call.0).await {
            Ok(Ok(Ok(text))) => text,
            Ok(Ok(Err(e))) => {
                warn!("{} {} failed: {}", prefix::AI, self.generator.name(), e);
                return None;
            }
            Ok(Err(join_error)) => {
                warn!("{} {} task failed: {}", prefix::AI, self.generator.name(), join_error);
                return None;
            }
            Err(_) => {
                warn!(
                    "{} {} timed out after {:?}",
                    prefix::AI,
                    self.generator.name(),
                    self.config.generation_timeout
                );
                return None;
            }
        };

        if completion.trim().is_empty() {
            warn!("{} empty completion", prefix::AI);
            return None;
        }

        let parsed = parse_completion(&completion);
        if let ParsedCompletion::Unparseable(raw) = &parsed {
            warn!(
                "{} unstructured completion, scanning text ({} chars)",
                prefix::AI,
                raw.len()
            );
        }
        Some(parsed.into_classification(topic, &context.existing_subcategories))
    }

    /// Resolve the candidate against the store and record usage, filling in
    /// the resolved identity on `result`.
    async fn persist(&self, candidate: Subcategory, result: &mut ClassificationResult) {
        let confidence = result.confidence;
        let resolved = self
            .blocking(move |store| {
                let (entry, created) = store.get_or_create(candidate)?;
                let counted = store.update_usage(&entry.id, &UsageUpdate::classification(confidence));
                Ok((entry, created, counted))
            })
            .await;

        match resolved {
            Ok((entry, created, counted)) => {
                if let Err(e) = counted {
                    warn!("{} usage update for {} failed: {}", prefix::DB, entry.id, e);
                }
                if created {
                    info!(
                        "{} created subcategory {}/{} ({})",
                        prefix::TAXONOMY,
                        entry.topic,
                        entry.name,
                        entry.source
                    );
                    result.new_subcategory = Some(NewSubcategoryInfo {
                        id: entry.id.clone(),
                        display_name: entry.display_name.clone(),
                        description: entry.description.clone(),
                    });
                }
                result.subcategory_name = entry.name;
                result.subcategory_id = Some(entry.id);
                result.is_new_subcategory = created;
            }
            Err(e) if e.is_unavailable() => {
                warn!("{} store unavailable, result not persisted: {}", prefix::DB, e);
                result.path = ClassificationPath::Degraded;
            }
            Err(e) => {
                warn!("{} resolution failed: {}", prefix::TAXONOMY, e);
                *result = ClassificationResult::last_resort(format!("Classification failed: {}", e));
            }
        }
    }

    /// Active subcategories of a topic
    pub async fn list_available(&self, topic: Topic) -> Result<Vec<SubcategoryInfo>> {
        let active = self
            .blocking(move |store| store.list_by_topic(topic, Some(SubcategoryStatus::Active)))
            .await?;
        Ok(active.into_iter().map(SubcategoryInfo::from).collect())
    }

    /// Active subcategories of a topic ranked by similarity to `query`
    pub async fn suggest(&self, topic: Topic, query: &str) -> Result<Vec<Suggestion>> {
        let active = self
            .blocking(move |store| store.list_by_topic(topic, Some(SubcategoryStatus::Active)))
            .await?;
        let ranked = rank_matches(query, &active, self.config.suggestion_limit);
        Ok(ranked
            .into_iter()
            .map(|m| Suggestion {
                id: m.subcategory.id,
                name: m.subcategory.name,
                display_name: m.subcategory.display_name,
                description: m.subcategory.description,
                similarity_score: m.score,
                usage_count: m.subcategory.metadata.usage_count,
            })
            .collect())
    }

    /// Record a user's confirmation or rejection. `false` if the ID is unknown.
    pub async fn record_user_feedback(&self, id: &str, confirmed: bool) -> Result<bool> {
        let id = id.to_string();
        let found = self
            .blocking(move |store| store.update_usage(&id, &UsageUpdate::feedback(confirmed)))
            .await?;
        Ok(found)
    }

    /// Administrative edit of a subcategory
    pub async fn update_subcategory(&self, id: &str, update: SubcategoryUpdate) -> Result<Subcategory> {
        let id = id.to_string();
        let updated = self
            .blocking(move |store| store.update_subcategory(&id, &update))
            .await?;
        Ok(updated)
    }

    pub async fn analytics_report(&self) -> Result<AnalyticsReport> {
        let entries = self.blocking(|store| store.list_all()).await?;
        Ok(AnalyticsReport::from_subcategories(&entries, Utc::now()))
    }

    /// Insert every predefined subcategory that is missing. Idempotent.
    pub async fn seed_predefined(&self) -> Result<SeedReport> {
        let report = self
            .blocking(|store| {
                let mut report = SeedReport::default();
                for topic in Topic::ALL {
                    for seed in seed_entries(topic) {
                        let candidate = SubcategoryBuilder::new(topic, seed.name)
                            .description(seed.description)
                            .source(SubcategorySource::Predefined)
                            .created_by(SEED_CREATOR)
                            .build();
                        let (_, created) = store.get_or_create(candidate)?;
                        if created {
                            report.created += 1;
                        } else {
                            report.existing += 1;
                        }
                    }
                }
                Ok(report)
            })
            .await?;

        info!(
            "{} seeded taxonomy: {} created, {} already present",
            prefix::TAXONOMY,
            report.created,
            report.existing
        );
        Ok(report)
    }

    /// Store reachability, seed completeness and generator availability
    pub async fn health_check(&self) -> HealthReport {
        let reachability = self
            .blocking(|store| {
                store.ping()?;
                let total = store.count()?;
                let mut seeded = true;
                'topics: for topic in Topic::ALL {
                    for seed in seed_entries(topic) {
                        if store.find_by_name_or_alias(topic, seed.name)?.is_none() {
                            seeded = false;
                            break 'topics;
                        }
                    }
                }
                Ok((total, seeded))
            })
            .await;

        let (store_reachable, total_subcategories, seeded) = match reachability {
            Ok((total, seeded)) => (true, Some(total), seeded),
            Err(e) => {
                warn!("{} health check failed: {}", prefix::DB, e);
                (false, None, false)
            }
        };

        HealthReport {
            store_reachable,
            total_subcategories,
            seeded,
            generator: self.generator.name().to_string(),
            generator_configured: self.generator.is_configured(),
        }
    }
}

fn ai_candidate(topic: Topic, ai: AiClassification) -> (Subcategory, ClassificationResult) {
    let mut builder = SubcategoryBuilder::new(topic, &ai.subcategory_name)
        .source(SubcategorySource::AiGenerated)
        .created_by(AI_CREATOR)
        .creation_confidence(ai.confidence);
    if !ai.reasoning.is_empty() {
        builder = builder.description(ai.reasoning.clone());
    }

    let result = ClassificationResult {
        subcategory_name: ai.subcategory_name,
        subcategory_id: None,
        confidence: ai.confidence,
        is_new_subcategory: false,
        reasoning: ai.reasoning,
        alternative_suggestions: ai.alternative_suggestions,
        path: ClassificationPath::Ai,
        new_subcategory: None,
        suggested_severity: None,
    };
    (builder.build(), result)
}

fn fallback_candidate(
    topic: Topic,
    context: &ClassificationContext,
    below_threshold: Option<AiClassification>,
) -> (Subcategory, ClassificationResult) {
    let fallback = classify_by_keywords(topic, &context.text());
    let description = fallback
        .description
        .clone()
        .unwrap_or_else(|| format!("General {} reports", topic));

    let candidate = SubcategoryBuilder::new(topic, &fallback.name)
        .description(description)
        .source(SubcategorySource::Predefined)
        .created_by(FALLBACK_CREATOR)
        .creation_confidence(fallback.score)
        .build();

    let reasoning = if fallback.name == GENERAL {
        "No keyword rule matched the report".to_string()
    } else {
        format!("Keyword overlap {:.2} with '{}'", fallback.score, fallback.name)
    };

    let mut alternatives = Vec::new();
    if let Some(ai) = below_threshold {
        if ai.subcategory_name != fallback.name {
            alternatives.push(ai.subcategory_name);
        }
        alternatives.extend(
            ai.alternative_suggestions
                .into_iter()
                .filter(|name| *name != fallback.name),
        );
        alternatives.dedup();
    }

    let result = ClassificationResult {
        subcategory_name: fallback.name,
        subcategory_id: None,
        confidence: fallback.score,
        is_new_subcategory: false,
        reasoning,
        alternative_suggestions: alternatives,
        path: ClassificationPath::Fallback,
        new_subcategory: None,
        suggested_severity: None,
    };
    (candidate, result)
}

/// Aborts the wrapped task when dropped
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn deadline_elapsed(deadline: Option<Duration>) {
    match deadline {
        Some(deadline) => tokio::time::sleep(deadline).await,
        None => std::future::pending().await,
    }
}
