//! End-to-end tests for TaxonomyEngine with stub generators and stores

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use citypulse::{
    CancellationToken, ClassifyRequest, DisabledGenerator, EngineConfig, GenerationError,
    InvalidRequest, TaxonomyEngine, TextGenerator,
};
use citypulse_core::analytics::ReviewReason;
use citypulse_core::classify::Severity;
use citypulse_core::storage::{StoreError, StoreResult, TaxonomyStore};
use citypulse_core::taxonomy::{
    Subcategory, SubcategoryBuilder, SubcategorySource, SubcategoryStatus, SubcategoryUpdate,
    Topic, UsageUpdate,
};
use citypulse_core::{ClassificationContext, ClassificationPath, MemoryStore};
use citypulse_sqlite::SqliteStore;
use pretty_assertions::assert_eq;

/// Always answers with the same completion
struct FixedGenerator(String);

impl FixedGenerator {
    fn json(name: &str, confidence: f64) -> Self {
        Self(format!(
            r#"```json
{{"subcategory_name": "{}", "confidence_score": {}, "is_new_subcategory": true,
  "reasoning": "Reports of {}", "alternative_suggestions": ["other_thing"]}}
```"#,
            name, confidence, name
        ))
    }
}

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Status {
            status: 503,
            body: "overloaded".into(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

struct SlowGenerator(Duration);

#[async_trait]
impl TextGenerator for SlowGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        tokio::time::sleep(self.0).await;
        Ok(r#"{"subcategory_name": "late", "confidence_score": 0.99}"#.into())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

struct PanickingGenerator;

#[async_trait]
impl TextGenerator for PanickingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        panic!("generator bug")
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

/// Sleeps, then records that it ran to completion
struct FlaggingGenerator {
    delay: Duration,
    finished: Arc<AtomicBool>,
}

#[async_trait]
impl TextGenerator for FlaggingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(r#"{"subcategory_name": "late", "confidence_score": 0.99}"#.into())
    }

    fn name(&self) -> &str {
        "flagging"
    }
}

/// Memory store with a slow `create`
struct SlowCreateStore {
    inner: MemoryStore,
    delay: Duration,
}

impl TaxonomyStore for SlowCreateStore {
    fn create(&self, subcategory: Subcategory) -> StoreResult<bool> {
        std::thread::sleep(self.delay);
        self.inner.create(subcategory)
    }

    fn get(&self, id: &str) -> StoreResult<Option<Subcategory>> {
        self.inner.get(id)
    }

    fn list_by_topic(
        &self,
        topic: Topic,
        status: Option<SubcategoryStatus>,
    ) -> StoreResult<Vec<Subcategory>> {
        self.inner.list_by_topic(topic, status)
    }

    fn list_all(&self) -> StoreResult<Vec<Subcategory>> {
        self.inner.list_all()
    }

    fn find_by_name_or_alias(&self, topic: Topic, name: &str) -> StoreResult<Option<Subcategory>> {
        self.inner.find_by_name_or_alias(topic, name)
    }

    fn update_usage(&self, id: &str, usage: &UsageUpdate) -> StoreResult<bool> {
        self.inner.update_usage(id, usage)
    }

    fn update_subcategory(&self, id: &str, update: &SubcategoryUpdate) -> StoreResult<Subcategory> {
        self.inner.update_subcategory(id, update)
    }
}

/// Store whose backend is unreachable
struct UnreachableStore;

fn unreachable<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("connection refused".into()))
}

impl TaxonomyStore for UnreachableStore {
    fn create(&self, _subcategory: Subcategory) -> StoreResult<bool> {
        unreachable()
    }

    fn get(&self, _id: &str) -> StoreResult<Option<Subcategory>> {
        unreachable()
    }

    fn list_by_topic(
        &self,
        _topic: Topic,
        _status: Option<SubcategoryStatus>,
    ) -> StoreResult<Vec<Subcategory>> {
        unreachable()
    }

    fn list_all(&self) -> StoreResult<Vec<Subcategory>> {
        unreachable()
    }

    fn find_by_name_or_alias(&self, _topic: Topic, _name: &str) -> StoreResult<Option<Subcategory>> {
        unreachable()
    }

    fn update_usage(&self, _id: &str, _usage: &UsageUpdate) -> StoreResult<bool> {
        unreachable()
    }

    fn update_subcategory(&self, _id: &str, _update: &SubcategoryUpdate) -> StoreResult<Subcategory> {
        unreachable()
    }

    fn ping(&self) -> StoreResult<()> {
        unreachable()
    }
}

fn engine_with(store: Arc<dyn TaxonomyStore>, generator: impl TextGenerator + 'static) -> TaxonomyEngine {
    TaxonomyEngine::new(store, Arc::new(generator), EngineConfig::default())
}

async fn seeded_engine(generator: impl TextGenerator + 'static) -> (TaxonomyEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_with(store.clone(), generator);
    engine.seed_predefined().await.unwrap();
    (engine, store)
}

fn report(title: &str, description: &str) -> ClassificationContext {
    ClassificationContext::new(title, description)
}

#[tokio::test]
async fn test_fallback_without_ai_is_deterministic() {
    let (engine, _) = seeded_engine(DisabledGenerator).await;
    let context = report("", "Three cars collided on the ring road causing a long jam");

    let first = engine
        .classify(ClassifyRequest::new("traffic", context.clone()))
        .await
        .unwrap();
    let second = engine
        .classify(ClassifyRequest::new("traffic", context))
        .await
        .unwrap();

    assert_eq!(first.path, ClassificationPath::Fallback);
    assert!((0.2..=1.0).contains(&first.confidence));
    assert_eq!(first.subcategory_name, second.subcategory_name);
    assert_eq!(first.confidence, second.confidence);
    assert_eq!(first.subcategory_id, second.subcategory_id);
    assert!(!second.is_new_subcategory);
}

#[tokio::test]
async fn test_fallback_resolves_seeded_entry() {
    let (engine, store) = seeded_engine(FailingGenerator).await;

    let result = engine
        .classify(ClassifyRequest::new("Traffic", report("Accident", "Vehicle collisions")))
        .await
        .unwrap();

    assert_eq!(result.subcategory_name, "accident");
    assert_eq!(result.path, ClassificationPath::Fallback);
    assert!(!result.is_new_subcategory);
    assert_eq!(result.suggested_severity, Some(Severity::High));
    assert!(result.new_subcategory.is_none());
    assert!((result.confidence - 0.6).abs() < 1e-9);

    let entry = store.get(result.subcategory_id.as_deref().unwrap()).unwrap().unwrap();
    assert_eq!(entry.metadata.usage_count, 1);
    assert_eq!(entry.metadata.confidence_scores, vec![result.confidence]);
}

#[tokio::test]
async fn test_fallback_creates_general_once() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_with(store.clone(), DisabledGenerator);

    let first = engine
        .classify(ClassifyRequest::new("weather", report("Lost cat", "near the bakery")))
        .await
        .unwrap();
    assert_eq!(first.subcategory_name, "general");
    assert!(first.is_new_subcategory);
    let created = first.new_subcategory.as_ref().unwrap();
    assert_eq!(created.description.as_deref(), Some("General weather reports"));

    let entry = store.get(&created.id).unwrap().unwrap();
    assert_eq!(entry.source, SubcategorySource::Predefined);
    assert_eq!(entry.created_by.as_deref(), Some("fallback_classification"));

    let second = engine
        .classify(ClassifyRequest::new("weather", report("Lost dog", "")))
        .await
        .unwrap();
    assert!(!second.is_new_subcategory);
    assert_eq!(second.subcategory_id, first.subcategory_id);
}

#[tokio::test]
async fn test_ai_above_threshold_creates_subcategory() {
    let (engine, store) = seeded_engine(FixedGenerator::json("Drone Sighting", 0.9)).await;

    let result = engine
        .classify(ClassifyRequest::new("safety", report("Drone", "Hovering over the stadium")))
        .await
        .unwrap();

    assert_eq!(result.path, ClassificationPath::Ai);
    assert_eq!(result.subcategory_name, "drone_sighting");
    assert!(result.is_new_subcategory);
    assert_eq!(result.alternative_suggestions, vec!["other_thing"]);

    let info = result.new_subcategory.unwrap();
    assert_eq!(info.display_name, "Drone Sighting");
    assert_eq!(info.description.as_deref(), Some("Reports of Drone Sighting"));

    let entry = store.get(&info.id).unwrap().unwrap();
    assert_eq!(entry.source, SubcategorySource::AiGenerated);
    assert_eq!(entry.created_by.as_deref(), Some("ai_classification"));
    assert_eq!(entry.metadata.creation_confidence, Some(0.9));
    assert_eq!(entry.metadata.usage_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_classifications_create_one_entry() {
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(engine_with(store.clone(), FixedGenerator::json("drone_sighting", 0.95)));

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .classify(ClassifyRequest::new("safety", report("Drone", "Over the park")))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap());
    }

    assert_eq!(results[0].subcategory_id, results[1].subcategory_id);
    assert_eq!(results.iter().filter(|r| r.is_new_subcategory).count(), 1);
    let live = store
        .list_by_topic(Topic::Safety, Some(SubcategoryStatus::Active))
        .unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].metadata.usage_count, 2);
}

#[tokio::test]
async fn test_ai_below_threshold_uses_fallback_with_alternative() {
    let (engine, store) = seeded_engine(FixedGenerator::json("drone_sighting", 0.4)).await;

    let result = engine
        .classify(ClassifyRequest::new("traffic", report("Accident", "Vehicle collisions")))
        .await
        .unwrap();

    assert_eq!(result.path, ClassificationPath::Fallback);
    assert_eq!(result.subcategory_name, "accident");
    assert_eq!(result.alternative_suggestions, vec!["drone_sighting", "other_thing"]);
    assert!(store
        .find_by_name_or_alias(Topic::Traffic, "drone_sighting")
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_request_threshold_overrides_config() {
    let (engine, _) = seeded_engine(FixedGenerator::json("drone_sighting", 0.4)).await;

    let result = engine
        .classify(ClassifyRequest::new("safety", report("Drone", "")).threshold(0.3))
        .await
        .unwrap();
    assert_eq!(result.path, ClassificationPath::Ai);
    assert_eq!(result.subcategory_name, "drone_sighting");
}

#[tokio::test]
async fn test_unstructured_completion_is_scanned() {
    let generator = FixedGenerator("Looks like a pothole problem to me".into());
    let (engine, _) = seeded_engine(generator).await;

    let result = engine
        .classify(ClassifyRequest::new("infrastructure", report("Street", "Big hole")).threshold(0.2))
        .await
        .unwrap();

    assert_eq!(result.path, ClassificationPath::Ai);
    assert_eq!(result.subcategory_name, "road_damage");
    assert_eq!(result.confidence, 0.3);
    assert!(!result.is_new_subcategory);
}

#[tokio::test]
async fn test_generator_timeout_falls_back() {
    let store = Arc::new(MemoryStore::new());
    let config = EngineConfig {
        generation_timeout: Duration::from_millis(50),
        ..EngineConfig::default()
    };
    let engine = TaxonomyEngine::new(store, Arc::new(SlowGenerator(Duration::from_secs(30))), config);

    let result = engine
        .classify(ClassifyRequest::new("traffic", report("Accident", "Vehicle collisions")))
        .await
        .unwrap();
    assert_eq!(result.path, ClassificationPath::Fallback);
    assert_eq!(result.subcategory_name, "accident");
}

#[tokio::test]
async fn test_panicking_generator_falls_back() {
    let (engine, _) = seeded_engine(PanickingGenerator).await;

    let result = engine
        .classify(ClassifyRequest::new("weather", report("Flood", "Waterlogging and flooding")))
        .await
        .unwrap();
    assert_eq!(result.path, ClassificationPath::Fallback);
    assert_eq!(result.subcategory_name, "flood");
}

#[tokio::test]
async fn test_unreachable_store_degrades() {
    let engine = engine_with(Arc::new(UnreachableStore), FixedGenerator::json("drone_sighting", 0.9));

    let result = engine
        .classify(ClassifyRequest::new("safety", report("Drone", "")))
        .await
        .unwrap();
    assert_eq!(result.path, ClassificationPath::Degraded);
    assert_eq!(result.subcategory_name, "drone_sighting");
    assert!(result.subcategory_id.is_none());
    assert!(!result.is_new_subcategory);

    let engine = engine_with(Arc::new(UnreachableStore), DisabledGenerator);
    let result = engine
        .classify(ClassifyRequest::new("traffic", report("Accident", "Vehicle collisions")))
        .await
        .unwrap();
    assert_eq!(result.path, ClassificationPath::Degraded);
    assert_eq!(result.subcategory_name, "accident");
}

#[tokio::test]
async fn test_cancelled_request_returns_last_resort() {
    let (engine, _) = seeded_engine(SlowGenerator(Duration::from_secs(30))).await;
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let result = engine
        .classify(ClassifyRequest::new("traffic", report("Crash", "")).cancel_token(token))
        .await
        .unwrap();
    assert_eq!(result.path, ClassificationPath::LastResort);
    assert_eq!(result.subcategory_name, "general");
    assert_eq!(result.confidence, 0.1);
    assert!(result.subcategory_id.is_none());
    assert!(result.suggested_severity.is_none());
}

#[tokio::test]
async fn test_cancel_aborts_generator_call() {
    let finished = Arc::new(AtomicBool::new(false));
    let generator = FlaggingGenerator {
        delay: Duration::from_millis(200),
        finished: Arc::clone(&finished),
    };
    let (engine, _) = seeded_engine(generator).await;
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let result = engine
        .classify(ClassifyRequest::new("traffic", report("Crash", "")).cancel_token(token))
        .await
        .unwrap();
    assert_eq!(result.path, ClassificationPath::LastResort);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_deadline_aborts_generator_call() {
    let finished = Arc::new(AtomicBool::new(false));
    let generator = FlaggingGenerator {
        delay: Duration::from_millis(200),
        finished: Arc::clone(&finished),
    };
    let (engine, _) = seeded_engine(generator).await;

    let result = engine
        .classify(
            ClassifyRequest::new("traffic", report("Crash", "")).timeout(Duration::from_millis(20)),
        )
        .await
        .unwrap();
    assert_eq!(result.path, ClassificationPath::LastResort);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_cancel_during_store_write_reports_persisted_entry() {
    let store = Arc::new(SlowCreateStore {
        inner: MemoryStore::new(),
        delay: Duration::from_millis(150),
    });
    let engine = engine_with(store.clone(), DisabledGenerator);
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let result = engine
        .classify(
            ClassifyRequest::new("traffic", report("Accident", "Vehicle collisions"))
                .cancel_token(token.clone()),
        )
        .await
        .unwrap();
    assert!(token.is_cancelled());

    // Whatever the caller is told matches what the store recorded
    assert_eq!(result.path, ClassificationPath::Fallback);
    assert_eq!(result.subcategory_name, "accident");
    assert!(result.is_new_subcategory);
    let entry = store.get(result.subcategory_id.as_deref().unwrap()).unwrap().unwrap();
    assert_eq!(entry.name, "accident");
    assert_eq!(entry.metadata.usage_count, 1);
    assert_eq!(store.inner.len(), 1);
}

#[tokio::test]
async fn test_request_deadline_returns_last_resort() {
    let (engine, _) = seeded_engine(SlowGenerator(Duration::from_secs(30))).await;

    let result = engine
        .classify(
            ClassifyRequest::new("traffic", report("Crash", "")).timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap();
    assert_eq!(result.path, ClassificationPath::LastResort);
    assert_eq!(result.subcategory_name, "general");
}

#[tokio::test]
async fn test_invalid_requests_are_rejected() {
    let (engine, _) = seeded_engine(DisabledGenerator).await;

    let err = engine
        .classify(ClassifyRequest::new("parking", report("Crash", "")))
        .await
        .unwrap_err();
    assert!(matches!(err, InvalidRequest::UnknownTopic(_)));

    let err = engine
        .classify(ClassifyRequest::new("traffic", report("  ", "\t")))
        .await
        .unwrap_err();
    assert_eq!(err, InvalidRequest::EmptyText);

    let err = engine
        .classify(ClassifyRequest::new("traffic", report("Crash", "")).threshold(1.5))
        .await
        .unwrap_err();
    assert_eq!(err, InvalidRequest::ThresholdOutOfRange(1.5));
}

#[tokio::test]
async fn test_alias_resolves_to_canonical_entry() {
    let congestion = SubcategoryBuilder::new(Topic::Traffic, "congestion")
        .alias("traffic_jam")
        .build();
    let id = congestion.id.clone();
    let store = Arc::new(MemoryStore::with_subcategories(vec![congestion]));
    let engine = engine_with(store, FixedGenerator::json("Traffic Jam", 0.9));

    let result = engine
        .classify(ClassifyRequest::new("traffic", report("Stuck", "Nothing moves")))
        .await
        .unwrap();
    assert_eq!(result.subcategory_name, "congestion");
    assert_eq!(result.subcategory_id.as_deref(), Some(id.as_str()));
    assert!(!result.is_new_subcategory);
}

#[tokio::test]
async fn test_confidence_window_keeps_last_ten() {
    let (engine, store) = seeded_engine(DisabledGenerator).await;

    let mut id = None;
    for _ in 0..12 {
        let result = engine
            .classify(ClassifyRequest::new("traffic", report("Accident", "Vehicle collisions")))
            .await
            .unwrap();
        id = result.subcategory_id;
    }

    let entry = store.get(&id.unwrap()).unwrap().unwrap();
    assert_eq!(entry.metadata.usage_count, 12);
    assert_eq!(entry.metadata.confidence_scores.len(), 10);
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_with(store.clone(), DisabledGenerator);

    let first = engine.seed_predefined().await.unwrap();
    assert_eq!(first.created, 30);
    assert_eq!(first.existing, 0);

    let second = engine.seed_predefined().await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.existing, 30);
    assert_eq!(store.len(), 30);

    let seeded = store.find_by_name_or_alias(Topic::Events, "music").unwrap().unwrap();
    assert_eq!(seeded.created_by.as_deref(), Some("system"));
    assert_eq!(seeded.description.as_deref(), Some("Concerts and musical events"));
}

#[tokio::test]
async fn test_feedback_flags_entry_for_review() {
    let (engine, store) = seeded_engine(DisabledGenerator).await;
    let id = store
        .find_by_name_or_alias(Topic::Traffic, "congestion")
        .unwrap()
        .unwrap()
        .id;

    for _ in 0..3 {
        assert!(engine.record_user_feedback(&id, false).await.unwrap());
    }
    assert!(engine.record_user_feedback(&id, true).await.unwrap());
    assert!(!engine.record_user_feedback("missing", true).await.unwrap());

    let entry = store.get(&id).unwrap().unwrap();
    assert_eq!(entry.metadata.user_rejections, 3);
    assert_eq!(entry.metadata.user_confirmations, 1);

    let report = engine.analytics_report().await.unwrap();
    let flag = report.needs_review.iter().find(|f| f.id == id).unwrap();
    assert_eq!(flag.reason, ReviewReason::MoreRejectionsThanConfirmations);
}

#[tokio::test]
async fn test_list_and_suggest_skip_inactive_entries() {
    let (engine, store) = seeded_engine(DisabledGenerator).await;
    let fog = store.find_by_name_or_alias(Topic::Weather, "fog").unwrap().unwrap();
    engine
        .update_subcategory(
            &fog.id,
            SubcategoryUpdate {
                status: Some(SubcategoryStatus::Deprecated),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let names: Vec<_> = engine
        .list_available(Topic::Weather)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["flood", "heat", "rain", "storm", "wind"]);

    assert!(engine.suggest(Topic::Weather, "fog").await.unwrap().is_empty());

    let suggestions = engine.suggest(Topic::Traffic, "jam").await.unwrap();
    assert_eq!(suggestions[0].name, "congestion");
    assert_eq!(suggestions[0].similarity_score, 0.4);

    let congestion = store.find_by_name_or_alias(Topic::Traffic, "congestion").unwrap().unwrap();
    engine
        .update_subcategory(
            &congestion.id,
            SubcategoryUpdate {
                add_aliases: vec!["jam".into(), "traffic_jam".into()],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let suggestions = engine.suggest(Topic::Traffic, "jam").await.unwrap();
    assert_eq!(suggestions[0].name, "congestion");
    assert_eq!(suggestions[0].similarity_score, 0.7);

    let suggestions = engine.suggest(Topic::Traffic, "accident").await.unwrap();
    assert_eq!(suggestions[0].name, "accident");
    assert_eq!(suggestions[0].similarity_score, 1.0);
}

#[tokio::test]
async fn test_health_check() {
    let (engine, _) = seeded_engine(DisabledGenerator).await;
    let health = engine.health_check().await;
    assert!(health.store_reachable);
    assert!(health.seeded);
    assert_eq!(health.total_subcategories, Some(30));
    assert_eq!(health.generator, "disabled");
    assert!(!health.generator_configured);

    let engine = engine_with(Arc::new(UnreachableStore), FailingGenerator);
    let health = engine.health_check().await;
    assert!(!health.store_reachable);
    assert!(!health.seeded);
    assert!(health.generator_configured);
}

#[tokio::test]
async fn test_sqlite_backed_engine_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taxonomy.db");

    let created_id = {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let engine = engine_with(store, FixedGenerator::json("drone_sighting", 0.9));
        engine.seed_predefined().await.unwrap();
        let result = engine
            .classify(ClassifyRequest::new("safety", report("Drone", "")))
            .await
            .unwrap();
        assert!(result.is_new_subcategory);
        result.subcategory_id.unwrap()
    };

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let engine = engine_with(store.clone(), FixedGenerator::json("drone_sighting", 0.9));
    assert_eq!(engine.seed_predefined().await.unwrap().created, 0);

    let result = engine
        .classify(ClassifyRequest::new("safety", report("Drone", "again")))
        .await
        .unwrap();
    assert_eq!(result.subcategory_id.as_deref(), Some(created_id.as_str()));
    assert!(!result.is_new_subcategory);
    assert_eq!(store.get(&created_id).unwrap().unwrap().metadata.usage_count, 2);
}
