//! In-memory storage backend
//!
//! A map of per-entry locks. Creation takes the map's write lock for the
//! duplicate check and insert; usage updates take the read lock and only the
//! target entry's mutex, so updates to different entries run in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use crate::storage::error::{StoreError, StoreResult};
use crate::storage::traits::{validate_update, TaxonomyStore};
use crate::taxonomy::{Subcategory, SubcategoryStatus, SubcategoryUpdate, Topic, UsageUpdate};

type Entry = Arc<Mutex<Subcategory>>;

/// In-memory taxonomy store.
///
/// Useful for:
/// - Unit and integration testing
/// - Short-lived processes that don't need persistence
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory store with initial entries; duplicates are skipped.
    pub fn with_subcategories(subcategories: Vec<Subcategory>) -> Self {
        let store = Self::new();
        for subcategory in subcategories {
            let _ = store.create(subcategory);
        }
        store
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn snapshot<F>(&self, mut keep: F) -> Vec<Subcategory>
    where
        F: FnMut(&Subcategory) -> bool,
    {
        let entries = self.entries.read();
        let mut out: Vec<Subcategory> = entries
            .values()
            .filter_map(|entry| {
                let entry = entry.lock();
                keep(&entry).then(|| entry.clone())
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        out
    }
}

impl TaxonomyStore for MemoryStore {
    fn create(&self, subcategory: Subcategory) -> StoreResult<bool> {
        let mut entries = self.entries.write();
        if entries.contains_key(&subcategory.id) {
            return Err(StoreError::AlreadyExists(subcategory.id));
        }
        // A live entry already owns the name, canonically or as an alias
        let taken = entries.values().any(|entry| {
            let entry = entry.lock();
            entry.topic == subcategory.topic
                && entry.status.is_live()
                && (entry.name == subcategory.name || entry.has_alias(&subcategory.name))
        });
        if taken && subcategory.status.is_live() {
            return Ok(false);
        }
        entries.insert(subcategory.id.clone(), Arc::new(Mutex::new(subcategory)));
        Ok(true)
    }

    fn get(&self, id: &str) -> StoreResult<Option<Subcategory>> {
        Ok(self.entries.read().get(id).map(|entry| entry.lock().clone()))
    }

    fn list_by_topic(
        &self,
        topic: Topic,
        status: Option<SubcategoryStatus>,
    ) -> StoreResult<Vec<Subcategory>> {
        Ok(self.snapshot(|s| s.topic == topic && status.map_or(true, |wanted| s.status == wanted)))
    }

    fn list_all(&self) -> StoreResult<Vec<Subcategory>> {
        Ok(self.snapshot(|_| true))
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.len())
    }

    fn find_by_name_or_alias(&self, topic: Topic, name: &str) -> StoreResult<Option<Subcategory>> {
        let live = self.snapshot(|s| s.topic == topic && s.status.is_live());
        if let Some(found) = live.iter().find(|s| s.has_name(name)) {
            return Ok(Some(found.clone()));
        }
        Ok(live.into_iter().find(|s| s.has_alias(name)))
    }

    fn update_usage(&self, id: &str, usage: &UsageUpdate) -> StoreResult<bool> {
        let entry = match self.entries.read().get(id) {
            Some(entry) => Arc::clone(entry),
            None => return Ok(false),
        };
        entry.lock().apply_usage(usage, Utc::now());
        Ok(true)
    }

    fn update_subcategory(&self, id: &str, update: &SubcategoryUpdate) -> StoreResult<Subcategory> {
        // Exclusive map lock: no creates or usage updates while aliases are checked
        let entries = self.entries.write();
        let target = entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let current = target.lock().clone();

        let siblings: Vec<Subcategory> = entries
            .iter()
            .filter(|(other_id, _)| other_id.as_str() != id)
            .map(|(_, entry)| entry.lock().clone())
            .filter(|s| s.topic == current.topic)
            .collect();
        validate_update(&current, update, &siblings)?;

        let mut target = target.lock();
        target.apply_update(update, Utc::now());
        Ok(target.clone())
    }

    fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
