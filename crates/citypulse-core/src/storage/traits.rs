//! Storage trait definitions

use crate::storage::error::{StoreError, StoreResult};
use crate::taxonomy::{Subcategory, SubcategoryStatus, SubcategoryUpdate, Topic, UsageUpdate};

/// Catalog of subcategories per topic.
///
/// Implementations must be safe to share between threads. Two guarantees are
/// required of every backend:
/// - `create` performs the `(topic, name)` existence check and the insert as
///   one atomic step, so `get_or_create` never produces duplicates
/// - `update_usage` is an atomic read-modify-write of one entry and does not
///   block updates to other entries
pub trait TaxonomyStore: Send + Sync {
    /// Insert a new subcategory.
    ///
    /// Returns `false` (not an error) when a non-merged entry with the same
    /// `(topic, name)` already exists. Returns `StoreError::AlreadyExists` when
    /// the ID itself is taken.
    fn create(&self, subcategory: Subcategory) -> StoreResult<bool>;

    /// Retrieve a subcategory by ID.
    ///
    /// Returns `None` if not found.
    fn get(&self, id: &str) -> StoreResult<Option<Subcategory>>;

    /// Check if a subcategory exists.
    fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// List subcategories of a topic ordered by name, optionally filtered by status.
    fn list_by_topic(
        &self,
        topic: Topic,
        status: Option<SubcategoryStatus>,
    ) -> StoreResult<Vec<Subcategory>>;

    /// List every subcategory across all topics.
    fn list_all(&self) -> StoreResult<Vec<Subcategory>>;

    /// Get the total count of subcategories.
    fn count(&self) -> StoreResult<usize> {
        Ok(self.list_all()?.len())
    }

    /// Case-insensitive lookup among non-merged entries of a topic.
    ///
    /// Canonical names are checked before aliases.
    fn find_by_name_or_alias(&self, topic: Topic, name: &str) -> StoreResult<Option<Subcategory>>;

    /// Return the entry matching the candidate's name or alias, creating the
    /// candidate if none exists.
    ///
    /// The flag is `true` only for the caller whose insert won.
    fn get_or_create(&self, candidate: Subcategory) -> StoreResult<(Subcategory, bool)> {
        if let Some(existing) = self.find_by_name_or_alias(candidate.topic, &candidate.name)? {
            return Ok((existing, false));
        }

        let topic = candidate.topic;
        let name = candidate.name.clone();
        if self.create(candidate.clone())? {
            return Ok((candidate, true));
        }

        // Lost the race: someone else inserted the same (topic, name)
        self.find_by_name_or_alias(topic, &name)?
            .map(|winner| (winner, false))
            .ok_or_else(|| {
                StoreError::Backend(format!(
                    "create of {}/{} reported a duplicate that cannot be found",
                    topic, name
                ))
            })
    }

    /// Record one usage event against an entry.
    ///
    /// Returns `false` if the entry does not exist.
    fn update_usage(&self, id: &str, usage: &UsageUpdate) -> StoreResult<bool>;

    /// Apply an administrative edit and return the updated entry.
    ///
    /// Returns `StoreError::NotFound` if the entry doesn't exist and
    /// `StoreError::Conflict` if the edit would set `merged`, touch a merged
    /// entry, or add an alias equal to another live entry's name in the topic.
    fn update_subcategory(&self, id: &str, update: &SubcategoryUpdate) -> StoreResult<Subcategory>;

    /// Cheap reachability check.
    fn ping(&self) -> StoreResult<()> {
        self.count().map(|_| ())
    }
}

/// Validation shared by backends before applying an update.
///
/// `siblings` are the other entries of the target's topic.
pub fn validate_update(
    target: &Subcategory,
    update: &SubcategoryUpdate,
    siblings: &[Subcategory],
) -> StoreResult<()> {
    if update.status == Some(SubcategoryStatus::Merged) {
        return Err(StoreError::Conflict(
            "merged status cannot be set through an update".into(),
        ));
    }
    if target.status == SubcategoryStatus::Merged {
        return Err(StoreError::Conflict(format!(
            "subcategory {} is merged and read-only",
            target.id
        )));
    }
    for alias in &update.add_aliases {
        let alias = alias.trim();
        if let Some(other) = siblings
            .iter()
            .find(|s| s.id != target.id && s.status.is_live() && s.has_name(alias))
        {
            return Err(StoreError::Conflict(format!(
                "alias '{}' is the name of subcategory {}",
                alias, other.id
            )));
        }
    }
    Ok(())
}
