//! Multi-index catalog store
//!
//! [`CatalogStore`] owns the entries together with every index over them: the
//! name/alias maps, the prefix trie and the query-result cache. All lookups
//! take `&self`; the cache sits behind its own mutex so a read-locked search
//! can still record results.

pub mod alias;
pub mod cache;
pub mod coords;
pub mod entry;
pub mod fuzzy;
pub mod prefix;
pub mod record;
pub mod similar;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::error::{Result, SkyError};
use crate::query::AttributeFilter;
use crate::similarity::SimilarityResult;

pub use alias::NameAliasIndex;
pub use cache::{CacheStats, QueryCache};
pub use entry::CatalogEntry;
pub use prefix::PrefixIndex;
pub use record::CelestialObjectRecord;

/// Default number of cached query results
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Default neighbour count for [`CatalogStore::similar_objects`]
pub const DEFAULT_SIMILAR_LIMIT: usize = 20;

/// What [`CatalogStore::add_entry`] did with a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    Merged,
}

/// Catalog entries and the indices over them
#[derive(Debug)]
pub struct CatalogStore {
    index: NameAliasIndex,
    prefix: PrefixIndex,
    cache: Mutex<QueryCache>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl CatalogStore {
    /// Create an empty store caching up to `cache_capacity` queries
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            index: NameAliasIndex::new(),
            prefix: PrefixIndex::new(),
            cache: Mutex::new(QueryCache::new(cache_capacity)),
        }
    }

    fn cache(&self) -> MutexGuard<'_, QueryCache> {
        self.cache.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("query cache lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn invalidate(&mut self) {
        self.cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Add an entry, merging into an existing entry of the same name.
    ///
    /// On a duplicate name the alias lists are unioned (existing aliases first),
    /// the click count becomes the larger of the two, and any attached record
    /// is kept.
    pub fn add_entry(
        &mut self,
        name: &str,
        aliases: Vec<String>,
        click_count: u64,
    ) -> Result<AddOutcome> {
        let name = name.trim();
        if name.is_empty() {
            crate::bail_empty!("entry name");
        }
        self.invalidate();

        let outcome = if let Some(existing) = self.index.get_mut(name) {
            tracing::warn!(name, "duplicate catalog entry, merging aliases");
            existing.click_count = existing.click_count.max(click_count);
            let added = existing.merge_aliases(aliases);
            for alias in &added {
                self.index.link(alias, name);
                self.prefix.insert(alias);
            }
            AddOutcome::Merged
        } else {
            let entry = CatalogEntry::new(name, aliases, click_count);
            self.prefix.insert(&entry.name);
            for alias in &entry.aliases {
                self.prefix.insert(alias);
            }
            self.index.insert(entry);
            AddOutcome::Inserted
        };

        tracing::debug!(name, ?outcome, "catalog entry added");
        Ok(outcome)
    }

    /// Overwrite an entry outright. Returns true if an entry was replaced.
    ///
    /// Aliases of the prior entry are unlinked and its record is dropped.
    pub fn replace_entry(
        &mut self,
        name: &str,
        aliases: Vec<String>,
        click_count: u64,
    ) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            crate::bail_empty!("entry name");
        }
        self.invalidate();

        let replaced = self.index.remove(name).is_some();
        if replaced {
            tracing::warn!(name, "replacing catalog entry");
        }

        let entry = CatalogEntry::new(name, aliases, click_count);
        self.prefix.insert(&entry.name);
        for alias in &entry.aliases {
            self.prefix.insert(alias);
        }
        self.index.insert(entry);
        Ok(replaced)
    }

    /// Remove an entry and its alias links.
    ///
    /// Its words stay in the prefix trie but no longer autocomplete.
    pub fn remove_entry(&mut self, name: &str) -> Option<CatalogEntry> {
        let removed = self.index.remove(name)?;
        self.invalidate();
        tracing::debug!(name, "catalog entry removed");
        Some(removed)
    }

    /// Attach a record to the entry named by its identifier.
    ///
    /// Returns false when no such entry exists; the record is then discarded.
    pub fn attach_record(&mut self, record: CelestialObjectRecord) -> Result<bool> {
        record.validate()?;
        let Some(entry) = self.index.get_mut(record.name()) else {
            tracing::debug!(identifier = record.name(), "no entry for record");
            return Ok(false);
        };
        entry.record = Some(record);
        self.invalidate();
        Ok(true)
    }

    /// Bump an entry's popularity counter. Returns false for unknown names.
    pub fn record_click(&mut self, name: &str) -> bool {
        let Some(entry) = self.index.get_mut(name) else {
            return false;
        };
        entry.record_click();
        self.invalidate();
        true
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.index.get(name)
    }

    /// Exact name match first, then every entry carrying `query` as an alias
    pub fn search(&self, query: &str) -> Vec<CatalogEntry> {
        if let Some(cached) = self.cache().get(query) {
            tracing::trace!(query, "query cache hit");
            return cached;
        }

        let mut results = Vec::new();
        if let Some(entry) = self.index.get(query) {
            results.push(entry.clone());
        }
        for name in self.index.names_for_alias(query) {
            if name == query {
                continue;
            }
            if let Some(entry) = self.index.get(name) {
                results.push(entry.clone());
            }
        }

        if !results.is_empty() {
            self.cache().put(query, results.clone());
        }
        tracing::debug!(query, results = results.len(), "search");
        results
    }

    /// Entries whose name or any alias is within `max_distance` edits of `query`
    pub fn fuzzy_search(&self, query: &str, max_distance: usize) -> Vec<CatalogEntry> {
        let start = Instant::now();
        let results: Vec<CatalogEntry> = self
            .index
            .entries()
            .filter(|entry| {
                fuzzy::within_distance(&entry.name, query, max_distance)
                    || entry
                        .aliases
                        .iter()
                        .any(|alias| fuzzy::within_distance(alias, query, max_distance))
            })
            .cloned()
            .collect();
        crate::trace_time!(start, "fuzzy_search", matches = results.len());
        results
    }

    /// Names and aliases starting with `prefix` that still resolve to an entry
    pub fn autocomplete(&self, prefix: &str) -> Vec<String> {
        self.prefix
            .autocomplete(prefix)
            .into_iter()
            .filter(|word| self.index.resolves(word))
            .collect()
    }

    /// Entries matching every constraint of `filter`, in name order
    pub fn filter(&self, filter: &AttributeFilter) -> Vec<CatalogEntry> {
        self.index
            .entries()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }

    /// Sort by click count descending, name ascending on ties
    pub fn rank_by_popularity(mut results: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
        results.sort_by(|a, b| {
            b.click_count
                .cmp(&a.click_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        results
    }

    /// Entries most similar to `name` by type, sky position and brightness.
    ///
    /// Entries without a record are skipped; a target without a record has no
    /// neighbours.
    pub fn similar_objects(&self, name: &str, limit: usize) -> Result<Vec<SimilarityResult>> {
        let target = self
            .index
            .get(name)
            .ok_or_else(|| SkyError::not_found("entry", name))?;
        let Some(source) = target.record.as_ref() else {
            return Ok(Vec::new());
        };

        let mut results: Vec<SimilarityResult> = self
            .index
            .entries()
            .filter(|entry| entry.name != name)
            .filter_map(|entry| {
                let record = entry.record.as_ref()?;
                let score = similar::attribute_similarity(source, record);
                (score > similar::SIMILARITY_THRESHOLD).then(|| SimilarityResult {
                    id: entry.name.clone(),
                    score,
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        results.truncate(limit);
        Ok(results)
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    pub fn set_cache_capacity(&self, capacity: usize) {
        self.cache().resize(capacity);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache().stats()
    }

    /// Log query cache effectiveness at debug level
    pub fn log_cache_metrics(&self) {
        let cache = self.cache();
        crate::log_resource_metrics!(cache.metrics(), "search");
    }

    /// Entries in name order
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.index.entries()
    }

    /// Number of distinct alias names in use
    pub fn alias_count(&self) -> usize {
        self.index.alias_count()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of words in the prefix trie, including removed ones
    pub fn indexed_words(&self) -> usize {
        self.prefix.len()
    }
}
