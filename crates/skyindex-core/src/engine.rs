//! The `SkyIndex` facade
//!
//! Owns the catalog store and the recommendation engine behind separate
//! reader/writer locks. Catalog entries are mirrored into the recommender as
//! items: aliases become binary content features and attached records
//! contribute classification and description features.
//!
//! Lock order is always catalog first, then recommender.

use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{
    AddOutcome, CacheStats, CatalogEntry, CatalogStore, CelestialObjectRecord,
};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::query::AttributeFilter;
use crate::recommend::{CompactionReport, Ranked, RecommendationEngine, RecommenderStats};
use crate::records::{self, ImportReport, Row};
use crate::similarity::SimilarityResult;
use crate::text;

/// Combined catalog and recommender statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub entries: usize,
    pub aliases: usize,
    pub indexed_words: usize,
    pub query_cache: CacheStats,
    pub recommender: RecommenderStats,
}

/// Catalog search and recommendation behind one thread-safe handle
#[derive(Debug)]
pub struct SkyIndex {
    config: EngineConfig,
    catalog: RwLock<CatalogStore>,
    recommender: RwLock<RecommendationEngine>,
}

impl Default for SkyIndex {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn recover<G>(what: &str, poisoned: PoisonError<G>) -> G {
    tracing::warn!(lock = what, "lock poisoned, recovering");
    poisoned.into_inner()
}

impl SkyIndex {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            catalog: RwLock::new(CatalogStore::new(config.search.cache_capacity)),
            recommender: RwLock::new(RecommendationEngine::new(config.recommender.clone())),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn catalog(&self) -> RwLockReadGuard<'_, CatalogStore> {
        self.catalog.read().unwrap_or_else(|e| recover("catalog", e))
    }

    fn catalog_mut(&self) -> RwLockWriteGuard<'_, CatalogStore> {
        self.catalog.write().unwrap_or_else(|e| recover("catalog", e))
    }

    fn recommender(&self) -> RwLockReadGuard<'_, RecommendationEngine> {
        self.recommender
            .read()
            .unwrap_or_else(|e| recover("recommender", e))
    }

    fn recommender_mut(&self) -> RwLockWriteGuard<'_, RecommendationEngine> {
        self.recommender
            .write()
            .unwrap_or_else(|e| recover("recommender", e))
    }

    // Catalog mutation

    /// Add or merge a catalog entry and register it as a recommendable item
    pub fn add_entry(&self, name: &str, aliases: Vec<String>, click_count: u64) -> Result<AddOutcome> {
        let mut catalog = self.catalog_mut();
        let outcome = catalog.add_entry(name, aliases, click_count)?;
        let name = name.trim();
        let aliases = catalog
            .get(name)
            .map(|e| e.aliases.clone())
            .unwrap_or_default();
        self.recommender_mut().add_item(name, &aliases)?;
        Ok(outcome)
    }

    /// Overwrite a catalog entry; its alias features are rebuilt from scratch
    pub fn replace_entry(&self, name: &str, aliases: Vec<String>, click_count: u64) -> Result<bool> {
        let mut catalog = self.catalog_mut();
        let replaced = catalog.replace_entry(name, aliases.clone(), click_count)?;
        let name = name.trim();
        let aliases = catalog
            .get(name)
            .map(|e| e.aliases.clone())
            .unwrap_or(aliases);
        let mut recommender = self.recommender_mut();
        recommender.clear_item_features(name);
        recommender.add_item(name, &aliases)?;
        Ok(replaced)
    }

    /// Remove an entry and retire it as a recommendable item
    pub fn remove_entry(&self, name: &str) -> Option<CatalogEntry> {
        let removed = self.catalog_mut().remove_entry(name)?;
        self.recommender_mut().retire_item(name);
        Some(removed)
    }

    /// Attach a record to its entry and derive content features from it.
    ///
    /// Features derived from a previously attached record are dropped first.
    /// Returns false when no entry carries the record's identifier.
    pub fn attach_record(&self, record: CelestialObjectRecord) -> Result<bool> {
        let features = self.record_features(&record);
        let name = record.name().to_string();

        let mut catalog = self.catalog_mut();
        let previous = catalog.get(&name).and_then(|e| e.record.clone());
        if !catalog.attach_record(record)? {
            return Ok(false);
        }

        let mut recommender = self.recommender_mut();
        if let Some(previous) = previous {
            for (feature, _) in self.record_features(&previous) {
                recommender.remove_item_feature(&name, &feature);
            }
        }
        for (feature, weight) in features {
            recommender.add_item_feature(&name, &feature, weight)?;
        }
        Ok(true)
    }

    fn record_features(&self, record: &CelestialObjectRecord) -> Vec<(String, f64)> {
        let mut features: Vec<(String, f64)> = [
            ("type", record.object_type.as_str()),
            ("morphology", record.morphology.as_str()),
            ("constellation", record.constellation_en.as_str()),
        ]
        .into_iter()
        .filter_map(|(kind, label)| text::label_feature(kind, label))
        .map(|feature| (feature, 1.0))
        .collect();

        let description = format!("{} {}", record.detailed_description, record.brief_description);
        let weight = self.config.content.description_weight;
        features.extend(
            text::description_features(&description, self.config.content.stemming)
                .into_iter()
                .map(|feature| (feature, weight)),
        );
        features
    }

    /// Bump an entry's popularity
    pub fn record_click(&self, name: &str) -> bool {
        self.catalog_mut().record_click(name)
    }

    // Catalog queries

    pub fn get(&self, name: &str) -> Option<CatalogEntry> {
        self.catalog().get(name).cloned()
    }

    pub fn search(&self, query: &str) -> Vec<CatalogEntry> {
        self.catalog().search(query)
    }

    /// Search results ordered by popularity
    pub fn ranked_search(&self, query: &str) -> Vec<CatalogEntry> {
        CatalogStore::rank_by_popularity(self.search(query))
    }

    /// Fuzzy search; `None` uses the configured default distance
    pub fn fuzzy_search(&self, query: &str, max_distance: Option<usize>) -> Vec<CatalogEntry> {
        let distance = max_distance.unwrap_or(self.config.search.default_fuzzy_distance);
        self.catalog().fuzzy_search(query, distance)
    }

    pub fn autocomplete(&self, prefix: &str) -> Vec<String> {
        self.catalog().autocomplete(prefix)
    }

    pub fn filter(&self, filter: &AttributeFilter) -> Vec<CatalogEntry> {
        self.catalog().filter(filter)
    }

    /// Attribute neighbours; `None` uses the configured limit
    pub fn similar_objects(&self, name: &str, limit: Option<usize>) -> Result<Vec<SimilarityResult>> {
        let limit = limit.unwrap_or(self.config.search.similar_limit);
        self.catalog().similar_objects(name, limit)
    }

    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.catalog().entries().cloned().collect()
    }

    pub fn clear_cache(&self) {
        self.catalog().clear_cache();
        self.recommender_mut().clear_cache();
    }

    pub fn set_cache_capacity(&self, capacity: usize) {
        self.catalog().set_cache_capacity(capacity);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.catalog().cache_stats()
    }

    // Ratings and features

    pub fn add_rating(&self, user: &str, item: &str, value: f64) -> Result<()> {
        self.recommender_mut().add_rating(user, item, value)
    }

    pub fn add_rating_at(
        &self,
        user: &str,
        item: &str,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.recommender_mut()
            .add_rating_at(user, item, value, timestamp)
    }

    pub fn add_ratings(&self, batch: &[(String, String, f64)]) -> Result<usize> {
        self.recommender_mut().add_ratings(batch)
    }

    /// Record a view of an entry: bumps popularity and stores implicit feedback
    pub fn add_implicit_feedback(&self, user: &str, item: &str) -> Result<()> {
        self.catalog_mut().record_click(item);
        self.recommender_mut().add_implicit_feedback(user, item)
    }

    pub fn add_item_feature(&self, item: &str, feature: &str, weight: f64) -> Result<()> {
        self.recommender_mut().add_item_feature(item, feature, weight)
    }

    // Model

    #[tracing::instrument(skip(self))]
    pub fn train(&self) {
        self.recommender_mut().train();
    }

    pub fn predict(&self, user: &str, item: &str) -> Result<f64> {
        self.recommender().predict(user, item)
    }

    pub fn predict_or_register(&self, user: &str, item: &str) -> Result<f64> {
        self.recommender_mut().predict_or_register(user, item)
    }

    pub fn recommend(&self, user: &str, top_n: usize) -> Result<Ranked> {
        self.recommender_mut().recommend(user, top_n)
    }

    /// Drop one user's cached recommendations
    pub fn invalidate_user(&self, user: &str) -> bool {
        self.recommender_mut().invalidate_user(user)
    }

    pub fn hybrid_score(&self, user: &str, item: &str) -> Result<f64> {
        self.recommender().hybrid_score(user, item)
    }

    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        self.recommender().similarity(a, b)
    }

    pub fn content_recommendations(&self, user: &str, n: usize) -> Ranked {
        self.recommender().content_recommendations(user, n)
    }

    /// Hybrid recommendations with the configured content/collaborative weights
    #[tracing::instrument(skip(self))]
    pub fn hybrid_recommendations(&self, user: &str, top_n: usize) -> Result<Ranked> {
        let (content, collaborative) = (
            self.config.recommender.content_weight,
            self.config.recommender.mf_weight,
        );
        self.recommender_mut()
            .hybrid_recommendations(user, top_n, content, collaborative)
    }

    pub fn similar_items(&self, item: &str, n: usize) -> Result<Vec<SimilarityResult>> {
        self.recommender().similar_items(item, n)
    }

    pub fn compact(&self) -> CompactionReport {
        self.recommender_mut().compact()
    }

    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn save_model(&self, path: &Path) -> Result<()> {
        self.recommender().save_model(path)
    }

    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load_model(&self, path: &Path) -> Result<()> {
        self.recommender_mut().load_model(path)
    }

    pub fn stats(&self) -> IndexStats {
        let catalog = self.catalog();
        let stats = IndexStats {
            entries: catalog.len(),
            aliases: catalog.alias_count(),
            indexed_words: catalog.indexed_words(),
            query_cache: catalog.cache_stats(),
            recommender: self.recommender().stats(),
        };
        catalog.log_cache_metrics();
        stats
    }

    // Bulk rows

    /// Add one entry per row, attaching a record when the row carries one
    #[tracing::instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn import_entries(&self, rows: &[Row]) -> ImportReport {
        let mut report = ImportReport::default();
        for (index, row) in rows.iter().enumerate() {
            match self.import_entry(row) {
                Ok(()) => report.record_success(),
                Err(e) => report.record_failure(index, &e),
            }
        }
        tracing::info!(processed = report.processed, skipped = report.skipped, "entries imported");
        report
    }

    fn import_entry(&self, row: &Row) -> Result<()> {
        let entry = records::entry_from_row(row)?;
        if let Some(record) = &entry.record {
            record.validate()?;
        }
        self.add_entry(&entry.name, entry.aliases, entry.click_count)?;
        if let Some(record) = entry.record {
            if !self.attach_record(record)? {
                tracing::debug!(name = %entry.name, "record identifier matches no entry");
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn import_ratings(&self, rows: &[Row]) -> ImportReport {
        let mut report = ImportReport::default();
        for (index, row) in rows.iter().enumerate() {
            let result = records::rating_from_row(row).and_then(|r| {
                self.add_rating_at(&r.user, &r.item, r.value, r.timestamp.unwrap_or_else(Utc::now))
            });
            match result {
                Ok(()) => report.record_success(),
                Err(e) => report.record_failure(index, &e),
            }
        }
        tracing::info!(processed = report.processed, skipped = report.skipped, "ratings imported");
        report
    }

    #[tracing::instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn import_features(&self, rows: &[Row]) -> ImportReport {
        let mut report = ImportReport::default();
        for (index, row) in rows.iter().enumerate() {
            let result = records::feature_from_row(row)
                .and_then(|f| self.add_item_feature(&f.item, &f.feature, f.weight));
            match result {
                Ok(()) => report.record_success(),
                Err(e) => report.record_failure(index, &e),
            }
        }
        tracing::info!(processed = report.processed, skipped = report.skipped, "features imported");
        report
    }

    /// One row per entry in name order; empty `fields` exports everything
    pub fn export_entries(&self, fields: &[&str]) -> Vec<Row> {
        self.catalog()
            .entries()
            .map(|entry| records::entry_to_row(entry, fields))
            .collect()
    }

    pub fn export_ratings(&self) -> Vec<Row> {
        self.recommender()
            .ratings()
            .iter()
            .map(records::rating_to_row)
            .collect()
    }
}
