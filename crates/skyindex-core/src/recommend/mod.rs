//! Recommendation engine
//!
//! Ratings and content features feed a latent-factor model trained by
//! regularized SGD. Recommendations are ranked by the model's dot product and
//! can be blended with content similarity for hybrid results.

pub mod cache;
pub mod decay;
pub mod factors;
pub mod persistence;
pub mod ratings;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::RecommenderConfig;
use crate::error::{Result, SkyError};
use crate::similarity::{ContentSimilarity, SimilarityResult};

pub use cache::{Ranked, RecommendationCache};
pub use decay::TemporalDecay;
pub use factors::{FactorMatrix, LatentFactorModel, TrainingParams};
pub use ratings::{Interner, Rating, RatingStore};

/// Highest accepted rating
pub const MAX_RATING: f64 = 5.0;

/// Value recorded for implicit feedback such as a view or a click
pub const IMPLICIT_FEEDBACK_RATING: f64 = 1.0;

/// Snapshot of recommender state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommenderStats {
    pub users: usize,
    pub items: usize,
    pub retired_items: usize,
    pub features: usize,
    pub ratings: usize,
    pub global_mean: f64,
    pub trained: bool,
    pub latent_factors: usize,
    pub cached_users: usize,
}

/// Slots reclaimed by [`RecommendationEngine::compact`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompactionReport {
    pub users_removed: usize,
    pub items_removed: usize,
    pub ratings_removed: usize,
}

/// One rating as seen by callers: names instead of ids
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedRating {
    pub user: String,
    pub item: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Sort by score descending, item name ascending on ties, keep `n`
pub fn rank(mut scores: Vec<(String, f64)>, n: usize) -> Ranked {
    scores.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scores.truncate(n);
    scores
}

fn require_id(context: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        crate::bail_empty!(context);
    }
    Ok(())
}

fn validate_rating(value: f64) -> Result<()> {
    if !(0.0..=MAX_RATING).contains(&value) {
        return Err(SkyError::InvalidRating { value });
    }
    Ok(())
}

/// Ratings, content features, factor matrices and the recommendation cache
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    config: RecommenderConfig,
    store: RatingStore,
    content: ContentSimilarity,
    model: LatentFactorModel,
    cache: RecommendationCache,
    decay: TemporalDecay,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(RecommenderConfig::default())
    }
}

impl RecommendationEngine {
    pub fn new(config: RecommenderConfig) -> Self {
        Self {
            store: RatingStore::new(),
            content: ContentSimilarity::new(),
            model: LatentFactorModel::new(config.latent_factors),
            cache: RecommendationCache::new(
                Duration::hours(config.cache_ttl_hours),
                config.cache_max_entries,
            ),
            decay: TemporalDecay::new(config.time_decay_factor),
            config,
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    fn params(&self) -> TrainingParams {
        TrainingParams {
            learning_rate: self.config.learning_rate,
            regularization: self.config.regularization,
            iterations: self.config.iterations,
            init_range: self.config.init_range,
            seed: self.config.seed,
            warm_start: self.config.warm_start,
        }
    }

    /// Record a rating stamped now
    pub fn add_rating(&mut self, user: &str, item: &str, value: f64) -> Result<()> {
        self.add_rating_at(user, item, value, Utc::now())
    }

    /// Record a rating with an explicit timestamp.
    ///
    /// Values outside [0, 5] are rejected, never clamped. The user's cached
    /// recommendations are dropped.
    pub fn add_rating_at(
        &mut self,
        user: &str,
        item: &str,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        require_id("user", user)?;
        require_id("item", item)?;
        validate_rating(value)?;

        let rating = Rating {
            user: self.store.users.intern(user),
            item: self.intern_item(item),
            value,
            timestamp,
        };
        self.store.push(rating);
        self.cache.invalidate(user);
        tracing::trace!(user, item, value, "rating added");
        Ok(())
    }

    /// Record a view or click as a low-confidence rating
    pub fn add_implicit_feedback(&mut self, user: &str, item: &str) -> Result<()> {
        self.add_rating(user, item, IMPLICIT_FEEDBACK_RATING)
    }

    /// Record a batch of ratings. Nothing is stored if any entry is invalid.
    pub fn add_ratings(&mut self, batch: &[(String, String, f64)]) -> Result<usize> {
        for (user, item, value) in batch {
            require_id("user", user)?;
            require_id("item", item)?;
            validate_rating(*value)?;
        }
        let now = Utc::now();
        for (user, item, value) in batch {
            self.add_rating_at(user, item, *value, now)?;
        }
        tracing::debug!(count = batch.len(), "rating batch added");
        Ok(batch.len())
    }

    /// Id for `item`; a new item drops every cached list
    fn intern_item(&mut self, item: &str) -> u32 {
        if let Some(id) = self.store.items.get(item) {
            return id;
        }
        self.cache.clear();
        self.store.items.intern(item)
    }

    /// Register an item with binary (weight 1.0) features
    pub fn add_item(&mut self, item: &str, features: &[String]) -> Result<()> {
        require_id("item", item)?;
        let item_id = self.intern_item(item);
        for feature in features {
            require_id("feature", feature)?;
            let feature_id = self.store.features.intern(feature);
            self.content.set_feature(item_id, feature_id, 1.0);
        }
        Ok(())
    }

    /// Set one feature weight on an item, registering both if new
    pub fn add_item_feature(&mut self, item: &str, feature: &str, weight: f64) -> Result<()> {
        require_id("item", item)?;
        require_id("feature", feature)?;
        if !(0.0..=1.0).contains(&weight) {
            return Err(SkyError::InvalidFeatureWeight { value: weight });
        }
        let item_id = self.intern_item(item);
        let feature_id = self.store.features.intern(feature);
        self.content.set_feature(item_id, feature_id, weight);
        Ok(())
    }

    /// Drop one feature weight from an item
    pub fn remove_item_feature(&mut self, item: &str, feature: &str) -> bool {
        match (self.store.items.get(item), self.store.features.get(feature)) {
            (Some(item_id), Some(feature_id)) => self.content.remove_feature(item_id, feature_id),
            _ => false,
        }
    }

    /// Forget an item's content features; the item itself stays registered
    pub fn clear_item_features(&mut self, item: &str) -> bool {
        self.store
            .items
            .get(item)
            .and_then(|id| self.content.remove_item(id))
            .is_some()
    }

    /// Tombstone an item. Its id stays reserved until [`Self::compact`].
    pub fn retire_item(&mut self, item: &str) -> bool {
        let Some(id) = self.store.items.retire(item) else {
            return false;
        };
        self.content.remove_item(id);
        self.cache.clear();
        tracing::debug!(item, id, "item retired");
        true
    }

    /// Refit the latent-factor model on every stored rating
    pub fn train(&mut self) {
        let start = Instant::now();
        let params = self.params();
        self.model.train(
            self.store.ratings(),
            self.store.users.len(),
            self.store.items.len(),
            &params,
        );
        self.cache.clear();
        tracing::info!(
            ratings = self.store.len(),
            users = self.store.users.live_count(),
            items = self.store.items.live_count(),
            iterations = params.iterations,
            global_mean = self.model.global_mean(),
            "model trained"
        );
        crate::trace_time!(start, "train");
    }

    fn live_user(&self, user: &str) -> Result<u32> {
        self.store
            .users
            .get(user)
            .ok_or_else(|| SkyError::not_found("user", user))
    }

    fn live_item(&self, item: &str) -> Result<u32> {
        self.store
            .items
            .get(item)
            .ok_or_else(|| SkyError::not_found("item", item))
    }

    /// Model score for a known user and item; read-only
    pub fn predict(&self, user: &str, item: &str) -> Result<f64> {
        let user_id = self.live_user(user)?;
        let item_id = self.live_item(item)?;
        self.model
            .score(user_id, item_id)
            .ok_or_else(|| SkyError::not_found("factors for", format!("{user}/{item}")))
    }

    /// Model score, registering unknown identities with fresh seeded rows
    pub fn predict_or_register(&mut self, user: &str, item: &str) -> Result<f64> {
        require_id("user", user)?;
        require_id("item", item)?;
        let user_id = self.store.users.intern(user);
        let item_id = self.intern_item(item);
        self.ensure_rows();
        self.model
            .score(user_id, item_id)
            .ok_or_else(|| SkyError::not_found("factors for", format!("{user}/{item}")))
    }

    fn ensure_rows(&mut self) {
        let params = self.params();
        self.model
            .ensure_rows(self.store.users.len(), self.store.items.len(), &params);
    }

    /// Top `top_n` live items for `user` by model score
    pub fn recommend(&mut self, user: &str, top_n: usize) -> Result<Ranked> {
        require_id("user", user)?;
        if let Some(cached) = self.cache.get(user, top_n) {
            tracing::trace!(user, top_n, "recommendation cache hit");
            return Ok(cached);
        }

        let user_id = self.store.users.intern(user);
        self.ensure_rows();

        let scores: Vec<(String, f64)> = self
            .store
            .items
            .live()
            .filter_map(|(item_id, name)| {
                self.model
                    .score(user_id, item_id)
                    .map(|score| (name.to_string(), score))
            })
            .collect();
        let ranked = rank(scores, top_n);

        self.cache.put(user, top_n, ranked.clone());
        tracing::debug!(user, top_n, returned = ranked.len(), "recommendations computed");
        Ok(ranked)
    }

    /// Cosine similarity of two items' content features; 0 for unknown items
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        match (self.store.items.get(a), self.store.items.get(b)) {
            (Some(a), Some(b)) => self.content.similarity(a, b),
            _ => 0.0,
        }
    }

    /// Blend of model score and summed content similarity to other items
    pub fn hybrid_score(&self, user: &str, item: &str) -> Result<f64> {
        let mf = self.predict(user, item)?;
        let item_id = self.live_item(item)?;
        let content = self.content.neighbourhood_score(
            item_id,
            self.store.items.live().map(|(id, _)| id),
            self.config.similarity_threshold,
        );
        Ok(self.config.mf_weight * mf + self.config.content_weight * content)
    }

    /// Items similar to what `user` rated highly, weighted by rating and age
    pub fn content_recommendations(&self, user: &str, n: usize) -> Ranked {
        self.content_recommendations_at(user, n, Utc::now())
    }

    pub fn content_recommendations_at(&self, user: &str, n: usize, now: DateTime<Utc>) -> Ranked {
        let Some(user_id) = self.store.users.get(user) else {
            return Vec::new();
        };

        let mut rated = HashSet::new();
        let mut liked = Vec::new();
        for rating in self.store.for_user(user_id) {
            rated.insert(rating.item);
            if rating.value >= self.config.high_rating_threshold {
                let weight = rating.value * self.decay.weight(rating.timestamp, now);
                liked.push((rating.item, weight));
            }
        }

        let scores: Vec<(String, f64)> = self
            .store
            .items
            .live()
            .filter(|(item_id, _)| !rated.contains(item_id))
            .filter_map(|(item_id, name)| {
                let score: f64 = liked
                    .iter()
                    .map(|(seed, weight)| self.content.similarity(*seed, item_id) * weight)
                    .sum();
                (score > 0.0).then(|| (name.to_string(), score))
            })
            .collect();
        rank(scores, n)
    }

    /// Weighted merge of collaborative and content candidates
    pub fn hybrid_recommendations(
        &mut self,
        user: &str,
        top_n: usize,
        content_weight: f64,
        collaborative_weight: f64,
    ) -> Result<Ranked> {
        let candidates = top_n.saturating_mul(2);
        let collaborative = self.recommend(user, candidates)?;
        let content = self.content_recommendations(user, candidates);

        let mut merged: HashMap<String, f64> = HashMap::new();
        for (item, score) in collaborative {
            *merged.entry(item).or_default() += collaborative_weight * score;
        }
        for (item, score) in content {
            *merged.entry(item).or_default() += content_weight * score;
        }
        Ok(rank(merged.into_iter().collect(), top_n))
    }

    /// Content-similarity neighbours of an item
    pub fn similar_items(&self, item: &str, n: usize) -> Result<Vec<SimilarityResult>> {
        let item_id = self.live_item(item)?;
        let scores: Vec<(String, f64)> = self
            .store
            .items
            .live()
            .filter(|(other, _)| *other != item_id)
            .map(|(other, name)| (name.to_string(), self.content.similarity(item_id, other)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        Ok(rank(scores, n)
            .into_iter()
            .map(|(id, score)| SimilarityResult { id, score })
            .collect())
    }

    /// Drop tombstoned users and items, renumbering ids densely
    pub fn compact(&mut self) -> CompactionReport {
        let (users, user_map) = self.store.users.compacted();
        let (items, item_map) = self.store.items.compacted();
        let feature_map: Vec<Option<u32>> =
            (0..self.store.features.len() as u32).map(Some).collect();

        let ratings_before = self.store.len();
        self.store.remap(&user_map, &item_map);
        let report = CompactionReport {
            users_removed: self.store.users.retired_count(),
            items_removed: self.store.items.retired_count(),
            ratings_removed: ratings_before - self.store.len(),
        };

        self.content.remap(&item_map, &feature_map);
        self.model.users.remap(&user_map, users.len());
        self.model.items.remap(&item_map, items.len());
        self.store.users = users;
        self.store.items = items;
        self.cache.clear();

        tracing::info!(?report, "recommender compacted");
        report
    }

    /// Drop every rating, feature, factor and cached list
    pub fn clear(&mut self) {
        self.store.clear();
        self.content.clear();
        self.model = LatentFactorModel::new(self.config.latent_factors);
        self.cache.clear();
    }

    /// Drop one user's cached recommendations
    pub fn invalidate_user(&mut self, user: &str) -> bool {
        self.cache.invalidate(user)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn global_mean(&self) -> f64 {
        self.model.global_mean()
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_trained()
    }

    pub fn stats(&self) -> RecommenderStats {
        RecommenderStats {
            users: self.store.users.live_count(),
            items: self.store.items.live_count(),
            retired_items: self.store.items.retired_count(),
            features: self.store.features.live_count(),
            ratings: self.store.len(),
            global_mean: self.store.global_mean(),
            trained: self.model.is_trained(),
            latent_factors: self.model.latent_factors(),
            cached_users: self.cache.len(),
        }
    }

    /// Stored ratings whose user and item are still live
    pub fn ratings(&self) -> Vec<NamedRating> {
        self.store
            .ratings()
            .iter()
            .filter_map(|r| {
                Some(NamedRating {
                    user: self.store.users.name(r.user)?.to_string(),
                    item: self.store.items.name(r.item)?.to_string(),
                    value: r.value,
                    timestamp: r.timestamp,
                })
            })
            .collect()
    }

    /// Write identities and factors; ids without a trained row get their seeded row
    pub fn save_model(&self, path: &Path) -> Result<()> {
        let mut model = self.model.clone();
        model.ensure_rows(self.store.users.len(), self.store.items.len(), &self.params());
        persistence::write_model(
            path,
            &self.store.users,
            &self.store.items,
            &model.users,
            &model.items,
        )
    }

    /// Replace identities and factors with a saved model.
    ///
    /// Every live user and item must keep its id in the file. Ratings and
    /// content features are kept.
    pub fn load_model(&mut self, path: &Path) -> Result<()> {
        let snapshot = persistence::read_model(path)?;
        persistence::verify_consistent(path, &snapshot, &self.store.users, &self.store.items)?;

        let factors = snapshot.user_factors.cols();
        if factors != self.config.latent_factors {
            return Err(SkyError::model(
                path,
                format!(
                    "model has {factors} latent factors, engine is configured for {}",
                    self.config.latent_factors
                ),
            ));
        }

        self.store.users = snapshot.users;
        self.store.items = snapshot.items;
        self.model = LatentFactorModel::from_matrices(snapshot.user_factors, snapshot.item_factors);
        self.model.set_global_mean(self.store.global_mean());
        self.cache.clear();

        tracing::info!(
            path = %path.display(),
            users = self.store.users.live_count(),
            items = self.store.items.live_count(),
            "model loaded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests;
