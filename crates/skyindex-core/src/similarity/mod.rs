//! Content similarity between items
//!
//! Items carry sparse feature vectors (`feature id → weight ∈ [0, 1]`).
//! Similarity is the cosine of two vectors with a small epsilon in the
//! denominator, so missing or empty vectors score ~0 instead of failing.

use std::collections::{BTreeMap, HashMap};

/// Added to the cosine denominator
pub const COSINE_EPSILON: f64 = 1e-8;

/// Similarity score between two items
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SimilarityResult {
    /// Item or entry name
    pub id: String,
    /// Similarity score (0.0 to 1.0)
    pub score: f64,
}

/// Sparse per-item feature vector
pub type FeatureVector = BTreeMap<u32, f64>;

/// Cosine similarity of two sparse vectors
pub fn cosine(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(feature, w)| large.get(feature).map(|v| w * v))
        .sum();
    let norm_a = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = b.values().map(|w| w * w).sum::<f64>().sqrt();
    dot / (norm_a * norm_b + COSINE_EPSILON)
}

/// Feature vectors for every item that has at least one feature
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentSimilarity {
    vectors: HashMap<u32, FeatureVector>,
}

impl ContentSimilarity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one feature weight on an item, overwriting any previous weight
    pub fn set_feature(&mut self, item: u32, feature: u32, weight: f64) {
        self.vectors.entry(item).or_default().insert(feature, weight);
    }

    pub fn vector(&self, item: u32) -> Option<&FeatureVector> {
        self.vectors.get(&item)
    }

    /// Drop one feature from an item, forgetting the item once it has none
    pub fn remove_feature(&mut self, item: u32, feature: u32) -> bool {
        let Some(vector) = self.vectors.get_mut(&item) else {
            return false;
        };
        let removed = vector.remove(&feature).is_some();
        if vector.is_empty() {
            self.vectors.remove(&item);
        }
        removed
    }

    pub fn remove_item(&mut self, item: u32) -> Option<FeatureVector> {
        self.vectors.remove(&item)
    }

    /// Cosine similarity of two items; 0 when either has no features
    pub fn similarity(&self, a: u32, b: u32) -> f64 {
        match (self.vectors.get(&a), self.vectors.get(&b)) {
            (Some(va), Some(vb)) => cosine(va, vb),
            _ => 0.0,
        }
    }

    /// Sum of similarities to every other candidate strictly above `threshold`
    pub fn neighbourhood_score(
        &self,
        item: u32,
        candidates: impl IntoIterator<Item = u32>,
        threshold: f64,
    ) -> f64 {
        let Some(vector) = self.vectors.get(&item) else {
            return 0.0;
        };
        candidates
            .into_iter()
            .filter(|other| *other != item)
            .filter_map(|other| self.vectors.get(&other))
            .map(|other| cosine(vector, other))
            .filter(|s| *s > threshold)
            .sum()
    }

    /// Rewrite item and feature ids, dropping anything mapped to `None`
    pub fn remap(
        &mut self,
        item_map: &[Option<u32>],
        feature_map: &[Option<u32>],
    ) {
        let lookup = |map: &[Option<u32>], id: u32| map.get(id as usize).copied().flatten();
        let vectors = std::mem::take(&mut self.vectors);
        for (item, vector) in vectors {
            let Some(new_item) = lookup(item_map, item) else {
                continue;
            };
            let remapped: FeatureVector = vector
                .into_iter()
                .filter_map(|(f, w)| lookup(feature_map, f).map(|nf| (nf, w)))
                .collect();
            if !remapped.is_empty() {
                self.vectors.insert(new_item, remapped);
            }
        }
    }

    /// Number of items with features
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn clear(&mut self) {
        self.vectors.clear();
    }
}

#[cfg(test)]
mod tests;
