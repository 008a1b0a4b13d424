//! Per-user cache of ranked recommendations

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Ranked `(item name, score)` list
pub type Ranked = Vec<(String, f64)>;

/// Cached recommendation lists keyed by user name.
///
/// Each list remembers the `top_n` it was computed for, so any request for
/// that many or fewer is served even when fewer items existed.
///
/// Expiry is coarse: whenever more than `ttl` has passed since the last sweep,
/// every entry is dropped at once. Exceeding `max_entries` also drops
/// everything.
#[derive(Debug, Clone)]
pub struct RecommendationCache {
    entries: HashMap<String, (usize, Ranked)>,
    last_sweep: DateTime<Utc>,
    ttl: Duration,
    max_entries: usize,
}

impl RecommendationCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            last_sweep: Utc::now(),
            ttl,
            max_entries,
        }
    }

    fn sweep(&mut self, now: DateTime<Utc>) {
        if now - self.last_sweep > self.ttl {
            if !self.entries.is_empty() {
                tracing::debug!(entries = self.entries.len(), "recommendation cache expired");
            }
            self.entries.clear();
            self.last_sweep = now;
        }
        if self.entries.len() > self.max_entries {
            tracing::debug!(
                entries = self.entries.len(),
                max = self.max_entries,
                "recommendation cache over capacity"
            );
            self.entries.clear();
        }
    }

    /// Cached list for `user` if it was computed for at least `top_n`
    pub fn get(&mut self, user: &str, top_n: usize) -> Option<Ranked> {
        self.get_at(user, top_n, Utc::now())
    }

    pub fn get_at(&mut self, user: &str, top_n: usize, now: DateTime<Utc>) -> Option<Ranked> {
        self.sweep(now);
        let (computed_for, cached) = self.entries.get(user)?;
        (top_n <= *computed_for).then(|| cached.iter().take(top_n).cloned().collect())
    }

    /// Store the list computed for a `top_n` request
    pub fn put(&mut self, user: &str, top_n: usize, ranked: Ranked) {
        self.put_at(user, top_n, ranked, Utc::now());
    }

    pub fn put_at(&mut self, user: &str, top_n: usize, ranked: Ranked, now: DateTime<Utc>) {
        self.sweep(now);
        self.entries.insert(user.to_string(), (top_n, ranked));
        self.sweep(now);
    }

    /// Drop one user's entry
    pub fn invalidate(&mut self, user: &str) -> bool {
        self.entries.remove(user).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(n: usize) -> Ranked {
        (0..n).map(|i| (format!("item{i}"), 1.0 - i as f64 * 0.1)).collect()
    }

    #[test]
    fn test_serves_prefix_of_longer_list() {
        let mut cache = RecommendationCache::new(Duration::hours(24), 10);
        cache.put("u1", 3, ranked(3));
        assert_eq!(cache.get("u1", 2), Some(ranked(2)));
        assert_eq!(cache.get("u1", 3), Some(ranked(3)));
        assert_eq!(cache.get("u1", 4), None);
        assert_eq!(cache.get("u2", 1), None);
    }

    #[test]
    fn test_short_list_serves_its_request_size() {
        let mut cache = RecommendationCache::new(Duration::hours(24), 10);
        // only two items existed for a top-10 request
        cache.put("u1", 10, ranked(2));
        assert_eq!(cache.get("u1", 10), Some(ranked(2)));
        assert_eq!(cache.get("u1", 5), Some(ranked(2)));
        assert_eq!(cache.get("u1", 1), Some(ranked(1)));
        assert_eq!(cache.get("u1", 11), None);
    }

    #[test]
    fn test_ttl_sweep_drops_everything() {
        let now = Utc::now();
        let mut cache = RecommendationCache::new(Duration::hours(24), 10);
        cache.put_at("u1", 1, ranked(1), now);
        cache.put_at("u2", 1, ranked(1), now + Duration::hours(23));
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.get_at("u2", 1, now + Duration::hours(25)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overflow_clears() {
        let mut cache = RecommendationCache::new(Duration::hours(24), 2);
        cache.put("a", 1, ranked(1));
        cache.put("b", 1, ranked(1));
        assert_eq!(cache.len(), 2);
        cache.put("c", 1, ranked(1));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_single_user() {
        let mut cache = RecommendationCache::new(Duration::hours(24), 10);
        cache.put("a", 1, ranked(1));
        cache.put("b", 1, ranked(1));
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("b", 1).is_some());
    }
}
