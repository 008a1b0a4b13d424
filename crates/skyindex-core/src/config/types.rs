//! Configuration type definitions

use serde::{Deserialize, Serialize};

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Configuration format version for compatibility checking
    #[serde(default = "default_version")]
    pub version: u32,

    /// Catalog search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Recommendation engine hyperparameters
    #[serde(default)]
    pub recommender: RecommenderConfig,

    /// Content feature extraction
    #[serde(default)]
    pub content: ContentConfig,
}

/// Configuration for catalog search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of cached query results (default 100)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Edit distance used when a caller does not pass one (default 2)
    #[serde(default = "default_fuzzy_distance")]
    pub default_fuzzy_distance: usize,

    /// Neighbour count for attribute similarity (default 20)
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,
}

/// Hyperparameters for the latent-factor model and hybrid scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// Latent dimension K (default 20)
    #[serde(default = "default_latent_factors")]
    pub latent_factors: usize,

    /// SGD learning rate (default 0.01)
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// L2 regularization strength (default 0.02)
    #[serde(default = "default_regularization")]
    pub regularization: f64,

    /// Full passes over all ratings per training call (default 100)
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Half-width of the symmetric range for fresh factor rows (default 0.01)
    #[serde(default = "default_init_range")]
    pub init_range: f64,

    /// Seed for factor row initialization (default 42)
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Keep existing factor rows between training calls (default false)
    #[serde(default)]
    pub warm_start: bool,

    /// Per-year exponential decay applied to rating weights (default 0.1)
    #[serde(default = "default_time_decay")]
    pub time_decay_factor: f64,

    /// Minimum content similarity that contributes to a hybrid score (default 0.5)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Weight of the latent-factor score in a hybrid score (default 0.7)
    #[serde(default = "default_mf_weight")]
    pub mf_weight: f64,

    /// Weight of the content score in a hybrid score (default 0.3)
    #[serde(default = "default_content_weight")]
    pub content_weight: f64,

    /// Ratings at or above this value seed content recommendations (default 4.0)
    #[serde(default = "default_high_rating_threshold")]
    pub high_rating_threshold: f64,

    /// Lifetime of the recommendation cache in hours (default 24)
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: i64,

    /// Entry count above which the recommendation cache is dropped (default 1000)
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

/// Configuration for deriving content features from catalog records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Stem description tokens before using them as features (default true)
    #[serde(default = "default_stemming")]
    pub stemming: bool,

    /// Weight given to description-token features (default 0.5)
    #[serde(default = "default_description_weight")]
    pub description_weight: f64,
}

fn default_version() -> u32 {
    CONFIG_FORMAT_VERSION
}

fn default_cache_capacity() -> usize {
    100
}

fn default_fuzzy_distance() -> usize {
    2
}

fn default_similar_limit() -> usize {
    20
}

fn default_latent_factors() -> usize {
    20
}

fn default_learning_rate() -> f64 {
    0.01
}

fn default_regularization() -> f64 {
    0.02
}

fn default_iterations() -> usize {
    100
}

fn default_init_range() -> f64 {
    0.01
}

fn default_seed() -> u64 {
    42
}

fn default_time_decay() -> f64 {
    0.1
}

fn default_similarity_threshold() -> f64 {
    0.5
}

fn default_mf_weight() -> f64 {
    0.7
}

fn default_content_weight() -> f64 {
    0.3
}

fn default_high_rating_threshold() -> f64 {
    4.0
}

fn default_cache_ttl_hours() -> i64 {
    24
}

fn default_cache_max_entries() -> usize {
    1000
}

fn default_stemming() -> bool {
    true
}

fn default_description_weight() -> f64 {
    0.5
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            cache_capacity: default_cache_capacity(),
            default_fuzzy_distance: default_fuzzy_distance(),
            similar_limit: default_similar_limit(),
        }
    }
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        RecommenderConfig {
            latent_factors: default_latent_factors(),
            learning_rate: default_learning_rate(),
            regularization: default_regularization(),
            iterations: default_iterations(),
            init_range: default_init_range(),
            seed: default_seed(),
            warm_start: false,
            time_decay_factor: default_time_decay(),
            similarity_threshold: default_similarity_threshold(),
            mf_weight: default_mf_weight(),
            content_weight: default_content_weight(),
            high_rating_threshold: default_high_rating_threshold(),
            cache_ttl_hours: default_cache_ttl_hours(),
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        ContentConfig {
            stemming: default_stemming(),
            description_weight: default_description_weight(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            version: CONFIG_FORMAT_VERSION,
            search: SearchConfig::default(),
            recommender: RecommenderConfig::default(),
            content: ContentConfig::default(),
        }
    }
}
