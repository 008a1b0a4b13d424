//! Engine configuration for skyindex
//!
//! Configuration is stored as TOML. Every key has a default, so a partial (or
//! empty) file yields the stock hyperparameters.

pub mod types;

use std::fs;
use std::path::Path;

use crate::error::{Result, SkyError};

pub use types::{
    ContentConfig, EngineConfig, RecommenderConfig, SearchConfig, CONFIG_FORMAT_VERSION,
};

impl EngineConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            tracing::warn!(
                version = config.version,
                supported = CONFIG_FORMAT_VERSION,
                "configuration written by a newer version"
            );
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SkyError::Other(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject hyperparameters the engine cannot train or score with
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.recommender.validate()?;

        let weight = self.content.description_weight;
        if !(0.0..=1.0).contains(&weight) {
            crate::bail_invalid!("content.description_weight", weight);
        }
        Ok(())
    }
}

impl SearchConfig {
    fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            crate::bail_invalid!("search.cache_capacity", self.cache_capacity);
        }
        Ok(())
    }
}

impl RecommenderConfig {
    fn validate(&self) -> Result<()> {
        if self.latent_factors == 0 {
            crate::bail_invalid!("recommender.latent_factors", self.latent_factors);
        }
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            crate::bail_invalid!("recommender.learning_rate", self.learning_rate);
        }
        if self.regularization < 0.0 {
            crate::bail_invalid!("recommender.regularization", self.regularization);
        }
        if self.init_range < 0.0 {
            crate::bail_invalid!("recommender.init_range", self.init_range);
        }
        for (name, weight) in [
            ("recommender.mf_weight", self.mf_weight),
            ("recommender.content_weight", self.content_weight),
            ("recommender.similarity_threshold", self.similarity_threshold),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                crate::bail_invalid!(name, weight);
            }
        }
        if self.cache_ttl_hours <= 0 {
            crate::bail_invalid!("recommender.cache_ttl_hours", self.cache_ttl_hours);
        }
        Ok(())
    }
}
