use serde::{Deserialize, Serialize};

use super::record::CelestialObjectRecord;

/// A searchable catalog entry keyed by its display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display name, unique within a catalog
    pub name: String,
    /// Alternate designations (order irrelevant, no duplicates)
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Popularity counter, never decreases
    #[serde(default)]
    pub click_count: u64,
    /// Catalog attributes, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<CelestialObjectRecord>,
}

impl CatalogEntry {
    /// Create an entry, dropping blank and repeated aliases
    pub fn new(name: impl Into<String>, aliases: Vec<String>, click_count: u64) -> Self {
        let mut entry = Self {
            name: name.into(),
            aliases: Vec::new(),
            click_count,
            record: None,
        };
        entry.merge_aliases(aliases);
        entry
    }

    /// Append aliases not already present, returning the ones that were new
    pub fn merge_aliases(&mut self, aliases: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut added = Vec::new();
        for alias in aliases {
            let alias = alias.trim().to_string();
            if alias.is_empty() || alias == self.name || self.has_alias(&alias) {
                continue;
            }
            self.aliases.push(alias.clone());
            added.push(alias);
        }
        added
    }

    /// Whether `alias` is one of this entry's alternate names
    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| a == alias)
    }

    /// Increment the popularity counter
    pub fn record_click(&mut self) {
        self.click_count = self.click_count.saturating_add(1);
    }

    /// Object type from the attached record, or "" when unknown
    pub fn object_type(&self) -> &str {
        self.record.as_ref().map_or("", |r| r.object_type.as_str())
    }

    /// Morphology from the attached record, or "" when unknown
    pub fn morphology(&self) -> &str {
        self.record.as_ref().map_or("", |r| r.morphology.as_str())
    }

    /// Visual magnitude from the attached record, 0.0 when unknown
    pub fn magnitude(&self) -> f64 {
        self.record.as_ref().map_or(0.0, |r| r.visual_magnitude)
    }
}
