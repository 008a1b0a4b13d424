//! Name and alias maps

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::entry::CatalogEntry;

/// Canonical name → entry, alias → every canonical name carrying that alias
#[derive(Debug, Default)]
pub struct NameAliasIndex {
    entries: BTreeMap<String, CatalogEntry>,
    aliases: HashMap<String, BTreeSet<String>>,
}

impl NameAliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CatalogEntry> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Canonical names reachable through `alias`, in name order
    pub fn names_for_alias(&self, alias: &str) -> impl Iterator<Item = &str> {
        self.aliases
            .get(alias)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }

    /// Whether `word` resolves to a live name or alias
    pub fn resolves(&self, word: &str) -> bool {
        self.entries.contains_key(word) || self.aliases.contains_key(word)
    }

    /// Insert or overwrite an entry, linking each of its aliases
    pub fn insert(&mut self, entry: CatalogEntry) {
        for alias in &entry.aliases {
            self.link(alias, &entry.name);
        }
        self.entries.insert(entry.name.clone(), entry);
    }

    /// Remove an entry and every alias link pointing at it
    pub fn remove(&mut self, name: &str) -> Option<CatalogEntry> {
        let entry = self.entries.remove(name)?;
        for alias in &entry.aliases {
            self.unlink(alias, name);
        }
        Some(entry)
    }

    /// Register `alias` as pointing at `name`
    pub fn link(&mut self, alias: &str, name: &str) {
        self.aliases
            .entry(alias.to_string())
            .or_default()
            .insert(name.to_string());
    }

    fn unlink(&mut self, alias: &str, name: &str) {
        if let Some(names) = self.aliases.get_mut(alias) {
            names.remove(name);
            if names.is_empty() {
                self.aliases.remove(alias);
            }
        }
    }

    /// Entries in name order
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct alias strings
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}
