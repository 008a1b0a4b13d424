//! Rating storage and identity interning

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only string → dense integer id table with tombstones.
///
/// Ids are handed out in insertion order and never reused. Retiring a name
/// removes it from lookup but keeps its slot, so factor rows and ratings
/// indexed by id stay valid until the owner compacts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interner {
    ids: HashMap<String, u32>,
    names: Vec<String>,
    retired: Vec<bool>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from `(name, id)` pairs spread over `slots` ids.
    ///
    /// Slots with no name become retired. Fails on an id outside `slots`
    /// or a name or id given twice.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, u32)>,
        slots: usize,
    ) -> std::result::Result<Self, String> {
        let mut interner = Self {
            ids: HashMap::new(),
            names: vec![String::new(); slots],
            retired: vec![true; slots],
        };
        for (name, id) in entries {
            let slot = id as usize;
            if slot >= slots {
                return Err(format!("id {id} out of range for {slots} slots"));
            }
            if !interner.retired[slot] {
                return Err(format!("id {id} assigned twice"));
            }
            if interner.ids.contains_key(&name) {
                return Err(format!("{name} listed twice"));
            }
            interner.names[slot] = name.clone();
            interner.retired[slot] = false;
            interner.ids.insert(name, id);
        }
        Ok(interner)
    }

    /// Id for `name`, allocating one if the name is new or was retired
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_string());
        self.retired.push(false);
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Live id for `name`
    pub fn get(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Name of a live id
    pub fn name(&self, id: u32) -> Option<&str> {
        let slot = id as usize;
        match self.retired.get(slot) {
            Some(false) => Some(self.names[slot].as_str()),
            _ => None,
        }
    }

    /// Tombstone a name, returning its id
    pub fn retire(&mut self, name: &str) -> Option<u32> {
        let id = self.ids.remove(name)?;
        self.retired[id as usize] = true;
        Some(id)
    }

    /// Total slots including retired ones
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.ids.len()
    }

    pub fn retired_count(&self) -> usize {
        self.names.len() - self.ids.len()
    }

    /// Live `(id, name)` pairs in id order
    pub fn live(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names
            .iter()
            .enumerate()
            .filter(|(slot, _)| !self.retired[*slot])
            .map(|(slot, name)| (slot as u32, name.as_str()))
    }

    /// Renumber live names densely, in id order.
    ///
    /// Returns the new interner and an `old id → new id` table (`None` for
    /// retired slots).
    pub fn compacted(&self) -> (Interner, Vec<Option<u32>>) {
        let mut mapping = vec![None; self.names.len()];
        let mut next = Interner::new();
        for (id, name) in self.live() {
            mapping[id as usize] = Some(next.intern(name));
        }
        (next, mapping)
    }
}

/// One explicit or implicit rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user: u32,
    pub item: u32,
    /// Score in [0, 5]
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Ratings plus the user, item and feature id spaces they refer to
#[derive(Debug, Clone, Default)]
pub struct RatingStore {
    pub users: Interner,
    pub items: Interner,
    pub features: Interner,
    ratings: Vec<Rating>,
}

impl RatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rating. Duplicates are kept.
    pub fn push(&mut self, rating: Rating) {
        self.ratings.push(rating);
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Ratings from one user, oldest first
    pub fn for_user(&self, user: u32) -> impl Iterator<Item = &Rating> {
        self.ratings.iter().filter(move |r| r.user == user)
    }

    /// Mean of all stored values, 0 when empty
    pub fn global_mean(&self) -> f64 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        self.ratings.iter().map(|r| r.value).sum::<f64>() / self.ratings.len() as f64
    }

    /// Rewrite ratings with compacted ids, dropping unmapped ones
    pub fn remap(&mut self, user_map: &[Option<u32>], item_map: &[Option<u32>]) {
        let lookup = |map: &[Option<u32>], id: u32| map.get(id as usize).copied().flatten();
        self.ratings = std::mem::take(&mut self.ratings)
            .into_iter()
            .filter_map(|r| {
                Some(Rating {
                    user: lookup(user_map, r.user)?,
                    item: lookup(item_map, r.item)?,
                    ..r
                })
            })
            .collect();
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Forget all ratings and identities
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
