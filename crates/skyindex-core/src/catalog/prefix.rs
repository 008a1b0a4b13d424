//! Character trie over display names and aliases

use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<char, TrieNode>,
    terminal: bool,
}

/// Grow-only prefix index.
///
/// Words are never removed; callers that retire names filter the output of
/// [`PrefixIndex::autocomplete`] against their live name set.
#[derive(Debug, Default)]
pub struct PrefixIndex {
    root: TrieNode,
    words: usize,
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a word. Inserting the same word twice is a no-op.
    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.words += 1;
        }
    }

    /// Every inserted word starting with `prefix`.
    ///
    /// Depth-first, children in ascending character order, so a word is always
    /// listed before its extensions. The empty prefix enumerates everything.
    pub fn autocomplete(&self, prefix: &str) -> Vec<String> {
        let mut node = &self.root;
        for c in prefix.chars() {
            match node.children.get(&c) {
                Some(next) => node = next,
                None => return Vec::new(),
            }
        }

        let mut results = Vec::new();
        let mut buffer = prefix.to_string();
        collect(node, &mut buffer, &mut results);
        results
    }

    /// Whether `word` was inserted
    pub fn contains(&self, word: &str) -> bool {
        let mut node = &self.root;
        for c in word.chars() {
            match node.children.get(&c) {
                Some(next) => node = next,
                None => return false,
            }
        }
        node.terminal
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }
}

fn collect(node: &TrieNode, buffer: &mut String, out: &mut Vec<String>) {
    if node.terminal {
        out.push(buffer.clone());
    }
    for (c, child) in &node.children {
        buffer.push(*c);
        collect(child, buffer, out);
        buffer.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(words: &[&str]) -> PrefixIndex {
        let mut index = PrefixIndex::new();
        for w in words {
            index.insert(w);
        }
        index
    }

    #[test]
    fn test_insert_is_idempotent() {
        let index = index(&["M31", "M31", "M42"]);
        assert_eq!(index.len(), 2);
        assert!(index.contains("M31"));
        assert!(!index.contains("M3"));
    }

    #[test]
    fn test_autocomplete_sorted_depth_first() {
        let index = index(&["NGC224", "M42", "M31", "M3", "M101"]);
        assert_eq!(index.autocomplete("M"), vec!["M101", "M3", "M31", "M42"]);
        assert_eq!(index.autocomplete("M3"), vec!["M3", "M31"]);
        assert_eq!(index.autocomplete("X"), Vec::<String>::new());
    }

    #[test]
    fn test_empty_prefix_enumerates_everything() {
        let index = index(&["b", "a", "ab"]);
        assert_eq!(index.autocomplete(""), vec!["a", "ab", "b"]);
    }

    #[test]
    fn test_longer_prefix_is_subset() {
        let index = index(&["Andromeda", "Antlia", "Andes", "Aquila"]);
        let short = index.autocomplete("An");
        for word in index.autocomplete("And") {
            assert!(short.contains(&word));
        }
    }

    #[test]
    fn test_unicode_words() {
        let index = index(&["仙女座星系", "仙后座"]);
        assert_eq!(index.autocomplete("仙女"), vec!["仙女座星系"]);
    }
}
