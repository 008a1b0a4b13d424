//! Text processing for content features derived from catalog descriptions

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

/// Common English stop words plus catalog boilerplate dropped during tokenization
static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// Porter stemmer for English text
static STEMMER: OnceLock<Stemmer> = OnceLock::new();

/// Minimum token length kept as a feature
const MIN_TOKEN_LEN: usize = 3;

fn get_stop_words() -> &'static HashSet<&'static str> {
    STOP_WORDS.get_or_init(|| {
        [
            "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "if",
            "in", "into", "is", "it", "its", "near", "no", "not", "of", "on", "or", "such",
            "that", "the", "their", "then", "there", "these", "they", "this", "to", "very",
            "was", "will", "with",
        ]
        .iter()
        .copied()
        .collect()
    })
}

fn get_stemmer() -> &'static Stemmer {
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// Word tokenizer splitting on non-alphanumeric characters with stop word removal
pub fn tokenize(text: &str) -> Vec<String> {
    let stop_words = get_stop_words();
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .filter(|s| !stop_words.contains(s))
        .map(|s| s.to_string())
        .collect()
}

/// Tokenize text with optional Porter stemming
///
/// When `stem` is true, "clusters" and "cluster" produce the same token.
pub fn tokenize_with_stemming(text: &str, stem: bool) -> Vec<String> {
    let tokens = tokenize(text);
    if !stem {
        return tokens;
    }

    let stemmer = get_stemmer();
    tokens.iter().map(|t| stemmer.stem(t).to_string()).collect()
}

/// Distinct description tokens usable as content feature names.
///
/// Purely numeric tokens and tokens shorter than three characters carry no
/// content signal and are dropped. Output is sorted.
pub fn description_features(text: &str, stem: bool) -> Vec<String> {
    tokenize_with_stemming(text, stem)
        .into_iter()
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .map(|t| format!("desc:{t}"))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Normalize a classification label ("Spiral Galaxy ") into a feature key
/// ("type:spiral-galaxy"). Returns None for blank labels.
pub fn label_feature(kind: &str, label: &str) -> Option<String> {
    let normalized = label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if normalized.is_empty() {
        None
    } else {
        Some(format!("{kind}:{normalized}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        let tokens = tokenize("A bright spiral galaxy in Andromeda.");
        assert_eq!(tokens, vec!["bright", "spiral", "galaxy", "andromeda"]);
    }

    #[test]
    fn test_tokenize_empty_after_stop_words() {
        let tokens = tokenize("the a an and or");
        assert_eq!(tokens, Vec::<String>::new());
    }

    #[test]
    fn test_tokenize_lowercases() {
        let tokens = tokenize("Emission NEBULA and Dust");
        assert_eq!(tokens, vec!["emission", "nebula", "dust"]);
    }

    #[test]
    fn test_stemming_merges_plurals() {
        let tokens = tokenize_with_stemming("Clusters cluster stars star", true);
        assert_eq!(tokens, vec!["cluster", "cluster", "star", "star"]);
    }

    #[test]
    fn test_stemming_disabled() {
        let tokens = tokenize_with_stemming("Clusters cluster", false);
        assert_eq!(tokens, vec!["clusters", "cluster"]);
    }

    #[test]
    fn test_description_features_dedup_and_filter() {
        let features = description_features("Globular cluster, 12 arcmin; globular halo", false);
        assert_eq!(
            features,
            vec![
                "desc:arcmin".to_string(),
                "desc:cluster".to_string(),
                "desc:globular".to_string(),
                "desc:halo".to_string(),
            ]
        );
    }

    #[test]
    fn test_label_feature() {
        assert_eq!(
            label_feature("type", " Spiral  Galaxy "),
            Some("type:spiral-galaxy".to_string())
        );
        assert_eq!(label_feature("morphology", "   "), None);
    }
}
