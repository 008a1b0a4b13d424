use super::*;

fn vector(pairs: &[(u32, f64)]) -> FeatureVector {
    pairs.iter().copied().collect()
}

#[test]
fn test_identical_vectors_score_near_one() {
    let a = vector(&[(0, 1.0), (1, 0.5)]);
    let score = cosine(&a, &a);
    assert!(score > 0.999_999 && score <= 1.0);
}

#[test]
fn test_disjoint_vectors_score_zero() {
    let a = vector(&[(0, 1.0)]);
    let b = vector(&[(1, 1.0)]);
    assert_eq!(cosine(&a, &b), 0.0);
}

#[test]
fn test_empty_vector_is_not_an_error() {
    let empty = FeatureVector::new();
    assert_eq!(cosine(&empty, &empty), 0.0);
    assert_eq!(cosine(&empty, &vector(&[(0, 1.0)])), 0.0);
}

#[test]
fn test_missing_items_score_zero() {
    let mut content = ContentSimilarity::new();
    content.set_feature(0, 7, 1.0);
    assert_eq!(content.similarity(0, 99), 0.0);
    assert_eq!(content.similarity(98, 99), 0.0);
}

#[test]
fn test_similarity_is_symmetric() {
    let mut content = ContentSimilarity::new();
    content.set_feature(0, 0, 1.0);
    content.set_feature(0, 1, 0.5);
    content.set_feature(1, 0, 1.0);
    content.set_feature(1, 2, 0.5);

    let ab = content.similarity(0, 1);
    let ba = content.similarity(1, 0);
    assert!((ab - ba).abs() < 1e-12);
    assert!((ab - 0.8).abs() < 1e-6);
}

#[test]
fn test_set_feature_overwrites() {
    let mut content = ContentSimilarity::new();
    content.set_feature(0, 0, 0.2);
    content.set_feature(0, 0, 0.9);
    assert_eq!(content.vector(0).and_then(|v| v.get(&0)), Some(&0.9));
    assert_eq!(content.len(), 1);
}

#[test]
fn test_neighbourhood_score_applies_threshold() {
    let mut content = ContentSimilarity::new();
    content.set_feature(0, 0, 1.0);
    content.set_feature(1, 0, 1.0);
    content.set_feature(2, 0, 1.0);
    content.set_feature(2, 1, 1.0);
    content.set_feature(2, 2, 1.0);
    content.set_feature(2, 3, 1.0);

    // item 1 is identical, item 2 scores 0.5 which is not above the threshold
    let score = content.neighbourhood_score(0, [0, 1, 2], 0.5);
    assert!((score - 1.0).abs() < 1e-6);
}

#[test]
fn test_remap_drops_retired_items_and_features() {
    let mut content = ContentSimilarity::new();
    content.set_feature(0, 0, 1.0);
    content.set_feature(1, 1, 1.0);
    content.set_feature(2, 0, 0.5);
    content.set_feature(2, 1, 0.5);

    content.remap(&[None, Some(0), Some(1)], &[Some(0), None]);

    assert_eq!(content.len(), 1);
    assert_eq!(content.vector(1), Some(&vector(&[(0, 0.5)])));
    assert!(content.vector(0).is_none());
}
