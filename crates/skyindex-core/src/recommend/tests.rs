use super::*;
use tempfile::tempdir;

fn small_config() -> RecommenderConfig {
    RecommenderConfig {
        latent_factors: 4,
        iterations: 50,
        learning_rate: 0.05,
        init_range: 0.1,
        ..RecommenderConfig::default()
    }
}

fn engine_with_ratings() -> RecommendationEngine {
    let mut engine = RecommendationEngine::new(small_config());
    engine.add_rating("u1", "M31", 5.0).unwrap();
    engine.add_rating("u1", "M42", 1.0).unwrap();
    engine.add_rating("u2", "M42", 4.0).unwrap();
    engine.add_rating("u2", "M45", 2.0).unwrap();
    engine
}

#[test]
fn test_rating_bounds() {
    let mut engine = RecommendationEngine::default();
    assert!(matches!(
        engine.add_rating("u", "i", 5.1),
        Err(SkyError::InvalidRating { .. })
    ));
    assert!(engine.add_rating("u", "i", -0.1).unwrap_err().is_validation());
    assert!(engine.add_rating("u", "i", f64::NAN).is_err());
    assert!(engine.add_rating("u", "i", 0.0).is_ok());
    assert!(engine.add_rating("u", "i", 5.0).is_ok());
    assert_eq!(engine.stats().ratings, 2);
}

#[test]
fn test_empty_identifiers_rejected() {
    let mut engine = RecommendationEngine::default();
    assert!(matches!(
        engine.add_rating("", "i", 3.0),
        Err(SkyError::EmptyIdentifier { .. })
    ));
    assert!(engine.add_item_feature("i", " ", 0.5).is_err());
    assert!(engine.recommend("", 3).is_err());
}

#[test]
fn test_feature_weight_bounds() {
    let mut engine = RecommendationEngine::default();
    assert!(matches!(
        engine.add_item_feature("M31", "type:galaxy", 1.5),
        Err(SkyError::InvalidFeatureWeight { .. })
    ));
    assert!(engine.add_item_feature("M31", "type:galaxy", 1.0).is_ok());
    assert!(engine.add_item_feature("M31", "desc:spiral", 0.0).is_ok());
}

#[test]
fn test_batch_is_all_or_nothing() {
    let mut engine = RecommendationEngine::default();
    let bad = vec![
        ("u1".to_string(), "M31".to_string(), 4.0),
        ("u1".to_string(), "M42".to_string(), 9.0),
    ];
    assert!(engine.add_ratings(&bad).is_err());
    assert_eq!(engine.stats().ratings, 0);

    let good = vec![("u1".to_string(), "M31".to_string(), 4.0)];
    assert_eq!(engine.add_ratings(&good).unwrap(), 1);
}

#[test]
fn test_implicit_feedback_is_low_rating() {
    let mut engine = RecommendationEngine::default();
    engine.add_implicit_feedback("u1", "M31").unwrap();
    let ratings = engine.ratings();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].value, IMPLICIT_FEEDBACK_RATING);
}

#[test]
fn test_predict_is_strict() {
    let mut engine = engine_with_ratings();
    assert!(matches!(
        engine.predict("u1", "M31"),
        Err(SkyError::NotFound { .. })
    ));

    engine.train();
    assert!(engine.predict("u1", "M31").is_ok());
    assert!(matches!(
        engine.predict("nobody", "M31"),
        Err(SkyError::NotFound { .. })
    ));
    assert!(engine.predict("u1", "M1").is_err());
}

#[test]
fn test_predict_or_register_allocates() {
    let mut engine = engine_with_ratings();
    engine.train();
    let score = engine.predict_or_register("newcomer", "M31").unwrap();
    assert!(score.is_finite());
    assert!(engine.predict("newcomer", "M31").is_ok());
    assert_eq!(engine.stats().users, 3);
}

#[test]
fn test_train_does_not_recenter_ratings() {
    let mut engine = engine_with_ratings();
    engine.train();
    let mean = engine.global_mean();
    engine.train();
    assert_eq!(engine.global_mean(), mean);
    assert!((mean - 3.0).abs() < 1e-12);
    assert_eq!(engine.ratings()[0].value, 5.0);
}

#[test]
fn test_train_twice_gives_identical_predictions() {
    let mut engine = engine_with_ratings();
    engine.train();
    let first = engine.predict("u2", "M31").unwrap();
    engine.train();
    assert_eq!(engine.predict("u2", "M31").unwrap(), first);
}

#[test]
fn test_recommend_ranks_every_live_item() {
    let mut engine = engine_with_ratings();
    engine.train();

    let recs = engine.recommend("u1", 10).unwrap();
    assert_eq!(recs.len(), 3);
    for pair in recs.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }
    let top = &recs[0];
    for (item, _) in &recs {
        assert!(top.1 >= engine.predict("u1", item).unwrap());
    }
}

#[test]
fn test_recommend_registers_unknown_user() {
    let mut engine = engine_with_ratings();
    engine.train();
    let recs = engine.recommend("stranger", 2).unwrap();
    assert_eq!(recs.len(), 2);
    assert!(engine.predict("stranger", "M31").is_ok());
}

#[test]
fn test_recommend_ties_broken_by_name() {
    let mut engine = RecommendationEngine::new(RecommenderConfig {
        init_range: 0.0,
        ..small_config()
    });
    engine.add_item("b", &[]).unwrap();
    engine.add_item("a", &[]).unwrap();
    engine.add_item("c", &[]).unwrap();

    let recs = engine.recommend("u", 3).unwrap();
    let names: Vec<_> = recs.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_recommend_cache_and_invalidation() {
    let mut engine = engine_with_ratings();
    engine.train();
    let first = engine.recommend("u1", 2).unwrap();
    assert_eq!(engine.stats().cached_users, 1);

    // a shorter request is served from the cached list
    assert_eq!(engine.recommend("u1", 1).unwrap(), first[..1].to_vec());

    engine.add_rating("u1", "M45", 3.0).unwrap();
    assert_eq!(engine.stats().cached_users, 0);

    engine.recommend("u1", 2).unwrap();
    engine.train();
    assert_eq!(engine.stats().cached_users, 0);
}

#[test]
fn test_invalidate_user_drops_one_list() {
    let mut engine = engine_with_ratings();
    engine.train();
    engine.recommend("u1", 2).unwrap();
    engine.recommend("u2", 2).unwrap();
    assert_eq!(engine.stats().cached_users, 2);

    assert!(engine.invalidate_user("u1"));
    assert!(!engine.invalidate_user("u1"));
    assert_eq!(engine.stats().cached_users, 1);
}

#[test]
fn test_short_catalog_list_stays_cached() {
    let mut engine = engine_with_ratings();
    engine.train();
    let first = engine.recommend("u1", 10).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(engine.recommend("u1", 10).unwrap(), first);
    assert_eq!(engine.stats().cached_users, 1);

    // a new item must show up in the next request
    engine.add_item("M81", &[]).unwrap();
    assert_eq!(engine.stats().cached_users, 0);
    assert_eq!(engine.recommend("u1", 10).unwrap().len(), 4);
}

#[test]
fn test_similarity_and_similar_items() {
    let mut engine = RecommendationEngine::default();
    engine
        .add_item("M31", &["type:galaxy".to_string(), "morphology:sb".to_string()])
        .unwrap();
    engine
        .add_item("M33", &["type:galaxy".to_string(), "morphology:sc".to_string()])
        .unwrap();
    engine.add_item("M42", &["type:nebula".to_string()]).unwrap();

    assert!((engine.similarity("M31", "M33") - 0.5).abs() < 1e-6);
    assert_eq!(engine.similarity("M31", "M42"), 0.0);
    assert_eq!(engine.similarity("M31", "unknown"), 0.0);

    let similar = engine.similar_items("M31", 5).unwrap();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].id, "M33");
    assert!(engine.similar_items("unknown", 5).is_err());
}

#[test]
fn test_hybrid_score_blends_content() {
    let mut engine = RecommendationEngine::new(small_config());
    engine.add_item("M31", &["type:galaxy".to_string()]).unwrap();
    engine.add_item("M33", &["type:galaxy".to_string()]).unwrap();
    engine.add_rating("u1", "M31", 5.0).unwrap();
    engine.train();

    let mf = engine.predict("u1", "M33").unwrap();
    let hybrid = engine.hybrid_score("u1", "M33").unwrap();
    let config = engine.config().clone();
    let expected = config.mf_weight * mf + config.content_weight * 1.0;
    assert!((hybrid - expected).abs() < 1e-6);

    assert!(engine.hybrid_score("u9", "M33").is_err());
}

#[test]
fn test_content_recommendations_from_liked_items() {
    let mut engine = RecommendationEngine::default();
    engine.add_item("M31", &["type:galaxy".to_string()]).unwrap();
    engine.add_item("M33", &["type:galaxy".to_string()]).unwrap();
    engine.add_item("M42", &["type:nebula".to_string()]).unwrap();
    engine.add_item("M43", &["type:nebula".to_string()]).unwrap();
    engine.add_rating("u1", "M31", 5.0).unwrap();
    engine.add_rating("u1", "M42", 2.0).unwrap();

    let recs = engine.content_recommendations("u1", 5);
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].0, "M33");
    assert!(recs[0].1 > 4.9 && recs[0].1 <= 5.0);

    assert!(engine.content_recommendations("nobody", 5).is_empty());
}

#[test]
fn test_content_recommendations_decay_old_ratings() {
    let mut engine = RecommendationEngine::default();
    engine.add_item("M31", &["type:galaxy".to_string()]).unwrap();
    engine.add_item("M33", &["type:galaxy".to_string()]).unwrap();
    let now = Utc::now();
    engine
        .add_rating_at("u1", "M31", 5.0, now - Duration::days(3650))
        .unwrap();

    let recs = engine.content_recommendations_at("u1", 5, now);
    let expected = 5.0 * (-1.0f64).exp();
    assert!((recs[0].1 - expected).abs() < 1e-3);
}

#[test]
fn test_hybrid_recommendations_merge_sources() {
    let mut engine = RecommendationEngine::new(small_config());
    engine.add_item("M31", &["type:galaxy".to_string()]).unwrap();
    engine.add_item("M33", &["type:galaxy".to_string()]).unwrap();
    engine.add_item("M42", &["type:nebula".to_string()]).unwrap();
    engine.add_rating("u1", "M31", 5.0).unwrap();
    engine.train();

    let recs = engine.hybrid_recommendations("u1", 2, 0.3, 0.7).unwrap();
    assert_eq!(recs.len(), 2);
    assert!(recs.iter().any(|(item, _)| item == "M33"));
    for pair in recs.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }
}

#[test]
fn test_retire_and_compact() {
    let mut engine = engine_with_ratings();
    engine.add_item("M45", &["type:cluster".to_string()]).unwrap();
    engine.train();

    assert!(engine.retire_item("M42"));
    assert!(!engine.retire_item("M42"));
    assert!(engine.predict("u1", "M42").is_err());
    let recs = engine.recommend("u1", 10).unwrap();
    assert!(recs.iter().all(|(item, _)| item != "M42"));

    let before = engine.predict("u2", "M45").unwrap();
    let report = engine.compact();
    assert_eq!(report.items_removed, 1);
    assert_eq!(report.ratings_removed, 2);
    assert_eq!(engine.stats().retired_items, 0);
    assert_eq!(engine.stats().ratings, 2);
    assert_eq!(engine.predict("u2", "M45").unwrap(), before);
    assert!((engine.similarity("M45", "M45") - 1.0).abs() < 1e-6);
}

#[test]
fn test_save_and_load_reproduce_predictions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.skym");

    let mut engine = engine_with_ratings();
    engine.train();
    engine.save_model(&path).unwrap();

    let mut fresh = RecommendationEngine::new(small_config());
    fresh.load_model(&path).unwrap();
    for (user, item) in [("u1", "M31"), ("u2", "M45"), ("u1", "M42")] {
        assert_eq!(
            fresh.predict(user, item).unwrap(),
            engine.predict(user, item).unwrap()
        );
    }
}

#[test]
fn test_save_covers_ids_added_after_training() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.skym");

    let mut engine = engine_with_ratings();
    engine.train();
    engine.add_item("M81", &[]).unwrap();
    engine.retire_item("M45");
    engine.save_model(&path).unwrap();

    let mut fresh = RecommendationEngine::new(small_config());
    fresh.load_model(&path).unwrap();
    assert_eq!(
        fresh.predict("u1", "M81").unwrap(),
        engine.predict_or_register("u1", "M81").unwrap()
    );
    assert!(fresh.predict("u1", "M45").is_err());
}

#[test]
fn test_load_rejects_conflicting_ids() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.skym");
    let mut engine = engine_with_ratings();
    engine.train();
    engine.save_model(&path).unwrap();

    let mut other = RecommendationEngine::new(small_config());
    other.add_item("M45", &[]).unwrap();
    assert!(matches!(
        other.load_model(&path),
        Err(SkyError::Model { .. })
    ));

    let mut wrong_k = RecommendationEngine::new(RecommenderConfig {
        latent_factors: 8,
        ..small_config()
    });
    assert!(wrong_k.load_model(&path).is_err());
}

#[test]
fn test_clear_resets_everything() {
    let mut engine = engine_with_ratings();
    engine.train();
    engine.clear();
    let stats = engine.stats();
    assert_eq!(stats.ratings, 0);
    assert_eq!(stats.items, 0);
    assert!(!stats.trained);
}
