//! Integration tests for the skyindex CLI
//!
//! These tests run the skyindex binary against small JSON row files.

mod support;

use predicates::prelude::*;
use support::{skyindex, stdout_json, Fixture};

// ============================================================================
// Help, version and exit codes
// ============================================================================

#[test]
fn test_help_flag() {
    skyindex()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: skyindex"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("recommend"));
}

#[test]
fn test_version_flag() {
    skyindex()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("skyindex"));
}

#[test]
fn test_no_command_prints_banner() {
    skyindex()
        .assert()
        .success()
        .stdout(predicate::str::contains("skyindex --help"));
}

#[test]
fn test_unknown_format_exit_code_2() {
    skyindex()
        .args(["--format", "invalid", "stats"])
        .assert()
        .code(2);
}

#[test]
fn test_usage_error_json_envelope() {
    skyindex()
        .args(["--format", "json", "fuzzy"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("\"usage_error\""));
}

#[test]
fn test_missing_catalog_file_exit_code_1() {
    let fx = Fixture::new();
    skyindex()
        .arg("--catalog")
        .arg(fx.path("nope.json"))
        .args(["search", "M31"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"));
}

// ============================================================================
// Catalog search
// ============================================================================

#[test]
fn test_search_by_alias() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["search", "NGC224"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "M31 (NGC224, Andromeda Galaxy) [Galaxy] mag 3.4",
        ));
}

#[test]
fn test_search_json() {
    let fx = Fixture::new();
    let json = stdout_json(fx.cmd().args(["--format", "json", "search", "Orion Nebula"]));
    let results = json.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "M42");
    assert_eq!(results[0]["click_count"], 30);
    assert_eq!(results[0]["record"]["type"], "Nebula");
}

#[test]
fn test_search_no_matches() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["search", "M99"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No matches"));
}

#[test]
fn test_fuzzy_search_distance() {
    let fx = Fixture::new();
    let json = stdout_json(fx.cmd().args(["--format", "json", "fuzzy", "M3", "-d", "1"]));
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["M31", "M33"]);
}

#[test]
fn test_complete_prefix() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["complete", "NGC"])
        .assert()
        .success()
        .stdout("NGC1976\nNGC224\nNGC598\n");
}

#[test]
fn test_filter_by_type_and_magnitude() {
    let fx = Fixture::new();
    let json = stdout_json(fx.cmd().args(["--format", "json", "filter", "--type", "Galaxy"]));
    assert_eq!(json.as_array().unwrap().len(), 2);

    let json = stdout_json(fx.cmd().args(["--format", "json", "filter", "--max-mag", "3.5"]));
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["M31", "M45"]);
}

#[test]
fn test_filter_rejects_inverted_range() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["filter", "--min-mag", "5", "--max-mag", "2"])
        .assert()
        .code(2);
}

#[test]
fn test_similar_objects() {
    let fx = Fixture::new();
    let json = stdout_json(fx.cmd().args(["--format", "json", "similar", "M31"]));
    assert_eq!(json[0]["id"], "M33");

    fx.cmd().args(["similar", "M99"]).assert().code(3);
}

// ============================================================================
// Recommendation
// ============================================================================

#[test]
fn test_recommend_top_n() {
    let fx = Fixture::new();
    let json = stdout_json(fx.cmd().args(["--format", "json", "recommend", "alice", "-n", "2"]));
    let recs = json.as_array().unwrap();
    assert_eq!(recs.len(), 2);
    assert!(recs[0]["score"].as_f64().unwrap() >= recs[1]["score"].as_f64().unwrap());
}

#[test]
fn test_recommend_hybrid_and_content() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["recommend", "alice", "--hybrid"])
        .assert()
        .success();

    // alice rated M31 highly; M33 shares its galaxy type
    fx.cmd()
        .args(["recommend", "alice", "--content", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("M33\t"));

    fx.cmd()
        .args(["recommend", "alice", "--content", "--hybrid"])
        .assert()
        .code(2);
}

#[test]
fn test_predict_unknown_item_exit_code_3() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["--format", "json", "predict", "alice", "M99"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("\"not_found\""));
}

#[test]
fn test_saved_model_matches_fresh_training() {
    let fx = Fixture::new();
    let model = fx.path("model.skym");

    fx.cmd()
        .arg("train")
        .arg("--save")
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("Trained on 5 ratings"));
    assert!(model.exists());

    let trained = fx.cmd().args(["predict", "bob", "M42"]).output().unwrap();
    let loaded = fx
        .cmd()
        .arg("--model")
        .arg(&model)
        .args(["predict", "bob", "M42"])
        .output()
        .unwrap();
    assert!(loaded.status.success());
    assert_eq!(trained.stdout, loaded.stdout);
}

#[test]
fn test_missing_model_file_exit_code_3() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("--model")
        .arg(fx.path("missing.skym"))
        .args(["recommend", "alice"])
        .assert()
        .code(3);
}

// ============================================================================
// Import, export and stats
// ============================================================================

#[test]
fn test_bad_rating_rows_are_skipped() {
    let fx = Fixture::new();
    let ratings = fx.write(
        "bad.json",
        r#"[{"user": "alice", "item": "M31", "rating": 9}, {"user": "alice", "item": "M42", "rating": 3}]"#,
    );

    let output = skyindex()
        .arg("--catalog")
        .arg(fx.path("catalog.json"))
        .arg("--ratings")
        .arg(&ratings)
        .args(["--format", "json", "stats"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("skipped 1 of 2 rating rows"));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["recommender"]["ratings"], 1);
}

#[test]
fn test_stats_json() {
    let fx = Fixture::new();
    let json = stdout_json(fx.cmd().args(["--format", "json", "stats"]));
    assert_eq!(json["entries"], 4);
    assert_eq!(json["recommender"]["ratings"], 5);
    assert_eq!(json["recommender"]["users"], 3);
}

#[test]
fn test_export_selected_fields() {
    let fx = Fixture::new();
    let json = stdout_json(fx.cmd().args(["export", "entries", "--fields", "name,type"]));
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["name"], "M31");
    assert_eq!(rows[0]["type"], "Galaxy");
    assert_eq!(rows[0].as_object().unwrap().len(), 2);
}

#[test]
fn test_export_ratings_round_trip() {
    let fx = Fixture::new();
    let exported = fx.path("exported.json");
    fx.cmd()
        .args(["export", "ratings", "-o"])
        .arg(&exported)
        .assert()
        .success();

    let json = stdout_json(
        skyindex()
            .arg("--catalog")
            .arg(fx.path("catalog.json"))
            .arg("--ratings")
            .arg(&exported)
            .args(["--format", "json", "stats"]),
    );
    assert_eq!(json["recommender"]["ratings"], 5);

    fx.cmd()
        .args(["export", "ratings", "--fields", "user"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_config_exit_code_2() {
    let fx = Fixture::new();
    let config = fx.write("skyindex.toml", "[recommender]\nlatent_factors = 0\n");
    fx.cmd()
        .arg("--config")
        .arg(&config)
        .arg("stats")
        .assert()
        .code(2);
}

#[test]
fn test_config_changes_model_shape() {
    let fx = Fixture::new();
    let config = fx.write("skyindex.toml", "[recommender]\nlatent_factors = 3\n");
    let json = stdout_json(
        fx.cmd()
            .arg("--config")
            .arg(&config)
            .args(["--format", "json", "train"]),
    );
    assert_eq!(json["latent_factors"], 3);
}
