//! Tests for loading evaluation configs from disk.

use configuration::error::ConfigError;
use configuration::{
    load_config, BucketPolicy, EngineMode, OutlierCriterion, DEFAULT_DATE_COLUMN,
};
use core_types::TimeInterval;
use std::io::Write;

/// Helper: write `contents` to a temp file with the given extension.
fn write_config(extension: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn toml_config_with_every_section() {
    let file = write_config(
        "toml",
        r#"
filter = "amount > 0"
date_column = "created_at"
time_interval = "6h"
target_column = "is_fraud"
columns_to_exclude = ["id"]
bucket_policy = "continuous"

[source]
path = "data/transactions.csv"
schema_overrides = [{ column = "created_at", type = "Datetime" }]

[[transformations]]
name = "amount_usd"
expression = "amount * rate"

[[transformations]]
name = "is_large"
expression = "amount_usd > 1000"

[outliers]
criterion = "Z-score"
threshold_z_score = 2.5

[engine]
mode = "streaming"
chunk_size = 1000
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.filter.as_deref(), Some("amount > 0"));
    assert_eq!(config.date_column_name(), "created_at");
    assert_eq!(config.time_interval, "6h".parse::<TimeInterval>().unwrap());
    assert_eq!(config.bucket_policy, BucketPolicy::Continuous);
    // Transformations keep their declared order.
    let names: Vec<&str> = config.transformations.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["amount_usd", "is_large"]);
    assert_eq!(config.outliers.criterion, OutlierCriterion::ZScore);
    assert_eq!(config.outliers.threshold_z_score, 2.5);
    assert_eq!(config.outliers.multiplier_iqr, 1.5);
    assert_eq!(config.engine.mode, EngineMode::Streaming);
    assert_eq!(config.engine.effective_chunk_size(), Some(1000));
    assert_eq!(config.source.schema_overrides[0].data_type, "Datetime");
}

#[test]
fn json_config_falls_back_to_defaults() {
    let file = write_config("json", r#"{ "source": { "file_path": "data.csv" } }"#);

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.source.path.as_deref(), Some("data.csv"));
    assert_eq!(config.date_column_name(), DEFAULT_DATE_COLUMN);
    assert_eq!(config.time_interval, TimeInterval::default());
    assert_eq!(config.outliers.criterion, OutlierCriterion::Iqr);
    assert_eq!(config.bucket_policy, BucketPolicy::Sparse);
    assert!(config.transformations.is_empty());
}

#[test]
fn invalid_interval_fails_to_load() {
    let file = write_config(
        "toml",
        r#"
time_interval = "fortnightly"
[source]
path = "data.csv"
"#,
    );

    assert!(matches!(load_config(file.path()), Err(ConfigError::LoadError(_))));
}

#[test]
fn validation_runs_after_loading() {
    let file = write_config(
        "toml",
        r#"
[source]
path = "data.csv"

[outliers]
threshold_z_score = 0.0
"#,
    );

    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn missing_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(load_config(&missing), Err(ConfigError::LoadError(_))));
}
