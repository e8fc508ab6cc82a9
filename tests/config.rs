//! Tests for pipeline configuration loading

use std::fs;

use falsetrips::{FalseTripError, FeatureWeights, PipelineConfig};

#[test]
fn test_defaults() {
    let config = PipelineConfig::default();
    assert_eq!(config.trips_per_driver, 200);
    assert_eq!(config.stop_velocity, 0.2);
    assert_eq!(config.min_acceleration_secs, 3);
    assert_eq!(config.clustering_iterations, 7);
    assert_eq!(config.false_weight_threshold, 3);
    assert_eq!(config.weights, FeatureWeights::default());
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "trips_per_driver": 50, "weights": { "distance": 2 } }"#,
    )
    .unwrap();

    let config = PipelineConfig::from_json_file(&path).unwrap();
    assert_eq!(config.trips_per_driver, 50);
    assert_eq!(config.clustering_iterations, 7);
    assert_eq!(config.weights.distance, 2);
    assert_eq!(config.weights.acceleration, 2);
}

#[test]
fn test_broken_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ trips_per_driver: ").unwrap();

    let err = PipelineConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(err, FalseTripError::Config { .. }));
    assert!(err.to_string().contains("config.json"));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = PipelineConfig::from_json_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, FalseTripError::Io { .. }));
}

#[test]
fn test_file_values_are_validated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "clustering_iterations": 0 }"#).unwrap();

    assert!(matches!(
        PipelineConfig::from_json_file(&path),
        Err(FalseTripError::InvalidConfig { .. })
    ));
}

#[test]
fn test_validate_rejects_unusable_values() {
    let bad = [
        PipelineConfig {
            trips_per_driver: 0,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            stop_velocity: -0.5,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            stop_velocity: f64::NAN,
            ..PipelineConfig::default()
        },
    ];
    for config in bad {
        assert!(config.validate().is_err(), "{:?}", config);
    }
}
