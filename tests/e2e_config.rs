//! E2E tests for persistent configuration
//!
//! Tests config round-trip, defaults, and that a loaded config drives a
//! session the same way the equivalent options do.

use pluginfuzz::config::ConfigError;
use pluginfuzz::processor::reference::PassThrough;
use pluginfuzz::{CollectingReporter, FuzzConfig, FuzzOptions, SessionRunner};
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn test_config_file_drives_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fuzz.json");
    std::fs::write(
        &path,
        r#"{
            "sample_rates": [8000.0, 11025.0],
            "block_size": 100,
            "session_seconds": 0.2,
            "seed": 31337
        }"#,
    )
    .unwrap();

    let config = FuzzConfig::load(&path).unwrap();
    assert_eq!(config.strictness_level, 5);
    assert_eq!(config.channels, 2);

    let mut runner = SessionRunner::new(
        config.to_options(),
        StdRng::seed_from_u64(config.seed.unwrap()),
    );
    let mut reporter = CollectingReporter::new();
    let summaries = runner
        .run(&mut PassThrough::new(config.channels), &mut reporter)
        .unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].target_samples, 1600);
    assert_eq!(summaries[1].target_samples, 2205);
    assert!(summaries.iter().all(|s| s.nominal_block_size == 100));
}

#[test]
fn test_config_matches_builder_options() {
    let config = FuzzConfig {
        sample_rates: vec![32000.0],
        block_size: 48,
        strictness_level: 8,
        session_seconds: 2.0,
        ..Default::default()
    };
    let options = FuzzOptions::default()
        .with_sample_rates(vec![32000.0])
        .with_block_size(48)
        .with_strictness_level(8)
        .with_session_seconds(2.0);
    assert_eq!(config.to_options(), options);
}

#[test]
fn test_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep").join("er").join("fuzz.json");

    let config = FuzzConfig {
        sample_rates: vec![192000.0, 44100.0],
        block_size: 2048,
        strictness_level: 10,
        seed: Some(u64::MAX),
        session_seconds: 60.0,
        channels: 8,
    };
    config.save(&path).unwrap();
    assert_eq!(FuzzConfig::load(&path).unwrap(), config);
}

#[test]
fn test_config_rejects_wrong_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fuzz.json");
    std::fs::write(&path, r#"{"block_size": "large"}"#).unwrap();

    let err = FuzzConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("Invalid config JSON"));
}

#[test]
fn test_invalid_config_values_fail_before_processing() {
    let config = FuzzConfig {
        sample_rates: vec![-44100.0],
        ..Default::default()
    };
    let mut runner = SessionRunner::new(config.to_options(), StdRng::seed_from_u64(0));
    let mut reporter = CollectingReporter::new();
    let mut processor = PassThrough::new(2);

    assert!(runner.run(&mut processor, &mut reporter).is_err());
    assert_eq!(processor.prepared(), None);
}
