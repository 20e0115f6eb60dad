//! End-to-end checks of the headless commands against real files.

use commanders_core::config::{MapConfig, MatchConfig};
use commanders_core::error::GameError;
use commanders_headless::batch::{run_batch, BatchConfig, BatchResults, BATCH_FILE_NAME};
use commanders_headless::report::MatchOutcome;
use commanders_headless::runner::{HeadlessRunner, RunSettings};
use commanders_headless::validate::{validate_file, FileKind};
use commanders_headless::HeadlessError;
use commanders_test_utils::determinism::verify_determinism;

const STANDARD_BLUEPRINTS: &str = include_str!("../../commanders_core/data/blueprints.ron");

fn quick(seconds: f64) -> RunSettings {
    RunSettings::default()
        .with_match_config(MatchConfig::default().with_map(MapConfig::small()))
        .with_dt(0.05)
        .with_max_seconds(seconds)
}

#[test]
fn test_batch_writes_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let config = BatchConfig::new(3, 10)
        .with_parallel(2)
        .with_settings(quick(3.0))
        .with_output(dir.path().to_path_buf());

    let results = run_batch(config).unwrap();
    assert!(results.errors.is_empty());
    assert_eq!(results.summary.total_matches, 3);
    assert_eq!(results.summary.timeouts, 3);
    let seeds: Vec<u64> = results.reports.iter().map(|r| r.seed).collect();
    assert_eq!(seeds, vec![10, 11, 12]);

    let loaded = BatchResults::load(&dir.path().join(BATCH_FILE_NAME)).unwrap();
    let hashes = |r: &BatchResults| r.reports.iter().map(|m| m.state_hash).collect::<Vec<_>>();
    assert_eq!(hashes(&loaded), hashes(&results));
    assert_eq!(loaded.summary.timeouts, 3);
    assert_eq!(loaded.config.seed_start, 10);
}

#[test]
fn test_parallel_batch_matches_serial_runs() {
    let parallel = run_batch(BatchConfig::new(2, 4).with_parallel(2).with_settings(quick(2.0))).unwrap();
    for report in &parallel.reports {
        let serial = HeadlessRunner::new(quick(2.0).with_seed(report.seed))
            .unwrap()
            .run_to_completion();
        assert_eq!(serial.state_hash, report.state_hash, "seed {}", report.seed);
        assert_eq!(serial.outcome, MatchOutcome::Timeout);
    }
}

#[test]
fn test_runner_replays_identically() {
    let result = verify_determinism(
        3,
        1,
        || HeadlessRunner::new(quick(2.0).with_seed(17)).unwrap(),
        |runner| {
            while runner.step() {}
        },
        |runner| runner.game().state_hash(),
    );
    result.assert_deterministic();
}

#[test]
fn test_validate_config_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.ron");
    std::fs::write(&path, "MatchConfig(seed: 9, starting_resources: 400.0)").unwrap();

    let report = validate_file(&path, false).unwrap();
    assert_eq!(report.kind, FileKind::MatchConfig);
    assert!(report.notes.iter().any(|n| n == "seed 9"));

    let resolved = report.resolved.unwrap();
    let reparsed = MatchConfig::from_ron_str(&resolved).unwrap();
    assert_eq!(reparsed.seed, 9);
    assert!((reparsed.starting_resources - 400.0).abs() < f32::EPSILON);
    assert_eq!(reparsed.max_queue_depth, MatchConfig::default().max_queue_depth);
}

#[test]
fn test_validate_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.ron");
    std::fs::write(&path, "MatchConfig(max_queue_depth: 0)").unwrap();

    let err = validate_file(&path, false).unwrap_err();
    assert!(matches!(err, HeadlessError::Game(GameError::InvalidConfig(_))));
}

#[test]
fn test_validate_blueprints() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blueprints.ron");
    std::fs::write(&path, STANDARD_BLUEPRINTS).unwrap();

    let report = validate_file(&path, true).unwrap();
    assert_eq!(report.kind, FileKind::Blueprints);
    assert!(report.resolved.is_none());
    assert!(report.notes.iter().any(|n| n.starts_with("unit worker")));
    assert!(report.notes.iter().any(|n| n.starts_with("structure hq")));
}

#[test]
fn test_validate_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = validate_file(&dir.path().join("absent.ron"), false).unwrap_err();
    assert!(matches!(err, HeadlessError::Game(GameError::Io { .. })));
}

#[test]
fn test_run_settings_load_config_keeps_seed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.ron");
    std::fs::write(&path, "MatchConfig(seed: 1, map: MapConfig(width: 64, height: 64))").unwrap();

    let settings = RunSettings::new(77).with_config_file(&path).unwrap();
    assert_eq!(settings.match_config.seed, 77);
    assert_eq!(settings.match_config.map.width, 64);
}
