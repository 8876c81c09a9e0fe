use std::fs;

use task_engine::{EngineConfig, TaskPriority};

#[test]
fn missing_project_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let config = EngineConfig::load_from_project(dir.path()).unwrap();

    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.recheck_every_ticks, 1);
    assert_eq!(config.max_consecutive_retries, Some(8));
    assert!(config.announce_cancellations);
}

#[test]
fn partial_yaml_keeps_defaults_for_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join(".colony")).unwrap();
    fs::write(
        dir.path().join(".colony/engine.yaml"),
        "recheck_every_ticks: 4\npriority_floor: high\nevent_log: logs/events.jsonl\n",
    )
    .unwrap();

    let mut config = EngineConfig::load_from_project(dir.path()).unwrap();
    config.resolve_paths(dir.path());

    assert_eq!(config.recheck_every_ticks, 4);
    assert_eq!(config.priority_floor, TaskPriority::High);
    assert_eq!(config.max_consecutive_retries, Some(8));
    assert_eq!(
        config.event_log,
        Some(dir.path().join("logs/events.jsonl"))
    );
}

#[test]
fn null_retry_budget_means_unbounded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.yaml");
    fs::write(&path, "max_consecutive_retries: null\n").unwrap();

    let config = EngineConfig::load(&path).unwrap();

    assert_eq!(config.max_consecutive_retries, None);
}

#[test]
fn malformed_yaml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.yaml");
    fs::write(&path, "recheck_every_ticks: [oops\n").unwrap();

    let err = EngineConfig::load(&path).unwrap_err();

    assert!(err.to_string().contains("Failed to parse config"));
}

#[test]
fn worker_recheck_phase_is_staggered_by_agent() {
    let config = EngineConfig {
        recheck_every_ticks: 4,
        ..EngineConfig::default()
    };

    let a = config.worker_config(1u64);
    let b = config.worker_config(2u64);

    let due_a: Vec<u64> = (0..8).filter(|&t| a.should_recheck(t)).collect();
    let due_b: Vec<u64> = (0..8).filter(|&t| b.should_recheck(t)).collect();
    assert_eq!(due_a, vec![3, 7]);
    assert_eq!(due_b, vec![2, 6]);
}

#[test]
fn every_tick_cadence_rechecks_always() {
    let worker = EngineConfig::default().worker_config(5u64);

    assert!((0..10).all(|t| worker.should_recheck(t)));
}
