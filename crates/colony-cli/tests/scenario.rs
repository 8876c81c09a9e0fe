use std::fs;

use colony_cli::{run, Scenario};
use task_engine::{EngineConfig, JsonlEventSink, TaskEventKind};

const KITCHEN: &str = r#"
ticks: 100
agents:
  - name: Urist
    faction: dwarves
    position: { x: 0, y: 0, z: 0 }
creatures:
  - name: Snaga
    faction: goblins
    position: { x: 4, y: 0, z: 0 }
    health: 10
stations:
  - tag: stove
    at: { x: 0, y: 2, z: 0 }
stockpile:
  - resource: Grain
    tags: [grain]
    count: 3
orders:
  - kill:
      target: Snaga
  - craft_resource:
      item:
        name: Bread
        required_resources:
          - { resource: grain, count: 1 }
        craft_location: stove
        craft_ticks: 2
        num_repeats: 2
        edible: true
"#;

#[test]
fn scenario_runs_until_the_pool_drains() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.yaml");
    fs::write(&path, KITCHEN).unwrap();

    let scenario = Scenario::load(&path).unwrap();
    let report = run(&scenario, &EngineConfig::default(), None).unwrap();

    assert_eq!(report.outstanding, 0);
    assert_eq!(report.completed, 3);
    assert!(report.ticks < 100);
    let bread = report.stock.iter().find(|a| a.resource == "Bread");
    assert_eq!(bread.map(|a| a.count), Some(2));
    assert!(report.announcements.is_empty());
}

#[test]
fn event_log_is_written_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.yaml");
    fs::write(&path, KITCHEN).unwrap();
    let log = dir.path().join("logs/events.jsonl");
    let config = EngineConfig {
        event_log: Some(log.clone()),
        ..EngineConfig::default()
    };

    let report = run(&Scenario::load(&path).unwrap(), &config, None).unwrap();

    let events = JsonlEventSink::read_recent(&log, 1000);
    assert!(!events.is_empty());
    let completed = events
        .iter()
        .filter(|e| e.kind == TaskEventKind::Completed)
        .count();
    assert_eq!(completed, report.completed);
    assert!(events
        .iter()
        .any(|e| e.kind == TaskEventKind::Completed && e.task_name == "Kill e2"));
}

#[test]
fn tick_override_caps_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.yaml");
    fs::write(&path, KITCHEN).unwrap();

    let report = run(&Scenario::load(&path).unwrap(), &EngineConfig::default(), Some(2)).unwrap();

    assert_eq!(report.ticks, 2);
    assert!(report.outstanding > 0);
}

#[test]
fn unknown_kill_target_is_rejected() {
    let scenario: Scenario = serde_yaml::from_str(
        "orders:\n  - kill:\n      target: Nobody\n",
    )
    .unwrap();

    let err = scenario.build().err().expect("unknown target");

    assert!(err.to_string().contains("Nobody"));
}
