use std::path::{Path, PathBuf};

use mobreducer::{
    clock::Clock,
    config::MobConfig,
    engine::{EngineBuilder, EngineSettings},
    host::Host,
    report::SweepReport,
    sim::scenario::{Scenario, ScenarioLoader},
    systems::{CombatSystem, SpawnerSystem, WanderSystem},
};
use tempfile::tempdir;

fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

fn scenario() -> Scenario {
    ScenarioLoader::new(manifest_dir())
        .load("scenarios/meadow.yaml")
        .expect("scenario parses")
}

fn config() -> MobConfig {
    MobConfig::load(manifest_dir().join("config/mobreducer.yaml")).expect("config parses")
}

fn build_engine(
    scenario: &Scenario,
    config: MobConfig,
    report_dir: PathBuf,
    report_interval: u64,
) -> EngineBuilder {
    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        tick_millis: scenario.tick_millis,
        report_interval_sweeps: report_interval,
        report_dir,
    };
    EngineBuilder::new(settings, config)
        .with_system(SpawnerSystem::new(scenario.spawning.clone()))
        .with_system(WanderSystem::new(scenario.behaviour.clone()))
        .with_system(CombatSystem::new(scenario.behaviour.clone()))
}

#[test]
fn fixtures_load() {
    let scenario = scenario();
    assert_eq!(scenario.name, "meadow");
    assert_eq!(scenario.worlds.len(), 2);

    let config = config();
    config.validate().expect("shipped config is valid");
    assert_eq!(config, MobConfig::default());
}

#[test]
fn engine_runs_deterministically() {
    let scenario = scenario();
    let ticks = 3_000;
    let mut config = config();
    config.sweep.interval_ticks = 500;
    let dir = tempdir().unwrap();

    let mut runs = Vec::new();
    for _ in 0..2 {
        let mut world = scenario.build_world();
        let mut engine = build_engine(&scenario, config.clone(), dir.path().to_path_buf(), 0)
            .build()
            .unwrap();
        let mut reports = Vec::new();
        engine
            .run_with_hook(&mut world, ticks, |report| reports.push(report.clone()))
            .unwrap();
        runs.push((reports, world.mob_count()));
    }

    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0].0.len(), 6);
}

#[test]
fn engine_calls_hook_once_per_sweep() {
    let scenario = scenario();
    let mut config = config();
    config.sweep.interval_ticks = 100;
    let mut world = scenario.build_world();
    let dir = tempdir().unwrap();
    let mut engine = build_engine(&scenario, config, dir.path().to_path_buf(), 0)
        .build()
        .unwrap();

    let mut seen = Vec::new();
    engine
        .run_with_hook(&mut world, 450, |report| seen.push((report.sweep, report.tick)))
        .unwrap();

    assert_eq!(seen, vec![(1, 100), (2, 200), (3, 300), (4, 400)]);
    assert_eq!(engine.current_tick(), 450);
    assert_eq!(engine.clock().now_millis(), 450 * scenario.tick_millis);
}

#[test]
fn engine_writes_sweep_reports() {
    let scenario = scenario();
    let mut config = config();
    config.sweep.interval_ticks = 200;
    let temp = tempdir().unwrap();
    let report_dir = temp.path().join("reports");
    let mut world = scenario.build_world();
    let mut engine = build_engine(&scenario, config, report_dir.clone(), 2)
        .build()
        .unwrap();
    engine.run(&mut world, 800).unwrap();

    let dir = report_dir.join("meadow");
    assert!(!dir.join("sweep_000001.json").exists());
    let path = dir.join("sweep_000002.json");
    assert!(path.exists(), "expected report {} to exist", path.display());
    assert!(dir.join("sweep_000004.json").exists());

    let report: SweepReport =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(report.tick, 400);
    assert_eq!(report.scenario, "meadow");
    assert!(!report.suspended);
}

#[test]
fn idle_monsters_without_players_are_purged() {
    let scenario = scenario();
    let mut config = config();
    config.monster.idle_age = 30;
    config.sweep.interval_ticks = 200;
    let mut world = scenario.build_world();
    let dir = tempdir().unwrap();
    let mut engine = build_engine(&scenario, config, dir.path().to_path_buf(), 0)
        .build()
        .unwrap();

    assert_eq!(world.entities("meadow_nether").len(), 3);
    engine.run(&mut world, 1_400).unwrap();
    // 70 s of game time, no players in the nether
    assert!(world.entities("meadow_nether").is_empty());
}

#[test]
fn invalid_config_fails_engine_build() {
    let scenario = scenario();
    let mut config = config();
    config.sweep.interval_ticks = 0;
    let dir = tempdir().unwrap();
    assert!(build_engine(&scenario, config, dir.path().to_path_buf(), 0)
        .build()
        .is_err());
}
