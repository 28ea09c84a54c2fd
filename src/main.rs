use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use mobreducer::{
    config::MobConfig,
    engine::{EngineBuilder, EngineSettings},
    sim::scenario::ScenarioLoader,
    systems::{CombatSystem, SpawnerSystem, WanderSystem},
    telemetry,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Mob population governor simulation runner")]
struct Cli {
    /// Path to the governor config YAML file
    #[arg(long, default_value = "config/mobreducer.yaml")]
    config: PathBuf,

    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/meadow.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Directory for sweep reports
    #[arg(long, default_value = "reports")]
    report_dir: PathBuf,

    /// Write every n-th sweep report (0 disables)
    #[arg(long, default_value_t = 1)]
    report_interval: u64,

    /// Log filter; overrides the config's logging level
    #[arg(long)]
    log_level: Option<String>,

    /// Validate the config and exit
    #[arg(long)]
    check_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = MobConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    telemetry::init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level));
    if cli.check_config {
        println!("{} is valid", cli.config.display());
        return Ok(());
    }

    let scenario = ScenarioLoader::new(".").load(&cli.scenario)?;
    let mut world = scenario.build_world();
    let ticks = scenario.ticks(cli.ticks);
    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        tick_millis: scenario.tick_millis,
        report_interval_sweeps: cli.report_interval,
        report_dir: cli.report_dir,
    };

    let mut engine = EngineBuilder::new(settings, config)
        .with_system(SpawnerSystem::new(scenario.spawning.clone()))
        .with_system(WanderSystem::new(scenario.behaviour.clone()))
        .with_system(CombatSystem::new(scenario.behaviour.clone()))
        .build()?;

    let mut purged = 0;
    engine.run_with_hook(&mut world, ticks, |report| {
        purged += report.stats.purged;
        info!(
            sweep = report.sweep,
            monsters = report.live_monsters,
            animals = report.live_animals,
            purged = report.stats.purged,
            "sweep"
        );
    })?;

    println!(
        "Scenario '{}' completed for {} ticks: {} sweeps, {} monsters purged, {} mobs alive",
        scenario.name,
        ticks,
        engine.sweeps(),
        purged,
        world.mob_count()
    );
    Ok(())
}
