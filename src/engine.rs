//! Tick loop driving the simulated world through the listener.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::{
    classify::MobCategory,
    clock::{Clock, ManualClock},
    config::{ConfigError, MobConfig},
    listener::EntityListener,
    report::{ReportWriter, SweepReport, HOTSPOT_THRESHOLD},
    rng::{RngManager, SystemRng},
    sim::SimWorld,
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub tick_millis: u64,
    /// Write every n-th sweep report; 0 disables report files.
    pub report_interval_sweeps: u64,
    pub report_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    config: MobConfig,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings, config: MobConfig) -> Self {
        Self {
            settings,
            config,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> Result<Engine, ConfigError> {
        let clock = ManualClock::new(0);
        let listener = EntityListener::new(self.config, Box::new(clock.clone()))?;
        Ok(Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            listener,
            clock,
            report_writer: ReportWriter::new(
                &self.settings.report_dir,
                self.settings.report_interval_sweeps,
            ),
            settings: self.settings,
            tick: 0,
            sweeps: 0,
        })
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    listener: EntityListener<SimWorld>,
    clock: ManualClock,
    report_writer: ReportWriter,
    settings: EngineSettings,
    tick: u64,
    sweeps: u64,
}

impl Engine {
    pub fn run(&mut self, world: &mut SimWorld, ticks: u64) -> Result<()> {
        self.run_with_hook(world, ticks, |_| {})
    }

    /// Run `ticks` ticks, handing every sweep report to `hook`.
    pub fn run_with_hook<F>(&mut self, world: &mut SimWorld, ticks: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(&SweepReport),
    {
        for _ in 0..ticks {
            self.tick += 1;
            self.clock.advance(self.settings.tick_millis);
            let ctx = SystemContext {
                tick: self.tick,
                now_millis: self.clock.now_millis(),
                scenario_name: &self.settings.scenario_name,
            };
            for system in &mut self.systems {
                let mut rng_stream = self.rng.stream(system.name());
                system.run(&ctx, world, &mut self.listener, &mut rng_stream)?;
            }
            self.reap(world);
            world.advance_tick();

            let interval = self.listener.manager().config().sweep.interval_ticks;
            if self.tick % interval == 0 {
                let report = self.sweep(world);
                self.report_writer.maybe_write(&report)?;
                hook(&report);
            }
        }
        Ok(())
    }

    /// Run one sweep right now and describe the result.
    pub fn sweep(&mut self, world: &mut SimWorld) -> SweepReport {
        let stats = self.listener.sweep(world);
        self.sweeps += 1;
        let (mut live_monsters, mut live_animals) = (0, 0);
        for view in world.handles().into_iter().filter_map(|h| world.view(h)) {
            match view.category {
                MobCategory::Monster => live_monsters += 1,
                MobCategory::Animal => live_animals += 1,
                _ => {}
            }
        }
        let manager = self.listener.manager();
        SweepReport {
            scenario: self.settings.scenario_name.clone(),
            sweep: self.sweeps,
            tick: self.tick,
            clock_millis: self.clock.now_millis(),
            stats,
            live_monsters,
            live_animals,
            tracked_entities: manager.tracked_entities(),
            tracked_chunks: manager.tracked_chunks(),
            suspended: manager.is_suspended(),
            hotspots: self.listener.grinder().hotspots(HOTSPOT_THRESHOLD),
        }
    }

    /// Deliver death events for everything that died this tick, then
    /// remove the bodies.
    fn reap(&mut self, world: &mut SimWorld) {
        for body in world.dead() {
            let outcome = self.listener.on_death(world, &body);
            debug!(
                id = %body.id,
                kind = ?body.kind,
                drops_suppressed = outcome.drops_suppressed,
                "mob died"
            );
            world.despawn(body.handle);
        }
    }

    pub fn reload(&mut self, config: MobConfig) -> Result<(), ConfigError> {
        self.listener.reload(config)
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn listener(&self) -> &EntityListener<SimWorld> {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut EntityListener<SimWorld> {
        &mut self.listener
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }
}

pub struct SystemContext<'a> {
    pub tick: u64,
    pub now_millis: u64,
    pub scenario_name: &'a str,
}

/// One step of simulated behaviour, run once per tick in registration order.
pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut SimWorld,
        listener: &mut EntityListener<SimWorld>,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
