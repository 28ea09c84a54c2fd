//! Entry points for engine events.
//!
//! The listener turns raw engine notifications into manager calls and issues
//! the resulting outbound actions (cancel, drop suppression) on the host.

use std::path::Path;

use tracing::debug;

use crate::classify::EntityKind;
use crate::clock::Clock;
use crate::config::{ConfigError, MobConfig};
use crate::grinder::GrinderTracker;
use crate::host::{EntityView, Host};
use crate::manager::{MobManager, SweepStats};

/// Whatever dealt damage to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damager {
    Player,
    /// Arrow or other projectile; `shooter` is who fired it, if known.
    Projectile { shooter: Option<EntityKind> },
    Entity(EntityKind),
}

impl Damager {
    pub fn is_player(self) -> bool {
        match self {
            Damager::Player => true,
            Damager::Projectile { shooter } => shooter.is_some_and(EntityKind::is_player),
            Damager::Entity(kind) => kind.is_player(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnDecision {
    Allowed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeathOutcome {
    pub drops_suppressed: bool,
}

pub struct EntityListener<H: Host> {
    manager: MobManager<H>,
    grinder: GrinderTracker,
}

impl<H: Host> EntityListener<H> {
    pub fn new(config: MobConfig, clock: Box<dyn Clock>) -> Result<Self, ConfigError> {
        let grinder = GrinderTracker::new(config.limits.grinder_history);
        Ok(Self {
            manager: MobManager::new(config, clock)?,
            grinder,
        })
    }

    pub fn manager(&self) -> &MobManager<H> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut MobManager<H> {
        &mut self.manager
    }

    pub fn grinder(&self) -> &GrinderTracker {
        &self.grinder
    }

    pub fn reload(&mut self, config: MobConfig) -> Result<(), ConfigError> {
        self.manager.reload(config)?;
        self.resize_grinder();
        Ok(())
    }

    pub fn reload_from(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.manager.reload_from(path)?;
        self.resize_grinder();
        Ok(())
    }

    fn resize_grinder(&mut self) {
        self.grinder
            .set_history(self.manager.config().limits.grinder_history);
    }

    pub fn sweep(&mut self, host: &mut H) -> SweepStats {
        self.manager.run(host)
    }

    /// A creature is about to spawn. Spawning counts as an interaction so
    /// that entities reloaded with an old chunk are not purged at once.
    pub fn on_creature_spawn(
        &mut self,
        host: &mut H,
        candidate: &EntityView<H::Handle>,
    ) -> SpawnDecision {
        if !self.manager.can_spawn(host, candidate) {
            host.cancel_spawn(&candidate.handle);
            return SpawnDecision::Cancelled;
        }
        self.manager.update_position(candidate);
        self.manager.interact(candidate);
        self.grinder.record_spawn(candidate);
        SpawnDecision::Allowed
    }

    /// The spawn went through and the entity is in the world.
    pub fn on_spawned(&mut self, host: &mut H, entity: &EntityView<H::Handle>) {
        self.manager.entity_spawned(host, entity);
    }

    pub fn on_damaged_by(&mut self, entity: &EntityView<H::Handle>, damager: Damager) {
        if entity.kind.is_player() {
            return;
        }
        self.manager.interact(entity);
        if damager.is_player() {
            self.manager.player_damage(entity);
        }
    }

    pub fn on_splash(&mut self, entity: &EntityView<H::Handle>, thrower: Option<EntityKind>) {
        if entity.kind.is_player() {
            return;
        }
        self.manager.interact(entity);
        if thrower.is_some_and(EntityKind::is_player) {
            self.manager.player_damage(entity);
        }
    }

    pub fn on_target(&mut self, entity: &EntityView<H::Handle>, target: Option<EntityKind>) {
        if entity.kind.is_player() {
            return;
        }
        if target.is_some_and(EntityKind::is_player) {
            self.manager.interact(entity);
        }
    }

    /// Entities never hurt by a player drop nothing when the config asks for
    /// it. The dead entity's records are dropped afterwards.
    pub fn on_death(&mut self, host: &mut H, entity: &EntityView<H::Handle>) -> DeathOutcome {
        if entity.kind.is_player() {
            return DeathOutcome::default();
        }
        let required = self.manager.config().player_damage_required_for_drops;
        let player_damaged = self.manager.entity_record(entity).is_player_damaged();
        let mut outcome = DeathOutcome::default();
        if required && !player_damaged {
            debug!(id = %entity.id, kind = ?entity.kind, "suppressing drops");
            host.suppress_drops(&entity.handle);
            outcome.drops_suppressed = true;
        }
        self.grinder.record_death(entity);
        self.manager.cleanup_entity(entity);
        outcome
    }
}
