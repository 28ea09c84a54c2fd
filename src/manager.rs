//! Admission and idle-purge decisions.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::classify::MobCategory;
use crate::clock::Clock;
use crate::config::{ConfigError, MobConfig};
use crate::host::{EntityId, EntityView, Host};
use crate::keys::ChunkKey;
use crate::store::{ChunkStore, EntityRecord, EntityStore};

/// Damage applied to the animal evicted to make room for a newcomer.
pub const LETHAL_DAMAGE: f64 = 1000.0;

/// What one sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepStats {
    pub examined: usize,
    pub invalid: usize,
    pub purged: usize,
    pub refreshed: usize,
    pub spawned_since_last: u32,
}

/// Tracks mobs and decides which may spawn and which are purged.
///
/// Must only be driven from the host's game-logic thread: event callbacks and
/// the periodic sweep. Nothing here locks.
pub struct MobManager<H: Host> {
    config: MobConfig,
    clock: Box<dyn Clock>,
    entities: EntityStore<H::Handle>,
    chunks: ChunkStore<H::Handle>,
    spawn_counter: u32,
    suspended: bool,
}

impl<H: Host> MobManager<H> {
    /// Fails without building anything when the config is invalid.
    pub fn new(config: MobConfig, clock: Box<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            entities: EntityStore::new(config.limits.max_tracked_entities),
            chunks: ChunkStore::new(config.limits.max_tracked_chunks),
            config,
            clock,
            spawn_counter: 0,
            suspended: false,
        })
    }

    pub fn config(&self) -> &MobConfig {
        &self.config
    }

    /// Swap in a new config. An invalid one suspends every decision until a
    /// valid config arrives. Tracked records are kept either way; new store
    /// limits only evict the least recently used records.
    pub fn reload(&mut self, config: MobConfig) -> Result<(), ConfigError> {
        if let Err(err) = config.validate() {
            self.suspend(&err);
            return Err(err);
        }
        let limits = &config.limits;
        if limits.max_tracked_entities != self.entities.capacity()
            || limits.max_tracked_chunks != self.chunks.capacity()
        {
            debug!(
                entities = limits.max_tracked_entities,
                chunks = limits.max_tracked_chunks,
                "resizing record stores"
            );
            self.entities.set_capacity(limits.max_tracked_entities);
            self.chunks.set_capacity(limits.max_tracked_chunks);
        }
        self.config = config;
        if self.suspended {
            info!("config reloaded; mob manager resumed");
        }
        self.suspended = false;
        Ok(())
    }

    /// Reload from a YAML file. A file that cannot be read or parsed
    /// suspends the manager just like an invalid config.
    pub fn reload_from(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        match MobConfig::load(path) {
            Ok(config) => self.reload(config),
            Err(err) => {
                self.suspend(&err);
                Err(err)
            }
        }
    }

    fn suspend(&mut self, err: &ConfigError) {
        error!(error = %err, "config reload rejected; mob manager suspended");
        self.suspended = true;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn now(&self) -> u64 {
        self.clock.now_millis()
    }

    pub fn tracked_entities(&self) -> usize {
        self.entities.len()
    }

    pub fn tracked_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn spawn_counter(&self) -> u32 {
        self.spawn_counter
    }

    pub fn record(&self, id: EntityId) -> Option<&EntityRecord<H::Handle>> {
        self.entities.get(id)
    }

    /// Record for `entity`, created with the current time if missing.
    pub fn entity_record(&mut self, entity: &EntityView<H::Handle>) -> &EntityRecord<H::Handle> {
        let now = self.now();
        self.entities.get_or_create(entity, now)
    }

    /// Re-resolve a tracked entity through the host.
    pub fn tracked(&mut self, id: EntityId, host: &H) -> Option<EntityView<H::Handle>> {
        self.entities.get_mut(id)?.resolve(host)
    }

    pub fn chunk_is_tracked(&self, key: &ChunkKey) -> bool {
        self.chunks.contains(key)
    }

    /// Admission check for a spawning entity. Only animals are limited, and
    /// only while the kill-oldest policy is off.
    pub fn can_spawn(&mut self, host: &H, candidate: &EntityView<H::Handle>) -> bool {
        if self.suspended {
            return true;
        }
        if candidate.category == MobCategory::Animal
            && !self.config.animals.kill_oldest_on_spawn
            && self.segment_exceeded(host, candidate)
        {
            debug!(
                id = %candidate.id,
                kind = ?candidate.kind,
                chunk = %candidate.chunk_key(),
                "refusing spawn: animal segment is full"
            );
            return false;
        }
        true
    }

    /// Bookkeeping after an allowed spawn, counted once per spawn: in a full
    /// segment with the kill-oldest policy on, the oldest eligible resident
    /// animal dies.
    pub fn entity_spawned(&mut self, host: &mut H, entity: &EntityView<H::Handle>) {
        self.spawn_counter += 1;
        if self.suspended
            || entity.category != MobCategory::Animal
            || !self.config.animals.kill_oldest_on_spawn
            || !self.segment_exceeded(host, entity)
        {
            return;
        }

        let ignore_tamed = self.config.animals.ignore_tamed;
        let Some(victim) = self.oldest_segment_animal(host, entity, ignore_tamed) else {
            debug!(id = %entity.id, "animal segment full but no eligible victim");
            return;
        };
        debug!(
            victim = %victim.id,
            ticks_lived = victim.ticks_lived,
            newcomer = %entity.id,
            "killing oldest animal in segment"
        );
        let now = self.now();
        // counts as a player kill so the victim still drops its items
        self.entities.mark_player_damaged(&victim, now);
        host.damage_entity(&victim.handle, LETHAL_DAMAGE);
    }

    pub fn interact(&mut self, entity: &EntityView<H::Handle>) {
        let now = self.now();
        self.entities.interact(entity, now);
    }

    pub fn player_damage(&mut self, entity: &EntityView<H::Handle>) {
        let now = self.now();
        self.entities.mark_player_damaged(entity, now);
    }

    pub fn update_position(&mut self, entity: &EntityView<H::Handle>) {
        let now = self.now();
        self.entities.update_position(entity, now);
    }

    /// Drop the entity's record and the record of its last known chunk.
    pub fn cleanup_entity(&mut self, entity: &EntityView<H::Handle>) {
        let chunk = match self.entities.remove(entity.id) {
            Some(record) => record.current_chunk().clone(),
            None => entity.chunk_key(),
        };
        self.chunks.remove(&chunk);
    }

    /// Animals in the (2s+1)x(2s+1) chunk square around `subject`. The
    /// subject always counts once, even if the host has not placed it yet.
    pub fn segment_animal_count(&mut self, host: &H, subject: &EntityView<H::Handle>) -> usize {
        let now = self.now();
        let center = subject.chunk_key();
        let radius = self.config.animals.chunk_segment_size;
        let mut count = 0;
        let mut subject_seen = false;
        for pos in center.pos().square(radius) {
            let animals = self.chunks.animals_in(&center.with_pos(pos), host, now);
            subject_seen |= animals.iter().any(|animal| animal.id == subject.id);
            count += animals.len();
        }
        if !subject_seen && subject.category == MobCategory::Animal {
            count += 1;
        }
        count
    }

    fn segment_exceeded(&mut self, host: &H, subject: &EntityView<H::Handle>) -> bool {
        let max = self.config.animals.max_per_segment as usize;
        self.segment_animal_count(host, subject) > max
    }

    /// Oldest live animal in the segment around `newcomer`, excluding the
    /// newcomer itself. Ties go to the first one seen.
    pub fn oldest_segment_animal(
        &mut self,
        host: &H,
        newcomer: &EntityView<H::Handle>,
        ignore_tamed: bool,
    ) -> Option<EntityView<H::Handle>> {
        let now = self.now();
        let center = newcomer.chunk_key();
        let radius = self.config.animals.chunk_segment_size;
        let mut oldest: Option<EntityView<H::Handle>> = None;
        for pos in center.pos().square(radius) {
            let animals = self.chunks.animals_in(&center.with_pos(pos), host, now);
            for cached in animals {
                if cached.id == newcomer.id {
                    continue;
                }
                // the cache may be up to one window old
                let Some(live) = host.resolve(&cached.handle).filter(|live| live.valid) else {
                    continue;
                };
                if ignore_tamed && live.tamed {
                    continue;
                }
                let older = oldest
                    .as_ref()
                    .map_or(true, |current| live.ticks_lived > current.ticks_lived);
                if older {
                    oldest = Some(live);
                }
            }
        }
        oldest
    }

    fn player_nearby(&self, host: &H, entity: &EntityView<H::Handle>) -> bool {
        if !entity.valid {
            return false;
        }
        let chunk = entity.chunk();
        let radius = self.config.monster.player_chunk_radius;
        host.player_chunks(&entity.world)
            .into_iter()
            .any(|player| player.chebyshev(chunk) <= radius)
    }

    /// True when a monster has been idle past the configured age with no
    /// player target and no player within the configured chunk radius.
    pub fn should_purge(&mut self, host: &H, entity: &EntityView<H::Handle>) -> bool {
        if self.suspended || entity.category != MobCategory::Monster {
            return false;
        }

        let now = self.now();
        let last = self.entities.get_or_create(entity, now).last_interaction();
        let idle_for = now.saturating_sub(last);
        let (purge, reason) = if idle_for <= self.config.idle_age_millis() {
            (false, "entity is not idle")
        } else if entity.is_targeting_player() {
            (false, "entity is targeting a player")
        } else if self.player_nearby(host, entity) {
            (false, "player is nearby")
        } else {
            (true, "idle")
        };
        debug!(id = %entity.id, kind = ?entity.kind, idle_for, purge, reason, "purge check");
        purge
    }

    /// Periodic sweep over every loaded entity of every world.
    pub fn run(&mut self, host: &mut H) -> SweepStats {
        let mut stats = SweepStats {
            spawned_since_last: self.spawn_counter,
            ..SweepStats::default()
        };
        if self.suspended {
            warn!("skipping sweep: mob manager is suspended by an invalid config");
            self.spawn_counter = 0;
            return stats;
        }

        for world in host.worlds() {
            // owned snapshot: removals below cannot disturb the walk
            for entity in host.entities(&world) {
                stats.examined += 1;
                if !entity.valid {
                    self.cleanup_entity(&entity);
                    stats.invalid += 1;
                } else if self.should_purge(host, &entity) {
                    host.remove_entity(&entity.handle);
                    self.cleanup_entity(&entity);
                    stats.purged += 1;
                } else {
                    self.update_position(&entity);
                    stats.refreshed += 1;
                }
            }
        }

        info!(
            examined = stats.examined,
            purged = stats.purged,
            invalid = stats.invalid,
            spawned = stats.spawned_since_last,
            tracked = self.entities.len(),
            "sweep complete"
        );
        self.spawn_counter = 0;
        stats
    }
}
