//! In-memory game world implementing [`Host`], used by the harness binary
//! and the tests.
//!
//! Mobs live in generational slots: freeing a slot bumps its generation, so a
//! handle kept across a despawn or reload stops resolving, the same way a real
//! engine's entity objects go stale when chunks unload.

pub mod scenario;

use std::cell::Cell;

use crate::classify::EntityKind;
use crate::host::{EntityId, EntityView, Host};
use crate::keys::{BlockPos, ChunkKey, ChunkPos};

const MOB_HEALTH: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MobHandle {
    slot: u32,
    generation: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mob {
    pub id: EntityId,
    pub kind: EntityKind,
    pub world: String,
    pub block: BlockPos,
    pub ticks_lived: u64,
    pub tamed: bool,
    pub target: Option<EntityKind>,
    pub health: f64,
    pub drops_suppressed: bool,
}

impl Mob {
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

#[derive(Debug, Clone)]
pub struct SimPlayer {
    pub name: String,
    pub block: BlockPos,
}

struct SimWorldInfo {
    name: String,
    /// Chunks within this square radius of a player are loaded; `None`
    /// keeps every chunk loaded.
    loaded_radius: Option<u32>,
    players: Vec<SimPlayer>,
}

struct Slot {
    generation: u32,
    mob: Option<Mob>,
}

#[derive(Default)]
pub struct SimWorld {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_id: u64,
    worlds: Vec<SimWorldInfo>,
    chunk_enumerations: Cell<u64>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_world(&mut self, name: impl Into<String>, loaded_radius: Option<u32>) {
        self.worlds.push(SimWorldInfo {
            name: name.into(),
            loaded_radius,
            players: Vec::new(),
        });
    }

    /// Drop a world together with every mob in it.
    pub fn remove_world(&mut self, name: &str) {
        self.worlds.retain(|world| world.name != name);
        for handle in self.handles() {
            if self.mob(handle).is_some_and(|mob| mob.world == name) {
                self.despawn(handle);
            }
        }
    }

    pub fn world_names(&self) -> Vec<String> {
        self.worlds.iter().map(|world| world.name.clone()).collect()
    }

    pub fn add_player(&mut self, world: &str, name: impl Into<String>, block: BlockPos) {
        if let Some(info) = self.world_info_mut(world) {
            info.players.push(SimPlayer {
                name: name.into(),
                block,
            });
        }
    }

    pub fn move_player(&mut self, world: &str, name: &str, block: BlockPos) {
        if let Some(info) = self.world_info_mut(world) {
            for player in info.players.iter_mut().filter(|p| p.name == name) {
                player.block = block;
            }
        }
    }

    pub fn clear_players(&mut self, world: &str) {
        if let Some(info) = self.world_info_mut(world) {
            info.players.clear();
        }
    }

    pub fn players(&self, world: &str) -> &[SimPlayer] {
        self.world_info(world)
            .map(|info| info.players.as_slice())
            .unwrap_or(&[])
    }

    /// Horizontal square distance in blocks to the closest player in `world`.
    pub fn nearest_player_distance(&self, world: &str, block: BlockPos) -> Option<u32> {
        self.players(world)
            .iter()
            .map(|player| {
                let dx = player.block.x.abs_diff(block.x);
                let dz = player.block.z.abs_diff(block.z);
                dx.max(dz)
            })
            .min()
    }

    pub fn chunk_loaded(&self, world: &str, chunk: ChunkPos) -> bool {
        let Some(info) = self.world_info(world) else {
            return false;
        };
        match info.loaded_radius {
            None => true,
            Some(radius) => info
                .players
                .iter()
                .any(|player| player.block.chunk().chebyshev(chunk) <= radius),
        }
    }

    pub fn spawn_mob(&mut self, world: &str, kind: EntityKind, block: BlockPos) -> MobHandle {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.insert(Mob {
            id,
            kind,
            world: world.to_string(),
            block,
            ticks_lived: 0,
            tamed: false,
            target: None,
            health: MOB_HEALTH,
            drops_suppressed: false,
        })
    }

    pub fn mob(&self, handle: MobHandle) -> Option<&Mob> {
        self.slots
            .get(handle.slot as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.mob.as_ref())
    }

    pub fn mob_mut(&mut self, handle: MobHandle) -> Option<&mut Mob> {
        self.slots
            .get_mut(handle.slot as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.mob.as_mut())
    }

    pub fn view(&self, handle: MobHandle) -> Option<EntityView<MobHandle>> {
        self.mob(handle).map(|mob| Self::view_of(handle, mob))
    }

    /// Handles of every mob, in slot order.
    pub fn handles(&self) -> Vec<MobHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.mob.is_some())
            .map(|(index, slot)| MobHandle {
                slot: index as u32,
                generation: slot.generation,
            })
            .collect()
    }

    pub fn find(&self, id: EntityId) -> Option<MobHandle> {
        self.handles()
            .into_iter()
            .find(|handle| self.mob(*handle).is_some_and(|mob| mob.id == id))
    }

    pub fn mob_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.mob.is_some()).count()
    }

    /// Unload and reload a mob: same id, new slot. The old handle goes stale.
    pub fn reload_mob(&mut self, handle: MobHandle) -> Option<MobHandle> {
        let mob = self.despawn(handle)?;
        Some(self.insert(mob))
    }

    pub fn kill(&mut self, handle: MobHandle) {
        if let Some(mob) = self.mob_mut(handle) {
            mob.health = 0.0;
        }
    }

    /// Dead mobs still occupying a slot.
    pub fn dead(&self) -> Vec<EntityView<MobHandle>> {
        self.handles()
            .into_iter()
            .filter_map(|handle| self.view(handle))
            .filter(|view| !view.valid)
            .collect()
    }

    pub fn despawn(&mut self, handle: MobHandle) -> Option<Mob> {
        let slot = self
            .slots
            .get_mut(handle.slot as usize)
            .filter(|slot| slot.generation == handle.generation)?;
        let mob = slot.mob.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.slot);
        Some(mob)
    }

    /// Age every living mob by one tick.
    pub fn advance_tick(&mut self) {
        for mob in self.slots.iter_mut().filter_map(|slot| slot.mob.as_mut()) {
            if !mob.is_dead() {
                mob.ticks_lived += 1;
            }
        }
    }

    /// How often a chunk's population has been enumerated.
    pub fn chunk_enumerations(&self) -> u64 {
        self.chunk_enumerations.get()
    }

    fn insert(&mut self, mob: Mob) -> MobHandle {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.mob = Some(mob);
                MobHandle {
                    slot: index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    mob: Some(mob),
                });
                MobHandle {
                    slot: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    fn view_of(handle: MobHandle, mob: &Mob) -> EntityView<MobHandle> {
        let mut view = EntityView::new(mob.id, handle, mob.kind, mob.world.clone(), mob.block);
        view.valid = !mob.is_dead();
        view.ticks_lived = mob.ticks_lived;
        view.tamed = mob.tamed;
        view.target = mob.target;
        view
    }

    fn world_info(&self, name: &str) -> Option<&SimWorldInfo> {
        self.worlds.iter().find(|world| world.name == name)
    }

    fn world_info_mut(&mut self, name: &str) -> Option<&mut SimWorldInfo> {
        self.worlds.iter_mut().find(|world| world.name == name)
    }

    fn loaded_views(&self, mut keep: impl FnMut(&Mob) -> bool) -> Vec<EntityView<MobHandle>> {
        self.handles()
            .into_iter()
            .filter_map(|handle| self.mob(handle).map(|mob| (handle, mob)))
            .filter(|(_, mob)| self.chunk_loaded(&mob.world, mob.block.chunk()) && keep(mob))
            .map(|(handle, mob)| Self::view_of(handle, mob))
            .collect()
    }
}

impl Host for SimWorld {
    type Handle = MobHandle;

    fn worlds(&self) -> Vec<String> {
        self.world_names()
    }

    fn entities(&self, world: &str) -> Vec<EntityView<MobHandle>> {
        self.loaded_views(|mob| mob.world == world)
    }

    fn chunk_entities(&self, chunk: &ChunkKey) -> Vec<EntityView<MobHandle>> {
        self.chunk_enumerations.set(self.chunk_enumerations.get() + 1);
        let pos = chunk.pos();
        self.loaded_views(|mob| mob.world == chunk.world && mob.block.chunk() == pos)
    }

    fn resolve(&self, handle: &MobHandle) -> Option<EntityView<MobHandle>> {
        self.view(*handle)
    }

    fn player_chunks(&self, world: &str) -> Vec<ChunkPos> {
        self.players(world)
            .iter()
            .map(|player| player.block.chunk())
            .collect()
    }

    fn cancel_spawn(&mut self, handle: &MobHandle) {
        self.despawn(*handle);
    }

    fn remove_entity(&mut self, handle: &MobHandle) {
        self.despawn(*handle);
    }

    fn damage_entity(&mut self, handle: &MobHandle, amount: f64) {
        if let Some(mob) = self.mob_mut(*handle) {
            mob.health -= amount;
        }
    }

    fn suppress_drops(&mut self, handle: &MobHandle) {
        if let Some(mob) = self.mob_mut(*handle) {
            mob.drops_suppressed = true;
        }
    }
}
