//! Boundary between the governor and the game engine that hosts it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::{classify, EntityKind, MobCategory};
use crate::keys::{BlockKey, BlockPos, ChunkKey, ChunkPos};

/// Stable entity identity. Never reused within a run, unlike engine handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owned snapshot of a live entity as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView<H> {
    pub id: EntityId,
    pub handle: H,
    pub kind: EntityKind,
    pub category: MobCategory,
    pub world: String,
    pub block: BlockPos,
    /// False once the entity is dead or removed by the engine.
    pub valid: bool,
    pub ticks_lived: u64,
    pub tamed: bool,
    pub target: Option<EntityKind>,
}

impl<H> EntityView<H> {
    pub fn new(
        id: EntityId,
        handle: H,
        kind: EntityKind,
        world: impl Into<String>,
        block: BlockPos,
    ) -> Self {
        Self {
            id,
            handle,
            kind,
            category: classify(kind),
            world: world.into(),
            block,
            valid: true,
            ticks_lived: 0,
            tamed: false,
            target: None,
        }
    }

    pub fn chunk(&self) -> ChunkPos {
        self.block.chunk()
    }

    pub fn chunk_key(&self) -> ChunkKey {
        let pos = self.chunk();
        ChunkKey::new(self.world.clone(), pos.x, pos.z)
    }

    pub fn block_key(&self) -> BlockKey {
        BlockKey::at(self.world.clone(), self.block)
    }

    pub fn is_targeting_player(&self) -> bool {
        self.target.is_some_and(EntityKind::is_player)
    }
}

/// Calls the governor makes into the engine.
///
/// Implementations are only ever driven from the engine's game-logic thread.
/// Enumeration methods return owned snapshots so callers may mutate the host
/// while walking the result.
pub trait Host {
    /// Cheap, non-owning reference to a live entity. It may go stale when the
    /// entity is unloaded or removed.
    type Handle: Clone + fmt::Debug;

    fn worlds(&self) -> Vec<String>;

    /// Loaded entities of a world. Unknown worlds yield nothing.
    fn entities(&self, world: &str) -> Vec<EntityView<Self::Handle>>;

    /// Entities inside one chunk; an unloaded chunk yields nothing.
    fn chunk_entities(&self, chunk: &ChunkKey) -> Vec<EntityView<Self::Handle>>;

    /// `None` when the handle no longer points at a live entity.
    fn resolve(&self, handle: &Self::Handle) -> Option<EntityView<Self::Handle>>;

    fn player_chunks(&self, world: &str) -> Vec<ChunkPos>;

    fn cancel_spawn(&mut self, handle: &Self::Handle);

    fn remove_entity(&mut self, handle: &Self::Handle);

    fn damage_entity(&mut self, handle: &Self::Handle, amount: f64);

    /// Clear the drops and zero the experience of a dying entity.
    fn suppress_drops(&mut self, handle: &Self::Handle);
}
