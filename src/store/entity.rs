use tracing::trace;

use crate::bounded::BoundedMap;
use crate::host::{EntityId, EntityView, Host};
use crate::keys::ChunkKey;

/// Metadata kept about one tracked entity, independent of the engine object.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord<H> {
    id: EntityId,
    world: String,
    handle: Option<H>,
    last_interaction: u64,
    current_chunk: ChunkKey,
    spawn_chunk: ChunkKey,
    player_damaged: bool,
}

impl<H: Clone> EntityRecord<H> {
    fn new(view: &EntityView<H>, now: u64) -> Self {
        let chunk = view.chunk_key();
        Self {
            id: view.id,
            world: view.world.clone(),
            handle: Some(view.handle.clone()),
            last_interaction: now,
            current_chunk: chunk.clone(),
            spawn_chunk: chunk,
            player_damaged: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn world(&self) -> &str {
        &self.world
    }

    pub fn last_interaction(&self) -> u64 {
        self.last_interaction
    }

    pub fn current_chunk(&self) -> &ChunkKey {
        &self.current_chunk
    }

    pub fn spawn_chunk(&self) -> &ChunkKey {
        &self.spawn_chunk
    }

    pub fn is_player_damaged(&self) -> bool {
        self.player_damaged
    }

    /// Find the live entity this record describes.
    ///
    /// The cached handle is tried first. When it is stale the last known
    /// world is scanned for the id and the handle re-cached. `None` means the
    /// entity (or its whole world) is gone.
    pub fn resolve<T>(&mut self, host: &T) -> Option<EntityView<H>>
    where
        T: Host<Handle = H>,
    {
        if let Some(handle) = &self.handle {
            if let Some(view) = host.resolve(handle).filter(|view| view.id == self.id) {
                return Some(view);
            }
        }

        let found = host
            .entities(&self.world)
            .into_iter()
            .find(|view| view.id == self.id);
        match &found {
            Some(view) => {
                trace!(id = %self.id, "re-resolved stale entity handle");
                self.handle = Some(view.handle.clone());
                self.world = view.world.clone();
                self.current_chunk = view.chunk_key();
            }
            None => self.handle = None,
        }
        found
    }
}

/// Create-on-miss store of [`EntityRecord`]s with a hard size cap.
pub struct EntityStore<H> {
    records: BoundedMap<EntityId, EntityRecord<H>>,
}

impl<H: Clone> EntityStore<H> {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: BoundedMap::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    /// Resize in place, keeping the most recently used records.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.records.set_capacity(capacity);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn evictions(&self) -> u64 {
        self.records.evictions()
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityRecord<H>> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord<H>> {
        self.records.get_mut(&id)
    }

    /// Existing record for `view`, or a fresh one stamped with `now`.
    pub fn get_or_create(&mut self, view: &EntityView<H>, now: u64) -> &mut EntityRecord<H> {
        self.records
            .get_or_insert_with(view.id, || EntityRecord::new(view, now))
    }

    pub fn interact(&mut self, view: &EntityView<H>, now: u64) {
        self.get_or_create(view, now).last_interaction = now;
    }

    pub fn mark_player_damaged(&mut self, view: &EntityView<H>, now: u64) {
        self.get_or_create(view, now).player_damaged = true;
    }

    /// Returns true when the entity moved to another chunk.
    pub fn update_position(&mut self, view: &EntityView<H>, now: u64) -> bool {
        let record = self.get_or_create(view, now);
        record.handle = Some(view.handle.clone());
        let chunk = view.chunk_key();
        if record.current_chunk == chunk {
            return false;
        }
        trace!(id = %view.id, from = %record.current_chunk, to = %chunk, "entity changed chunk");
        record.world = view.world.clone();
        record.current_chunk = chunk;
        true
    }

    pub fn remove(&mut self, id: EntityId) -> Option<EntityRecord<H>> {
        self.records.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::EntityKind;
    use crate::keys::BlockPos;

    fn zombie(id: u64, x: i32, z: i32) -> EntityView<u32> {
        EntityView::new(
            EntityId::new(id),
            id as u32,
            EntityKind::Zombie,
            "world",
            BlockPos::new(x, 64, z),
        )
    }

    #[test]
    fn lookup_twice_keeps_first_timestamp() {
        let mut store = EntityStore::new(16);
        let view = zombie(1, 0, 0);
        let first = store.get_or_create(&view, 100).clone();
        let second = store.get_or_create(&view, 900).clone();
        assert_eq!(first, second);
        assert_eq!(second.last_interaction(), 100);
    }

    #[test]
    fn new_record_starts_in_spawn_chunk() {
        let mut store = EntityStore::new(16);
        let record = store.get_or_create(&zombie(2, 40, -5), 0);
        assert_eq!(record.current_chunk(), &ChunkKey::new("world", 2, -1));
        assert_eq!(record.spawn_chunk(), record.current_chunk());
        assert!(!record.is_player_damaged());
    }

    #[test]
    fn update_position_tracks_moves_but_not_spawn() {
        let mut store = EntityStore::new(16);
        let view = zombie(3, 0, 0);
        store.get_or_create(&view, 0);
        assert!(!store.update_position(&view, 10));
        assert!(store.update_position(&zombie(3, 33, 0), 20));

        let record = store.get(EntityId::new(3)).unwrap();
        assert_eq!(record.current_chunk(), &ChunkKey::new("world", 2, 0));
        assert_eq!(record.spawn_chunk(), &ChunkKey::new("world", 0, 0));
    }

    #[test]
    fn player_damage_is_sticky() {
        let mut store = EntityStore::new(16);
        let view = zombie(4, 0, 0);
        store.mark_player_damaged(&view, 0);
        store.mark_player_damaged(&view, 5);
        store.interact(&view, 50);
        let record = store.get(view.id).unwrap();
        assert!(record.is_player_damaged());
        assert_eq!(record.last_interaction(), 50);
    }

    #[test]
    fn store_is_capped() {
        let mut store = EntityStore::new(2);
        for id in 0..5 {
            store.get_or_create(&zombie(id, 0, 0), id);
        }
        assert_eq!(store.len(), 2);
        assert_eq!(store.evictions(), 3);
        assert!(store.get(EntityId::new(4)).is_some());
        assert!(store.get(EntityId::new(0)).is_none());
    }
}
