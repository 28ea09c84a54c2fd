use crate::bounded::BoundedMap;
use crate::classify::MobCategory;
use crate::host::{EntityView, Host};
use crate::keys::ChunkKey;

/// How long a chunk's animal list may be reused. One engine tick is 50 ms, so
/// a cached list is never consulted across more than one tick boundary.
pub const ANIMAL_CACHE_WINDOW_MS: u64 = 50;

/// Metadata for one chunk, addressed by key rather than by engine object.
pub struct ChunkRecord<H> {
    key: ChunkKey,
    animals: Vec<EntityView<H>>,
    cached_at: Option<u64>,
}

impl<H: Clone> ChunkRecord<H> {
    fn new(key: ChunkKey) -> Self {
        Self {
            key,
            animals: Vec::new(),
            cached_at: None,
        }
    }

    pub fn key(&self) -> &ChunkKey {
        &self.key
    }

    pub fn cached_at(&self) -> Option<u64> {
        self.cached_at
    }

    fn is_fresh(&self, now: u64) -> bool {
        match self.cached_at {
            Some(at) => now < at + ANIMAL_CACHE_WINDOW_MS,
            None => false,
        }
    }

    /// Animals currently in the chunk, re-enumerated at most once per window.
    pub fn animals<T>(&mut self, host: &T, now: u64) -> &[EntityView<H>]
    where
        T: Host<Handle = H>,
    {
        if !self.is_fresh(now) {
            self.animals = host
                .chunk_entities(&self.key)
                .into_iter()
                .filter(|view| view.category == MobCategory::Animal)
                .collect();
            self.cached_at = Some(now);
        }
        &self.animals
    }
}

pub struct ChunkStore<H> {
    records: BoundedMap<ChunkKey, ChunkRecord<H>>,
}

impl<H: Clone> ChunkStore<H> {
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

    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.records.contains_key(key)
    }

    pub fn get_or_create(&mut self, key: &ChunkKey) -> &mut ChunkRecord<H> {
        self.records
            .get_or_insert_with(key.clone(), || ChunkRecord::new(key.clone()))
    }

    pub fn animals_in<T>(&mut self, key: &ChunkKey, host: &T, now: u64) -> &[EntityView<H>]
    where
        T: Host<Handle = H>,
    {
        self.get_or_create(key).animals(host, now)
    }

    /// Best-effort eviction; a missing key is fine.
    pub fn remove(&mut self, key: &ChunkKey) {
        self.records.remove(key);
    }
}
