//! Heuristics for spotting mob grinders: places where monsters are farmed
//! and die in unusual numbers.

use serde::{Deserialize, Serialize};

use crate::bounded::BoundedMap;
use crate::classify::MobCategory;
use crate::host::{EntityId, EntityView};
use crate::keys::{BlockKey, ChunkKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    pub chunk: String,
    pub deaths: u32,
}

/// Monster spawn and death counters, each capped at `history` entries.
pub struct GrinderTracker {
    spawn_chunks: BoundedMap<EntityId, ChunkKey>,
    chunk_deaths: BoundedMap<ChunkKey, u32>,
    block_deaths: BoundedMap<BlockKey, u32>,
}

impl GrinderTracker {
    pub fn new(history: usize) -> Self {
        Self {
            spawn_chunks: BoundedMap::new(history),
            chunk_deaths: BoundedMap::new(history),
            block_deaths: BoundedMap::new(history),
        }
    }

    /// Apply a new `history` cap to every counter, keeping the most
    /// recently touched entries.
    pub fn set_history(&mut self, history: usize) {
        self.spawn_chunks.set_capacity(history);
        self.chunk_deaths.set_capacity(history);
        self.block_deaths.set_capacity(history);
    }

    pub fn record_spawn<H>(&mut self, entity: &EntityView<H>) {
        if entity.category != MobCategory::Monster {
            return;
        }
        self.spawn_chunks.insert(entity.id, entity.chunk_key());
    }

    pub fn record_death<H>(&mut self, entity: &EntityView<H>) {
        if entity.category != MobCategory::Monster {
            return;
        }
        *self.chunk_deaths.get_or_insert_with(entity.chunk_key(), || 0) += 1;
        *self.block_deaths.get_or_insert_with(entity.block_key(), || 0) += 1;
        self.spawn_chunks.remove(&entity.id);
    }

    pub fn spawn_chunk(&self, id: EntityId) -> Option<&ChunkKey> {
        self.spawn_chunks.get(&id)
    }

    pub fn deaths_in_chunk(&self, key: &ChunkKey) -> u32 {
        self.chunk_deaths.get(key).copied().unwrap_or(0)
    }

    pub fn deaths_at(&self, key: &BlockKey) -> u32 {
        self.block_deaths.get(key).copied().unwrap_or(0)
    }

    /// Chunks with at least `threshold` recorded deaths, busiest first.
    pub fn hotspots(&self, threshold: u32) -> Vec<Hotspot> {
        let mut spots: Vec<Hotspot> = self
            .chunk_deaths
            .iter()
            .filter(|(_, deaths)| **deaths >= threshold)
            .map(|(chunk, deaths)| Hotspot {
                chunk: chunk.to_string(),
                deaths: *deaths,
            })
            .collect();
        spots.sort_by(|a, b| b.deaths.cmp(&a.deaths).then_with(|| a.chunk.cmp(&b.chunk)));
        spots
    }
}
