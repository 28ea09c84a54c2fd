//! Stable keys for chunks and block positions.
//!
//! Keys are built from world names and integer coordinates only, so two keys
//! for the same place compare equal no matter which (possibly reloaded) engine
//! object they were derived from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Edge length of a chunk in blocks.
pub const CHUNK_SIZE: i32 = 16;

/// Chunk coordinates inside a single world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Square distance in chunks.
    pub fn chebyshev(self, other: ChunkPos) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dz = self.z.abs_diff(other.z);
        dx.max(dz)
    }

    /// Every chunk of the (2r+1)x(2r+1) square centred on `self`, x-major.
    pub fn square(self, radius: u32) -> impl Iterator<Item = ChunkPos> {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let (cx, cz) = (self.x, self.z);
        (cx.saturating_sub(r)..=cx.saturating_add(r)).flat_map(move |x| {
            (cz.saturating_sub(r)..=cz.saturating_add(r)).map(move |z| ChunkPos { x, z })
        })
    }
}

/// Integer block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn chunk(self) -> ChunkPos {
        ChunkPos {
            x: self.x >> 4,
            z: self.z >> 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkKey {
    pub world: String,
    pub x: i32,
    pub z: i32,
}

impl ChunkKey {
    pub fn new(world: impl Into<String>, x: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            z,
        }
    }

    /// Key of the chunk holding the given block column.
    pub fn containing(world: impl Into<String>, block_x: i32, block_z: i32) -> Self {
        Self::new(world, block_x >> 4, block_z >> 4)
    }

    pub fn pos(&self) -> ChunkPos {
        ChunkPos::new(self.x, self.z)
    }

    pub fn with_pos(&self, pos: ChunkPos) -> Self {
        Self::new(self.world.clone(), pos.x, pos.z)
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.world, self.x, self.z)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockKey {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockKey {
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    pub fn at(world: impl Into<String>, pos: BlockPos) -> Self {
        Self::new(world, pos.x, pos.y, pos.z)
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.world, self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_of_negative_blocks_floors() {
        assert_eq!(BlockPos::new(-1, 64, -16).chunk(), ChunkPos::new(-1, -1));
        assert_eq!(BlockPos::new(-17, 64, 15).chunk(), ChunkPos::new(-2, 0));
        assert_eq!(BlockPos::new(31, 0, 32).chunk(), ChunkPos::new(1, 2));
    }

    #[test]
    fn keys_for_same_place_are_equal() {
        let a = ChunkKey::containing("world", 17, -3);
        let b = ChunkKey::new(String::from("world"), 1, -1);
        assert_eq!(a, b);
        assert_ne!(a, ChunkKey::new("world_nether", 1, -1));
        assert_eq!(a.to_string(), "world,1,-1");
    }

    #[test]
    fn block_key_display() {
        let key = BlockKey::at("w", BlockPos::new(3, 70, -9));
        assert_eq!(key.to_string(), "w,3,70,-9");
    }

    #[test]
    fn chebyshev_distance() {
        let origin = ChunkPos::new(0, 0);
        assert_eq!(origin.chebyshev(ChunkPos::new(1, 1)), 1);
        assert_eq!(origin.chebyshev(ChunkPos::new(-2, 1)), 2);
        assert_eq!(origin.chebyshev(origin), 0);
    }

    #[test]
    fn square_covers_segment() {
        let cells: Vec<_> = ChunkPos::new(5, 5).square(1).collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells.first().copied(), Some(ChunkPos::new(4, 4)));
        assert_eq!(cells.last().copied(), Some(ChunkPos::new(6, 6)));
        assert_eq!(ChunkPos::new(0, 0).square(0).count(), 1);
        assert_eq!(ChunkPos::new(0, 0).square(2).count(), 25);
    }

    #[test]
    fn square_is_clipped_at_coordinate_limits() {
        let corner = ChunkPos::new(i32::MAX, i32::MIN);
        let cells: Vec<_> = corner.square(2).collect();
        assert_eq!(cells.len(), 9);
        assert!(cells.contains(&corner));
        assert_eq!(cells.first().copied(), Some(ChunkPos::new(i32::MAX - 2, i32::MIN)));
    }
}
