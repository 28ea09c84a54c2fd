//! Metadata stores keyed by stable identities.
//!
//! Neither store owns engine objects. Entity records point at chunks by key
//! only; there is no chunk-to-entity reverse index, chunk contents are
//! re-enumerated on demand behind a short cache window.

pub mod chunk;
pub mod entity;

pub use chunk::{ChunkRecord, ChunkStore, ANIMAL_CACHE_WINDOW_MS};
pub use entity::{EntityRecord, EntityStore};
