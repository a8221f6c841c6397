//! Central owner for all loaded chunks, keyed by [`ChunkCoord`].
//!
//! The store is the single authority for which chunks exist in memory.
//! Meshing, visibility, and build application all go through it.

use rustc_hash::FxHashMap;

use crate::chunk::VoxelChunk;
use crate::coords::ChunkCoord;

/// Owns all currently-loaded chunks with O(1) lookup.
#[derive(Default)]
pub struct ChunkStore {
    chunks: FxHashMap<ChunkCoord, VoxelChunk>,
}

impl ChunkStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            chunks: FxHashMap::default(),
        }
    }

    /// Inserts a chunk, replacing any previous chunk at the same coordinate.
    pub fn insert(&mut self, coord: ChunkCoord, chunk: VoxelChunk) {
        self.chunks.insert(coord, chunk);
    }

    /// Removes and returns the chunk at `coord`.
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<VoxelChunk> {
        self.chunks.remove(&coord)
    }

    /// Immutable access to a loaded chunk.
    pub fn get(&self, coord: ChunkCoord) -> Option<&VoxelChunk> {
        self.chunks.get(&coord)
    }

    /// Mutable access to a loaded chunk.
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut VoxelChunk> {
        self.chunks.get_mut(&coord)
    }

    /// Whether a chunk is loaded at `coord`.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when no chunks are loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterates over all loaded coordinates.
    pub fn coords(&self) -> impl Iterator<Item = &ChunkCoord> {
        self.chunks.keys()
    }

    /// Iterates over all `(coord, chunk)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &VoxelChunk)> {
        self.chunks.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::pack;

    #[test]
    fn test_insert_then_get_returns_chunk() {
        let mut store = ChunkStore::new();
        let coord = ChunkCoord::new(1, 2, 3);
        let mut chunk = VoxelChunk::new();
        chunk.set(4, 5, 6, pack(0.5, 7, 0));
        store.insert(coord, chunk);

        let got = store.get(coord).expect("chunk should be loaded");
        assert_eq!(got.get(4, 5, 6), pack(0.5, 7, 0));
    }

    #[test]
    fn test_reinsert_replaces_existing() {
        let mut store = ChunkStore::new();
        let coord = ChunkCoord::new(0, 0, 0);
        let mut first = VoxelChunk::new();
        first.set(0, 0, 0, pack(0.5, 1, 0));
        store.insert(coord, first);

        let mut second = VoxelChunk::new();
        second.set(0, 0, 0, pack(0.5, 2, 0));
        store.insert(coord, second);

        assert_eq!(store.len(), 1);
        assert_eq!(
            crate::voxel::material(store.get(coord).unwrap().get(0, 0, 0)),
            2
        );
    }

    #[test]
    fn test_remove_unloads_chunk() {
        let mut store = ChunkStore::new();
        let coord = ChunkCoord::new(5, 0, -5);
        store.insert(coord, VoxelChunk::new());
        assert!(store.remove(coord).is_some());
        assert!(!store.contains(coord));
        assert!(store.remove(coord).is_none());
    }
}
