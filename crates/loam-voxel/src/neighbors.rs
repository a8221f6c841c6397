//! Read-only neighborhood view for cross-chunk sampling.
//!
//! Margin sampling at a chunk border can land in a face, edge, or corner
//! neighbor, so the view covers the full 3×3×3 block of surrounding chunks.

use crate::chunk::VoxelChunk;
use crate::coords::ChunkCoord;
use crate::face::Face;
use crate::store::ChunkStore;

/// Borrowed references to the (up to) 26 chunks surrounding a center chunk.
///
/// Chunks do not hold neighbor pointers; samplers receive this view as an
/// explicit argument scoped to one operation.
pub struct NeighborChunks<'a> {
    grid: [Option<&'a VoxelChunk>; 27],
}

impl<'a> NeighborChunks<'a> {
    /// A view with no neighbors loaded.
    pub fn empty() -> Self {
        Self { grid: [None; 27] }
    }

    /// Collects the loaded neighbors of `center` from the store.
    pub fn around(store: &'a ChunkStore, center: ChunkCoord) -> Self {
        let mut grid = [None; 27];
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    grid[grid_index(dx, dy, dz)] = store.get(center.offset(dx, dy, dz));
                }
            }
        }
        Self { grid }
    }

    /// Returns the neighbor at unit offset `(dx, dy, dz)`, each in `[-1, 1]`.
    pub fn get(&self, dx: i32, dy: i32, dz: i32) -> Option<&'a VoxelChunk> {
        self.grid[grid_index(dx, dy, dz)]
    }

    /// Returns the face-adjacent neighbor.
    pub fn face(&self, face: Face) -> Option<&'a VoxelChunk> {
        let (dx, dy, dz) = face.offset();
        self.get(dx, dy, dz)
    }

    /// Inserts a neighbor at unit offset `(dx, dy, dz)` (test construction).
    pub fn insert(&mut self, dx: i32, dy: i32, dz: i32, chunk: &'a VoxelChunk) {
        self.grid[grid_index(dx, dy, dz)] = Some(chunk);
    }
}

fn grid_index(dx: i32, dy: i32, dz: i32) -> usize {
    debug_assert!((-1..=1).contains(&dx) && (-1..=1).contains(&dy) && (-1..=1).contains(&dz));
    ((dx + 1) + (dy + 1) * 3 + (dz + 1) * 9) as usize
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::pack;

    #[test]
    fn test_empty_has_no_neighbors() {
        let n = NeighborChunks::empty();
        assert!(n.get(-1, 0, 0).is_none());
        assert!(n.get(1, 1, 1).is_none());
    }

    #[test]
    fn test_around_collects_loaded_neighbors() {
        let mut store = ChunkStore::new();
        let center = ChunkCoord::new(0, 0, 0);
        let mut east = VoxelChunk::new();
        east.set(0, 0, 0, pack(0.5, 3, 0));
        store.insert(ChunkCoord::new(1, 0, 0), east);
        store.insert(ChunkCoord::new(-1, -1, -1), VoxelChunk::new());

        let n = NeighborChunks::around(&store, center);
        assert!(n.face(Face::PosX).is_some());
        assert_eq!(n.face(Face::PosX).unwrap().get(0, 0, 0), pack(0.5, 3, 0));
        assert!(n.get(-1, -1, -1).is_some());
        assert!(n.get(0, 1, 0).is_none());
    }

    #[test]
    fn test_margin_sample_reads_face_neighbor() {
        let mut store = ChunkStore::new();
        let center_coord = ChunkCoord::new(0, 0, 0);
        store.insert(center_coord, VoxelChunk::new());

        let mut west = VoxelChunk::new();
        west.set(31, 7, 7, pack(0.5, 9, 0));
        store.insert(ChunkCoord::new(-1, 0, 0), west);

        let n = NeighborChunks::around(&store, center_coord);
        let center = store.get(center_coord).unwrap();
        assert_eq!(center.sample_with_margin(-1, 7, 7, &n), pack(0.5, 9, 0));
    }

    #[test]
    fn test_margin_sample_reads_corner_neighbor() {
        let mut store = ChunkStore::new();
        let center_coord = ChunkCoord::new(0, 0, 0);
        store.insert(center_coord, VoxelChunk::new());

        let mut corner = VoxelChunk::new();
        corner.set(31, 31, 31, pack(0.5, 4, 0));
        store.insert(ChunkCoord::new(-1, -1, -1), corner);

        let n = NeighborChunks::around(&store, center_coord);
        let center = store.get(center_coord).unwrap();
        assert_eq!(center.sample_with_margin(-1, -1, -1, &n), pack(0.5, 4, 0));
    }
}
