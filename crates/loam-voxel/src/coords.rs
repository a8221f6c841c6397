//! Chunk and tile coordinates, and conversions from world-space meters.
//!
//! World meters, voxel indices, and chunk indices are three distinct scalar
//! domains; conversions between them go through the functions here rather
//! than ad-hoc arithmetic at call sites.

use std::fmt;

use glam::Vec3;
use loam_math::Aabb;
use serde::{Deserialize, Serialize};

use crate::chunk::{CHUNK_EXTENT, CHUNK_SIZE, VOXEL_SIZE};
use crate::face::Face;

/// Identifies a chunk's position on the chunk grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Chunk-grid X coordinate.
    pub cx: i32,
    /// Chunk-grid Y coordinate.
    pub cy: i32,
    /// Chunk-grid Z coordinate.
    pub cz: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    /// Returns the chunk containing a world-space position.
    pub fn containing(pos: Vec3) -> Self {
        Self {
            cx: (pos.x / CHUNK_EXTENT).floor() as i32,
            cy: (pos.y / CHUNK_EXTENT).floor() as i32,
            cz: (pos.z / CHUNK_EXTENT).floor() as i32,
        }
    }

    /// Returns the coordinate offset by `(dx, dy, dz)` chunk units.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    /// Returns the face-adjacent neighbor through `face`.
    pub fn face_neighbor(self, face: Face) -> Self {
        let (dx, dy, dz) = face.offset();
        self.offset(dx, dy, dz)
    }

    /// Chebyshev (chessboard) distance to another chunk.
    pub fn chebyshev_distance(self, other: ChunkCoord) -> i32 {
        (self.cx - other.cx)
            .abs()
            .max((self.cy - other.cy).abs())
            .max((self.cz - other.cz).abs())
    }

    /// Squared Euclidean distance in chunk units.
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = (self.cx - other.cx) as i64;
        let dy = (self.cy - other.cy) as i64;
        let dz = (self.cz - other.cz) as i64;
        dx * dx + dy * dy + dz * dz
    }

    /// World-space position of the chunk's minimum corner.
    pub fn world_min(self) -> Vec3 {
        Vec3::new(
            self.cx as f32 * CHUNK_EXTENT,
            self.cy as f32 * CHUNK_EXTENT,
            self.cz as f32 * CHUNK_EXTENT,
        )
    }

    /// World-space bounding box of the chunk.
    pub fn world_aabb(self) -> Aabb {
        let min = self.world_min();
        Aabb::new(min, min + Vec3::splat(CHUNK_EXTENT))
    }

    /// World-space position of a local voxel's minimum corner.
    pub fn voxel_world_pos(self, lx: usize, ly: usize, lz: usize) -> Vec3 {
        debug_assert!(lx < CHUNK_SIZE && ly < CHUNK_SIZE && lz < CHUNK_SIZE);
        self.world_min()
            + Vec3::new(
                lx as f32 * VOXEL_SIZE,
                ly as f32 * VOXEL_SIZE,
                lz as f32 * VOXEL_SIZE,
            )
    }

    /// The surface-column/tile coordinate this chunk belongs to.
    pub fn tile(self) -> TileCoord {
        TileCoord {
            tx: self.cx,
            tz: self.cz,
        }
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.cx, self.cy, self.cz)
    }
}

/// Identifies a vertical surface column (all chunks sharing `(cx, cz)`) and
/// its 2D map tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Tile X coordinate (same grid as chunk X).
    pub tx: i32,
    /// Tile Z coordinate (same grid as chunk Z).
    pub tz: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    pub fn new(tx: i32, tz: i32) -> Self {
        Self { tx, tz }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.tx, self.tz)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_stable_key() {
        assert_eq!(ChunkCoord::new(1, -2, 3).to_string(), "1,-2,3");
        assert_eq!(TileCoord::new(-4, 0).to_string(), "-4,0");
    }

    #[test]
    fn test_containing_floors_negative_positions() {
        // Chunk extent is 8 m.
        assert_eq!(
            ChunkCoord::containing(Vec3::new(0.1, 0.1, 0.1)),
            ChunkCoord::new(0, 0, 0)
        );
        assert_eq!(
            ChunkCoord::containing(Vec3::new(-0.1, 0.0, 8.0)),
            ChunkCoord::new(-1, 0, 1)
        );
    }

    #[test]
    fn test_chebyshev_distance_takes_max_axis() {
        let a = ChunkCoord::new(0, 0, 0);
        let b = ChunkCoord::new(2, -5, 1);
        assert_eq!(a.chebyshev_distance(b), 5);
        assert_eq!(b.chebyshev_distance(a), 5);
    }

    #[test]
    fn test_face_neighbor_moves_one_chunk() {
        let c = ChunkCoord::new(1, 1, 1);
        assert_eq!(c.face_neighbor(Face::NegY), ChunkCoord::new(1, 0, 1));
        assert_eq!(c.face_neighbor(Face::PosZ), ChunkCoord::new(1, 1, 2));
    }

    #[test]
    fn test_world_aabb_spans_chunk_extent() {
        let b = ChunkCoord::new(1, 0, -1).world_aabb();
        assert_eq!(b.min, Vec3::new(8.0, 0.0, -8.0));
        assert_eq!(b.max, Vec3::new(16.0, 8.0, 0.0));
    }

    #[test]
    fn test_voxel_world_pos_scales_by_voxel_size() {
        let p = ChunkCoord::new(0, 0, 0).voxel_world_pos(2, 0, 1);
        assert_eq!(p, Vec3::new(0.5, 0.0, 0.25));
    }
}
