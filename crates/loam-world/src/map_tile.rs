//! 2D map tiles: a per-column raster of surface height and material,
//! derived from chunk voxels and kept current as the world changes.

use loam_voxel::{CHUNK_SIZE, ChunkCoord, VoxelChunk, voxel};

/// Height value meaning "no solid voxel known for this pixel yet".
pub const UNKNOWN_HEIGHT: i16 = i16::MIN;

/// A 32×32 raster of `(height, material)` per column pixel.
///
/// `height` is the world voxel Y of the topmost solid voxel; pixels are
/// indexed `x + z·S`.
#[derive(Clone, Debug, PartialEq)]
pub struct MapTile {
    /// Topmost solid world voxel Y per pixel.
    pub heights: Vec<i16>,
    /// Surface material per pixel.
    pub materials: Vec<u8>,
}

impl Default for MapTile {
    fn default() -> Self {
        Self::new()
    }
}

impl MapTile {
    /// An empty tile with no known surface.
    pub fn new() -> Self {
        Self {
            heights: vec![UNKNOWN_HEIGHT; CHUNK_SIZE * CHUNK_SIZE],
            materials: vec![0; CHUNK_SIZE * CHUNK_SIZE],
        }
    }

    /// Builds a tile from a server-provided raster.
    ///
    /// Returns `None` unless both slices hold exactly `S²` entries.
    pub fn from_raster(heights: &[i16], materials: &[u8]) -> Option<Self> {
        if heights.len() != CHUNK_SIZE * CHUNK_SIZE || materials.len() != CHUNK_SIZE * CHUNK_SIZE {
            return None;
        }
        Some(Self {
            heights: heights.to_vec(),
            materials: materials.to_vec(),
        })
    }

    /// Pixel accessor: `(height, material)` at `(x, z)`.
    pub fn pixel(&self, x: usize, z: usize) -> (i16, u8) {
        let idx = x + z * CHUNK_SIZE;
        (self.heights[idx], self.materials[idx])
    }

    /// Folds one chunk's voxels into the tile.
    ///
    /// Raises pixels when this chunk holds a higher solid voxel. When a
    /// pixel's recorded surface lies inside this chunk's Y range but is no
    /// longer solid (the dig case), rescans downward within the chunk; if
    /// the chunk has no solid voxel left in that column, defers to
    /// `fallback_rescan` when provided, else drops the height just below
    /// the chunk as a best-effort answer until lower chunks load.
    pub fn update_from_chunk(
        &mut self,
        coord: ChunkCoord,
        chunk: &VoxelChunk,
        mut fallback_rescan: Option<&mut dyn FnMut(&mut MapTile, usize, usize)>,
    ) {
        let base_y = coord.cy * CHUNK_SIZE as i32;
        let top_y = base_y + CHUNK_SIZE as i32 - 1;

        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let idx = lx + lz * CHUNK_SIZE;
                let found = topmost_solid(chunk, lx, lz);

                match found {
                    Some((ly, material)) => {
                        let world_y = base_y + ly as i32;
                        let current = self.heights[idx];
                        if current == UNKNOWN_HEIGHT || world_y as i16 > current {
                            self.heights[idx] = world_y as i16;
                            self.materials[idx] = material;
                        } else if (current as i32) <= top_y && (current as i32) >= base_y {
                            // The recorded surface is inside this chunk:
                            // trust the rescan (it may have moved down).
                            self.heights[idx] = world_y as i16;
                            self.materials[idx] = material;
                        }
                    }
                    None => {
                        let current = self.heights[idx];
                        if current != UNKNOWN_HEIGHT
                            && (current as i32) >= base_y
                            && (current as i32) <= top_y
                        {
                            // Dig removed every solid voxel this chunk had
                            // for the column.
                            if let Some(rescan) = fallback_rescan.as_mut() {
                                rescan(self, lx, lz);
                            } else {
                                self.heights[idx] = (base_y - 1) as i16;
                                self.materials[idx] = 0;
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Topmost solid voxel of a chunk column, as `(local_y, material)`.
fn topmost_solid(chunk: &VoxelChunk, lx: usize, lz: usize) -> Option<(usize, u8)> {
    for ly in (0..CHUNK_SIZE).rev() {
        let v = chunk.get_local(lx, ly, lz);
        if voxel::is_solid(v) {
            return Some((ly, voxel::material(v)));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use loam_voxel::voxel::pack;

    #[test]
    fn test_flat_chunk_sets_uniform_heights() {
        let mut tile = MapTile::new();
        let mut chunk = VoxelChunk::new();
        chunk.generate_flat(10, 1);
        tile.update_from_chunk(ChunkCoord::new(0, 0, 0), &chunk, None);

        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                assert_eq!(tile.pixel(x, z), (9, 1));
            }
        }
    }

    #[test]
    fn test_higher_chunk_overrides_lower() {
        let mut tile = MapTile::new();
        let mut low = VoxelChunk::new();
        low.generate_flat(32, 2); // fills the whole chunk
        tile.update_from_chunk(ChunkCoord::new(0, 0, 0), &low, None);
        assert_eq!(tile.pixel(0, 0), (31, 2));

        let mut high = VoxelChunk::new();
        high.set(0, 5, 0, pack(0.5, 3, 0));
        tile.update_from_chunk(ChunkCoord::new(0, 1, 0), &high, None);
        // Pixel (0,0) climbed into the upper chunk; others kept.
        assert_eq!(tile.pixel(0, 0), (37, 3));
        assert_eq!(tile.pixel(1, 0), (31, 2));
    }

    #[test]
    fn test_dig_lowers_height_within_chunk() {
        let mut tile = MapTile::new();
        let mut chunk = VoxelChunk::new();
        chunk.generate_flat(11, 1);
        tile.update_from_chunk(ChunkCoord::new(0, 0, 0), &chunk, None);
        assert_eq!(tile.pixel(5, 5), (10, 1));

        // Remove the top voxel of one column.
        chunk.set(5, 10, 5, voxel::AIR);
        chunk.set(5, 9, 5, pack(0.5, 4, 0));
        tile.update_from_chunk(ChunkCoord::new(0, 0, 0), &chunk, None);
        let (height, material) = tile.pixel(5, 5);
        assert!(height < 10);
        assert_eq!((height, material), (9, 4));
    }

    #[test]
    fn test_emptied_column_without_fallback_underreports() {
        let mut tile = MapTile::new();
        let mut chunk = VoxelChunk::new();
        chunk.set(3, 20, 3, pack(0.5, 1, 0));
        tile.update_from_chunk(ChunkCoord::new(0, 0, 0), &chunk, None);
        assert_eq!(tile.pixel(3, 3), (20, 1));

        chunk.set(3, 20, 3, voxel::AIR);
        tile.update_from_chunk(ChunkCoord::new(0, 0, 0), &chunk, None);
        // Best effort: just below this chunk, awaiting lower chunks.
        assert_eq!(tile.pixel(3, 3), (-1, 0));
    }

    #[test]
    fn test_emptied_column_uses_fallback_when_given() {
        let mut tile = MapTile::new();
        let mut chunk = VoxelChunk::new();
        chunk.set(3, 20, 3, pack(0.5, 1, 0));
        tile.update_from_chunk(ChunkCoord::new(0, 0, 0), &chunk, None);

        chunk.set(3, 20, 3, voxel::AIR);
        let mut rescan = |tile: &mut MapTile, lx: usize, lz: usize| {
            let idx = lx + lz * CHUNK_SIZE;
            tile.heights[idx] = -33;
            tile.materials[idx] = 9;
        };
        tile.update_from_chunk(ChunkCoord::new(0, 0, 0), &chunk, Some(&mut rescan));
        assert_eq!(tile.pixel(3, 3), (-33, 9));
    }

    #[test]
    fn test_unrelated_chunk_leaves_other_pixels() {
        let mut tile = MapTile::new();
        let chunk = VoxelChunk::new(); // all air
        tile.update_from_chunk(ChunkCoord::new(0, 2, 0), &chunk, None);
        assert_eq!(tile.pixel(0, 0), (UNKNOWN_HEIGHT, 0));
    }
}
