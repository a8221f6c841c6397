//! The chunk generator: combines the height field, material strata, pathway
//! overlay, and stamps into a packed voxel buffer for one chunk.

use loam_voxel::{CHUNK_EXTENT, CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord, VOXEL_SIZE, voxel};

use crate::height::HeightField;
use crate::params::TerrainParams;
use crate::pathway::PathwayField;
use crate::stamps::{self, TilePlacement};
use crate::strata::material_for_depth;

/// Depth below the (possibly dipped) surface within which path and border
/// materials replace the normal surface stratum, in meters.
const OVERLAY_SURFACE_DEPTH: f32 = 1.0;

/// Sky light level written to voxels above the surface.
const SKY_LIGHT: u8 = 15;

/// One terrain column, fully classified.
#[derive(Clone, Copy, Debug)]
pub struct ColumnSample {
    /// Undipped surface height in meters.
    pub height: f32,
    /// Final surface height after any path dip.
    pub surface: f32,
    /// Path surface material, when the column is on a path.
    pub path_material: Option<u8>,
    /// The column carries a wall.
    pub wall: bool,
    /// The column lies in a border strip.
    pub border: bool,
    /// World Y of the standing-water surface, when the dip holds water.
    pub water_level: Option<f32>,
}

/// Deterministic terrain source: the same seed yields byte-identical chunks
/// on every run.
pub struct TerrainGenerator {
    seed: u64,
    params: TerrainParams,
    height: HeightField,
    pathway: Option<PathwayField>,
}

impl TerrainGenerator {
    /// Builds a generator from a world seed and parameter set.
    pub fn new(seed: u64, params: TerrainParams) -> Self {
        let height = HeightField::new(seed, &params);
        let pathway = params
            .pathways
            .as_ref()
            .map(|p| PathwayField::new(seed, p));
        Self {
            seed,
            params,
            height,
            pathway,
        }
    }

    /// The world seed this generator was built with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Classifies the terrain column at world `(x, z)`.
    pub fn column(&self, x: f64, z: f64) -> ColumnSample {
        let height = self.height.sample(x, z);
        let Some(pathway) = &self.pathway else {
            return ColumnSample {
                height,
                surface: height,
                path_material: None,
                wall: false,
                border: false,
                water_level: None,
            };
        };

        let sample = pathway.sample(x, z);
        let surface = height - sample.dip;
        let water_level = if sample.on_path {
            self.params
                .pathways
                .as_ref()
                .and_then(|p| p.water)
                .map(|w| height - w.depth)
                .filter(|level| *level > surface)
        } else {
            None
        };
        ColumnSample {
            height,
            surface,
            path_material: sample.on_path.then_some(sample.material),
            wall: sample.wall,
            border: sample.border,
            water_level,
        }
    }

    /// Final surface height (after dips) at world `(x, z)`.
    pub fn surface_height(&self, x: f64, z: f64) -> f32 {
        self.column(x, z).surface
    }

    /// Generates the packed voxel buffer for one chunk.
    pub fn generate_chunk(&self, coord: ChunkCoord) -> Vec<u16> {
        let mut data = vec![voxel::AIR; CHUNK_VOLUME];
        let min = coord.world_min();

        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let x = (min.x + lx as f32 * VOXEL_SIZE) as f64;
                let z = (min.z + lz as f32 * VOXEL_SIZE) as f64;
                let col = self.column(x, z);
                self.fill_column(&mut data, min.y, lx, lz, &col);
            }
        }

        self.apply_stamps(&mut data, coord);
        data
    }

    /// Fills one `(lx, lz)` column of the buffer from a column sample.
    fn fill_column(&self, data: &mut [u16], min_y: f32, lx: usize, lz: usize, col: &ColumnSample) {
        let p = &self.params;
        // A wall raises the effective surface of its column.
        let wall_top = p
            .pathways
            .as_ref()
            .filter(|_| col.wall)
            .map(|pw| col.surface + pw.wall_height);

        for ly in 0..CHUNK_SIZE {
            let y = min_y + ly as f32 * VOXEL_SIZE;
            let surface = wall_top.unwrap_or(col.surface);
            let distance = surface - y;
            let weight = (distance * 0.5).clamp(-0.5, 0.5);

            let value = if weight > 0.0 {
                let material = self.solid_material(col, distance);
                voxel::pack(weight, material, 0)
            } else if col
                .water_level
                .is_some_and(|level| y > col.surface && y <= level)
            {
                // Water level is only set when pathway water is configured.
                let material = p
                    .pathways
                    .as_ref()
                    .and_then(|pw| pw.water)
                    .map(|w| w.material)
                    .unwrap_or(0);
                voxel::pack(0.5, material, 0)
            } else {
                voxel::pack(weight, 0, SKY_LIGHT)
            };
            data[voxel::voxel_index(lx, ly, lz)] = value;
        }
    }

    /// Material for a solid voxel `distance` meters below the effective
    /// surface of its column.
    fn solid_material(&self, col: &ColumnSample, distance: f32) -> u8 {
        let p = &self.params;
        if col.wall {
            if let Some(pw) = &p.pathways {
                return pw.wall_material;
            }
        }
        if distance <= OVERLAY_SURFACE_DEPTH {
            if let Some(material) = col.path_material {
                return material;
            }
            if col.border {
                if let Some(pw) = &p.pathways {
                    return pw.border_material;
                }
            }
        }
        material_for_depth(&p.strata, p.default_material, distance)
    }

    /// Applies stamp placements overlapping this chunk.
    ///
    /// Placements come from the chunk's own tile and the eight surrounding
    /// tiles, so stamps straddling a tile boundary are written whole.
    /// Placements anchored on a pathway are filtered out.
    fn apply_stamps(&self, data: &mut [u16], coord: ChunkCoord) {
        let Some(stamp_params) = &self.params.stamps else {
            return;
        };
        let reach = (stamp_params.leaf_radius.max(stamp_params.rock_radius)
            * stamp_params.scale_range.1 as f32)
            .max(1.0);
        let min = coord.world_min();
        let max_x = min.x + CHUNK_EXTENT;
        let max_z = min.z + CHUNK_EXTENT;

        for dtz in -1..=1 {
            for dtx in -1..=1 {
                let placements = stamps::placements_for_tile(
                    self.seed,
                    coord.cx + dtx,
                    coord.cz + dtz,
                    stamp_params,
                );
                for placement in placements {
                    if !self.placement_touches(&placement, min.x, min.z, max_x, max_z, reach) {
                        continue;
                    }
                    if self.on_pathway(placement.x, placement.z) {
                        continue;
                    }
                    let surface = self.surface_height(placement.x, placement.z);
                    stamps::apply_placement(data, coord, &placement, surface, stamp_params);
                }
            }
        }
    }

    fn placement_touches(
        &self,
        placement: &TilePlacement,
        min_x: f32,
        min_z: f32,
        max_x: f32,
        max_z: f32,
        reach: f32,
    ) -> bool {
        let x = placement.x as f32;
        let z = placement.z as f32;
        x >= min_x - reach && x <= max_x + reach && z >= min_z - reach && z <= max_z + reach
    }

    fn on_pathway(&self, x: f64, z: f64) -> bool {
        self.pathway
            .as_ref()
            .is_some_and(|p| p.sample(x, z).on_path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_params() -> TerrainParams {
        TerrainParams {
            height_layers: vec![],
            pathways: None,
            stamps: None,
            ..TerrainParams::default()
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = TerrainGenerator::new(321, TerrainParams::default());
        let b = TerrainGenerator::new(321, TerrainParams::default());
        let coord = ChunkCoord::new(2, 0, -1);
        assert_eq!(a.generate_chunk(coord), b.generate_chunk(coord));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = TerrainGenerator::new(1, TerrainParams::default());
        let b = TerrainGenerator::new(2, TerrainParams::default());
        let coord = ChunkCoord::new(0, 0, 0);
        assert_ne!(a.generate_chunk(coord), b.generate_chunk(coord));
    }

    #[test]
    fn test_flat_world_surface_sits_at_zero() {
        let generator = TerrainGenerator::new(5, flat_params());
        let data = generator.generate_chunk(ChunkCoord::new(0, 0, 0));
        // Height field sums to 0 with no layers: voxels below y=0 are in
        // chunk (0,-1,0); this chunk is air at and above the surface.
        assert!(!voxel::is_solid(data[voxel::voxel_index(0, 0, 0)]));
        assert!(!voxel::is_solid(data[voxel::voxel_index(5, 20, 5)]));

        let below = generator.generate_chunk(ChunkCoord::new(0, -1, 0));
        assert!(voxel::is_solid(below[voxel::voxel_index(0, 31, 0)]));
    }

    #[test]
    fn test_surface_material_follows_strata() {
        let generator = TerrainGenerator::new(5, flat_params());
        let below = generator.generate_chunk(ChunkCoord::new(0, -1, 0));
        // Just below the surface: first stratum (grass).
        assert_eq!(voxel::material(below[voxel::voxel_index(0, 31, 0)]), 1);
        // Bottom of the chunk is 8 m deep: default stone.
        assert_eq!(voxel::material(below[voxel::voxel_index(0, 0, 0)]), 3);
    }

    #[test]
    fn test_air_above_surface_has_sky_light() {
        let generator = TerrainGenerator::new(5, flat_params());
        let data = generator.generate_chunk(ChunkCoord::new(0, 1, 0));
        let v = data[voxel::voxel_index(3, 3, 3)];
        assert!(!voxel::is_solid(v));
        assert_eq!(voxel::light(v), 15);
    }

    #[test]
    fn test_weight_ramps_across_surface() {
        let generator = TerrainGenerator::new(5, flat_params());
        let below = generator.generate_chunk(ChunkCoord::new(0, -1, 0));
        // 2 m below the surface the transition band has saturated.
        let deep = below[voxel::voxel_index(0, 23, 0)];
        assert_eq!(voxel::weight(deep), 0.5);
        // Just below the surface the weight is partial.
        let near = below[voxel::voxel_index(0, 31, 0)];
        assert!(voxel::weight(near) > 0.0 && voxel::weight(near) < 0.5);
    }

    #[test]
    fn test_column_without_pathways_has_no_overlay() {
        let generator = TerrainGenerator::new(5, flat_params());
        let col = generator.column(3.0, 4.0);
        assert_eq!(col.height, col.surface);
        assert!(col.path_material.is_none());
        assert!(!col.wall && !col.border);
        assert!(col.water_level.is_none());
    }

    #[test]
    fn test_stamps_add_solid_voxels_above_surface() {
        let params = TerrainParams {
            height_layers: vec![],
            pathways: None,
            ..TerrainParams::default()
        };
        let generator = TerrainGenerator::new(11, params);
        // Surface at y=0: stamps grow into chunk (cx, 0, cz). Scan a few
        // tiles; dart throwing occasionally leaves a tile sparse.
        let found = (0..16).any(|i| {
            let coord = ChunkCoord::new(i % 4, 0, i / 4);
            let data = generator.generate_chunk(coord);
            data.iter().any(|&v| voxel::is_solid(v))
        });
        assert!(found, "no stamp voxels in a 4x4 tile region");
    }
}
