//! Surface stamps: deterministic Poisson-style scattering of trees and
//! rocks, written directly into a chunk's voxel buffer.
//!
//! Placements are generated per tile (one tile per `(cx, cz)` column) from a
//! tile-derived RNG, so any chunk of the column regenerates the same set.

use rand::Rng;

use loam_voxel::{CHUNK_EXTENT, CHUNK_SIZE, ChunkCoord, VOXEL_SIZE, voxel};

use crate::params::StampParams;
use crate::seed::tile_rng;

/// What a stamp writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StampKind {
    /// Trunk column topped by a foliage sphere.
    Tree,
    /// Squat ellipsoid boulder.
    Rock,
}

/// One stamp anchored on the terrain surface.
#[derive(Clone, Copy, Debug)]
pub struct TilePlacement {
    /// Anchor X in world meters.
    pub x: f64,
    /// Anchor Z in world meters.
    pub z: f64,
    /// Stamp variant.
    pub kind: StampKind,
    /// Rotation about the vertical axis, radians.
    pub rotation: f32,
    /// Size multiplier.
    pub scale: f64,
}

/// Generates the stamp placements for tile `(tx, tz)`.
///
/// Dart throwing with a minimum-spacing rejection test; candidates that land
/// too close to an accepted point are discarded. The RNG stream is consumed
/// identically regardless of acceptance, so placement is stable under
/// parameter-independent replays.
pub fn placements_for_tile(
    world_seed: u64,
    tx: i32,
    tz: i32,
    params: &StampParams,
) -> Vec<TilePlacement> {
    let mut rng = tile_rng(world_seed, tx, tz);
    let extent = CHUNK_EXTENT as f64;
    let min_x = tx as f64 * extent;
    let min_z = tz as f64 * extent;

    let mut placements: Vec<TilePlacement> = Vec::new();
    for _ in 0..params.attempts {
        let x = min_x + rng.random_range(0.0..extent);
        let z = min_z + rng.random_range(0.0..extent);
        let is_tree = rng.random_bool(params.tree_chance.clamp(0.0, 1.0));
        let rotation = rng.random_range(0.0..std::f64::consts::TAU) as f32;
        let scale = rng.random_range(params.scale_range.0..=params.scale_range.1);

        let spacing_sq = params.min_spacing * params.min_spacing;
        let too_close = placements
            .iter()
            .any(|p| (p.x - x).powi(2) + (p.z - z).powi(2) < spacing_sq);
        if too_close {
            continue;
        }
        placements.push(TilePlacement {
            x,
            z,
            kind: if is_tree { StampKind::Tree } else { StampKind::Rock },
            rotation,
            scale,
        });
    }
    placements
}

/// Writes one placement into a chunk's voxel buffer.
///
/// `surface` is the terrain height at the anchor (from the generator's
/// height sampler). Voxels outside the chunk are skipped; the neighboring
/// chunks regenerate the same placement and write their own part.
pub fn apply_placement(
    data: &mut [u16],
    chunk: ChunkCoord,
    placement: &TilePlacement,
    surface: f32,
    params: &StampParams,
) {
    match placement.kind {
        StampKind::Tree => {
            let trunk_h = params.trunk_height * placement.scale as f32;
            write_column(
                data,
                chunk,
                placement.x as f32,
                placement.z as f32,
                surface,
                surface + trunk_h,
                params.trunk_material,
            );
            write_blob(
                data,
                chunk,
                glam::Vec3::new(
                    placement.x as f32,
                    surface + trunk_h,
                    placement.z as f32,
                ),
                glam::Vec3::splat(params.leaf_radius * placement.scale as f32),
                0.0,
                params.leaf_material,
            );
        }
        StampKind::Rock => {
            let r = params.rock_radius * placement.scale as f32;
            write_blob(
                data,
                chunk,
                glam::Vec3::new(placement.x as f32, surface, placement.z as f32),
                glam::Vec3::new(r * 1.25, r * 0.8, r * 0.9),
                placement.rotation,
                params.rock_material,
            );
        }
    }
}

/// Raises a voxel toward solid, never lowering existing density.
fn raise_voxel(data: &mut [u16], lx: i32, ly: i32, lz: i32, weight: f32, material: u8) {
    let s = CHUNK_SIZE as i32;
    if !(0..s).contains(&lx) || !(0..s).contains(&ly) || !(0..s).contains(&lz) {
        return;
    }
    let idx = voxel::voxel_index(lx as usize, ly as usize, lz as usize);
    if weight > voxel::weight(data[idx]) {
        data[idx] = voxel::pack(weight, material, voxel::light(data[idx]));
    }
}

/// Fully solid single-voxel column between two world heights.
fn write_column(
    data: &mut [u16],
    chunk: ChunkCoord,
    x: f32,
    z: f32,
    y_from: f32,
    y_to: f32,
    material: u8,
) {
    let min = chunk.world_min();
    let lx = ((x - min.x) / VOXEL_SIZE).floor() as i32;
    let lz = ((z - min.z) / VOXEL_SIZE).floor() as i32;
    let ly_from = ((y_from - min.y) / VOXEL_SIZE).floor() as i32;
    let ly_to = ((y_to - min.y) / VOXEL_SIZE).ceil() as i32;
    for ly in ly_from..=ly_to {
        raise_voxel(data, lx, ly, lz, 0.5, material);
    }
}

/// Soft ellipsoid blob; density falls off toward the boundary so the mesher
/// rounds it.
fn write_blob(
    data: &mut [u16],
    chunk: ChunkCoord,
    center: glam::Vec3,
    radii: glam::Vec3,
    rotation: f32,
    material: u8,
) {
    let min = chunk.world_min();
    let max_r = radii.max_element();
    let lo = ((center - glam::Vec3::splat(max_r) - min) / VOXEL_SIZE).floor();
    let hi = ((center + glam::Vec3::splat(max_r) - min) / VOXEL_SIZE).ceil();
    let (sin, cos) = (libm::sinf(rotation), libm::cosf(rotation));

    for lz in lo.z as i32..=hi.z as i32 {
        for ly in lo.y as i32..=hi.y as i32 {
            for lx in lo.x as i32..=hi.x as i32 {
                let p = min
                    + glam::Vec3::new(lx as f32, ly as f32, lz as f32) * VOXEL_SIZE
                    - center;
                // Rotate about Y into the ellipsoid's frame.
                let rx = p.x * cos + p.z * sin;
                let rz = -p.x * sin + p.z * cos;
                let norm = glam::Vec3::new(rx / radii.x, p.y / radii.y, rz / radii.z).length();
                let weight = ((1.0 - norm) * 2.0).clamp(-0.5, 0.5);
                if weight > -0.5 {
                    raise_voxel(data, lx, ly, lz, weight, material);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
