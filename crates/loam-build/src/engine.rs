//! Applies build operations to loaded chunks.

use loam_voxel::{CHUNK_SIZE, ChunkCoord, ChunkStore, VOXEL_SIZE, VoxelChunk, voxel};

use crate::op::{BLEND_BAND, BuildMode, BuildOperation};

/// Density units per meter of signed distance: a shape surface transitions
/// from empty to solid across the blend band.
const DENSITY_PER_METER: f32 = 0.5 / BLEND_BAND;

/// Applies `op` to every loaded affected chunk.
///
/// Missing chunks are skipped without error; the server's copy is
/// authoritative and this client simply has nothing to edit. Changed chunks
/// are marked dirty; the returned coordinates tell the caller which chunks
/// need their visibility bits recomputed and a remesh.
pub fn apply_build_operation(store: &mut ChunkStore, op: &BuildOperation) -> Vec<ChunkCoord> {
    let mut changed = Vec::new();
    for coord in op.affected_chunks() {
        let Some(chunk) = store.get_mut(coord) else {
            continue;
        };
        if apply_to_chunk(chunk, coord, op) {
            chunk.mark_dirty();
            changed.push(coord);
        }
    }
    changed
}

/// Evaluates `op` against every voxel of one chunk inside the operation's
/// AABB. Returns true iff any packed voxel changed.
pub fn apply_to_chunk(chunk: &mut VoxelChunk, coord: ChunkCoord, op: &BuildOperation) -> bool {
    let aabb = op.aabb();
    let min = coord.world_min();
    let s = CHUNK_SIZE as i32;

    let lo = |w: f32, m: f32| (((w - m) / VOXEL_SIZE).floor() as i32).clamp(0, s - 1);
    let hi = |w: f32, m: f32| (((w - m) / VOXEL_SIZE).ceil() as i32).clamp(0, s - 1);
    let (x0, x1) = (lo(aabb.min.x, min.x), hi(aabb.max.x, min.x));
    let (y0, y1) = (lo(aabb.min.y, min.y), hi(aabb.max.y, min.y));
    let (z0, z1) = (lo(aabb.min.z, min.z), hi(aabb.max.z, min.z));

    let mut changed = false;
    for lz in z0..=z1 {
        for ly in y0..=y1 {
            for lx in x0..=x1 {
                let world = glam::Vec3::new(
                    min.x + lx as f32 * VOXEL_SIZE,
                    min.y + ly as f32 * VOXEL_SIZE,
                    min.z + lz as f32 * VOXEL_SIZE,
                );
                let d = op.signed_distance(world);
                if d >= BLEND_BAND {
                    continue;
                }
                let old = chunk.get(lx, ly, lz);
                let new = apply_mode(old, d, op);
                if new != old {
                    chunk.set(lx, ly, lz, new);
                    changed = true;
                }
            }
        }
    }
    changed
}

/// Combines one voxel with the operation's field value.
fn apply_mode(old: u16, d: f32, op: &BuildOperation) -> u16 {
    let old_weight = voxel::weight(old);
    let old_material = voxel::material(old);
    let old_light = voxel::light(old);
    // The shape's own density: +0.5 deep inside, −0.5 well outside.
    let field = (-d * DENSITY_PER_METER).clamp(-0.5, 0.5);

    match op.mode {
        BuildMode::Add => {
            if field > old_weight {
                let material = if field > 0.0 { op.material } else { old_material };
                voxel::pack(field, material, old_light)
            } else {
                old
            }
        }
        BuildMode::Subtract => {
            // Inverted field: carving caps the density from above.
            let cap = (d * DENSITY_PER_METER).clamp(-0.5, 0.5);
            if cap < old_weight {
                voxel::pack(cap, old_material, old_light)
            } else {
                old
            }
        }
        BuildMode::Paint => {
            if d <= 0.0 && voxel::is_solid(old) {
                voxel::pack(old_weight, op.material, old_light)
            } else {
                old
            }
        }
        BuildMode::Fill => {
            if d <= 0.0 {
                if op.material == 0 {
                    // Filling with "none" empties the region outright.
                    voxel::pack(-0.5, 0, old_light)
                } else {
                    voxel::pack(0.5, op.material, old_light)
                }
            } else {
                old
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::BuildShape;
    use glam::Vec3;

    fn op(shape: BuildShape, mode: BuildMode, center: Vec3, size: Vec3, material: u8) -> BuildOperation {
        BuildOperation {
            center,
            shape,
            mode,
            size,
            material,
            thickness: None,
            closed: false,
            arc_sweep: None,
            rotation: 0.0,
        }
    }

    fn solid_chunk(material: u8) -> VoxelChunk {
        let mut chunk = VoxelChunk::new();
        chunk.fill(0.5, material, 0);
        chunk.clear_dirty();
        chunk
    }

    #[test]
    fn test_add_raises_weight_and_sets_material() {
        let mut chunk = VoxelChunk::new();
        let coord = ChunkCoord::new(0, 0, 0);
        let add = op(
            BuildShape::Sphere,
            BuildMode::Add,
            Vec3::splat(4.0),
            Vec3::splat(1.0),
            6,
        );
        assert!(apply_to_chunk(&mut chunk, coord, &add));
        // Voxel at the center: (4,4,4) world = local (16,16,16).
        let v = chunk.get(16, 16, 16);
        assert_eq!(voxel::weight(v), 0.5);
        assert_eq!(voxel::material(v), 6);
    }

    #[test]
    fn test_add_never_lowers_existing_density() {
        let mut chunk = solid_chunk(2);
        let coord = ChunkCoord::new(0, 0, 0);
        let add = op(
            BuildShape::Sphere,
            BuildMode::Add,
            Vec3::splat(4.0),
            Vec3::splat(1.0),
            6,
        );
        apply_to_chunk(&mut chunk, coord, &add);
        // A voxel at the sphere edge keeps full terrain density.
        let v = chunk.get(20, 16, 16); // 1 m from center
        assert_eq!(voxel::weight(v), 0.5);
    }

    #[test]
    fn test_subtract_carves_and_clears_material() {
        let mut chunk = solid_chunk(2);
        let coord = ChunkCoord::new(0, 0, 0);
        let sub = op(
            BuildShape::Sphere,
            BuildMode::Subtract,
            Vec3::splat(4.0),
            Vec3::splat(1.0),
            0,
        );
        assert!(apply_to_chunk(&mut chunk, coord, &sub));
        let center = chunk.get(16, 16, 16);
        assert_eq!(voxel::weight(center), -0.5);
        // Fully emptied voxels drop their material on repack.
        assert_eq!(voxel::material(center), 0);
        // Far corner untouched.
        assert_eq!(voxel::weight(chunk.get(0, 0, 31)), 0.5);
    }

    #[test]
    fn test_paint_recolors_solid_only() {
        let mut chunk = solid_chunk(2);
        // Carve an air pocket first.
        chunk.set(16, 16, 16, voxel::AIR);
        let coord = ChunkCoord::new(0, 0, 0);
        let paint = op(
            BuildShape::Cube,
            BuildMode::Paint,
            Vec3::splat(4.0),
            Vec3::splat(0.5),
            9,
        );
        apply_to_chunk(&mut chunk, coord, &paint);
        // Solid neighbor inside the cube is repainted, weight unchanged.
        let painted = chunk.get(17, 16, 16);
        assert_eq!(voxel::material(painted), 9);
        assert_eq!(voxel::weight(painted), 0.5);
        // The air voxel stays air.
        assert_eq!(chunk.get(16, 16, 16), voxel::AIR);
    }

    #[test]
    fn test_fill_overrides_prior_state() {
        let mut chunk = VoxelChunk::new();
        let coord = ChunkCoord::new(0, 0, 0);
        let fill = op(
            BuildShape::Cube,
            BuildMode::Fill,
            Vec3::splat(4.0),
            Vec3::splat(0.75),
            4,
        );
        apply_to_chunk(&mut chunk, coord, &fill);
        let v = chunk.get(16, 16, 16);
        assert_eq!(voxel::weight(v), 0.5);
        assert_eq!(voxel::material(v), 4);
    }

    #[test]
    fn test_fill_with_air_material_empties() {
        let mut chunk = solid_chunk(1);
        let coord = ChunkCoord::new(0, 0, 0);
        let fill = op(
            BuildShape::Cube,
            BuildMode::Fill,
            Vec3::splat(4.0),
            Vec3::splat(0.75),
            0,
        );
        apply_to_chunk(&mut chunk, coord, &fill);
        assert_eq!(chunk.get(16, 16, 16) & 0x1F, 0);
        assert!(!voxel::is_solid(chunk.get(16, 16, 16)));
    }

    #[test]
    fn test_apply_skips_missing_chunks() {
        let mut store = ChunkStore::new();
        store.insert(ChunkCoord::new(0, 0, 0), solid_chunk(1));
        // Sphere at the corner of chunks (0,0,0)..(1,1,1); only one loaded.
        let sub = op(
            BuildShape::Sphere,
            BuildMode::Subtract,
            Vec3::splat(8.0),
            Vec3::splat(1.0),
            0,
        );
        let changed = apply_build_operation(&mut store, &sub);
        assert_eq!(changed, vec![ChunkCoord::new(0, 0, 0)]);
        assert!(store.get(ChunkCoord::new(0, 0, 0)).unwrap().is_dirty());
    }

    #[test]
    fn test_no_change_reports_false() {
        let mut chunk = VoxelChunk::new();
        let coord = ChunkCoord::new(0, 0, 0);
        // Subtracting from air changes nothing.
        let sub = op(
            BuildShape::Sphere,
            BuildMode::Subtract,
            Vec3::splat(4.0),
            Vec3::splat(1.0),
            0,
        );
        assert!(!apply_to_chunk(&mut chunk, coord, &sub));
        assert!(!chunk.is_dirty());
    }
}
