//! Build operation description and spatial extent.

use glam::Vec3;
use loam_math::Aabb;
use loam_voxel::{CHUNK_EXTENT, ChunkCoord};

use crate::shape::{BuildShape, ShapeParams};

/// Width of the density transition band around a shape surface, meters.
/// The operation's AABB is padded by this much so edge voxels soften.
pub const BLEND_BAND: f32 = 0.5;

/// How an operation combines with existing voxels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildMode {
    /// Raise density toward solid and take the operation's material.
    Add,
    /// Lower density toward empty; fully emptied voxels lose their material.
    Subtract,
    /// Replace the material of solid voxels; density untouched.
    Paint,
    /// Force density and material inside the shape, ignoring prior state.
    Fill,
}

/// A parameterized volumetric edit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildOperation {
    /// Shape center in world meters.
    pub center: Vec3,
    /// Shape variant.
    pub shape: BuildShape,
    /// Combine mode.
    pub mode: BuildMode,
    /// Half-extents (cube/prism) or radii (sphere/cylinder), meters.
    pub size: Vec3,
    /// Material id applied by Add/Paint/Fill.
    pub material: u8,
    /// Hollow shell thickness; `None` is solid.
    pub thickness: Option<f32>,
    /// Close the ends of hollow cylinders.
    pub closed: bool,
    /// Cylinder angular extent in radians; `None` is the full circle.
    pub arc_sweep: Option<f32>,
    /// Yaw rotation in radians.
    pub rotation: f32,
}

impl BuildOperation {
    /// Signed distance from the shape surface at a world-space point.
    pub fn signed_distance(&self, world: Vec3) -> f32 {
        let d = world - self.center;
        // Un-rotate about Y into the shape's local frame.
        let (sin, cos) = (libm::sinf(self.rotation), libm::cosf(self.rotation));
        let local = Vec3::new(d.x * cos + d.z * sin, d.y, -d.x * sin + d.z * cos);
        self.shape.signed_distance(local, &self.shape_params())
    }

    /// World-space bounding box, padded by the blend band.
    ///
    /// Rotation is folded in by widening the horizontal extents to the XZ
    /// diagonal, so the box bounds every yaw.
    pub fn aabb(&self) -> Aabb {
        let horizontal = if self.rotation == 0.0 {
            Vec3::new(self.size.x, 0.0, self.size.z)
        } else {
            let r = (self.size.x * self.size.x + self.size.z * self.size.z).sqrt();
            Vec3::new(r, 0.0, r)
        };
        let half = Vec3::new(horizontal.x, self.size.y, horizontal.z) + Vec3::splat(BLEND_BAND);
        Aabb::from_center_half_extents(self.center, half)
    }

    /// Chunks whose volumes intersect the operation, computable without
    /// scanning the world.
    pub fn affected_chunks(&self) -> Vec<ChunkCoord> {
        let aabb = self.aabb();
        let lo = (aabb.min / CHUNK_EXTENT).floor();
        let hi = (aabb.max / CHUNK_EXTENT).floor();
        let mut coords = Vec::new();
        for cz in lo.z as i32..=hi.z as i32 {
            for cy in lo.y as i32..=hi.y as i32 {
                for cx in lo.x as i32..=hi.x as i32 {
                    coords.push(ChunkCoord::new(cx, cy, cz));
                }
            }
        }
        coords
    }

    fn shape_params(&self) -> ShapeParams {
        ShapeParams {
            size: self.size,
            thickness: self.thickness,
            closed: self.closed,
            arc_sweep: self.arc_sweep,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
