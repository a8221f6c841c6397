//! Mesh output types and material layer classification.

use bytemuck::{Pod, Zeroable};

/// One mesh vertex, laid out for direct GPU upload.
///
/// `material_ids[..3]` are the up-to-three dominant materials blended at
/// this vertex (the fourth byte is padding); `material_weights` are the
/// matching blend factors and sum to 1.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Chunk-local position in meters.
    pub position: [f32; 3],
    /// Outward surface normal.
    pub normal: [f32; 3],
    /// Dominant material ids; the fourth byte is unused padding.
    pub material_ids: [u8; 4],
    /// Blend weights for the three materials, summing to 1.
    pub material_weights: [f32; 3],
    /// Averaged voxel light at the vertex, normalized to `[0, 1]`.
    pub light: f32,
}

/// A triangle mesh for one material layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceMesh {
    /// Vertex buffer.
    pub vertices: Vec<MeshVertex>,
    /// Triangle indices, three per triangle.
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    /// True when the mesh holds no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Which of the three output meshes a surface belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshLayer {
    /// Opaque terrain and builds.
    Solid,
    /// Alpha-blended materials (e.g. foliage).
    Transparent,
    /// Liquid surfaces.
    Liquid,
}

/// The mesher's full output: one mesh per layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshLayers {
    pub solid: SurfaceMesh,
    pub transparent: SurfaceMesh,
    pub liquid: SurfaceMesh,
}

impl MeshLayers {
    /// True when every layer is empty.
    pub fn is_empty(&self) -> bool {
        self.solid.is_empty() && self.transparent.is_empty() && self.liquid.is_empty()
    }

    /// The mesh for a layer.
    pub fn layer_mut(&mut self, layer: MeshLayer) -> &mut SurfaceMesh {
        match layer {
            MeshLayer::Solid => &mut self.solid,
            MeshLayer::Transparent => &mut self.transparent,
            MeshLayer::Liquid => &mut self.liquid,
        }
    }
}

/// Assigns material ids to mesh layers.
#[derive(Clone, Debug)]
pub struct MaterialClasses {
    /// Materials rendered as liquid.
    pub liquid: Vec<u8>,
    /// Materials rendered with transparency.
    pub transparent: Vec<u8>,
}

impl Default for MaterialClasses {
    fn default() -> Self {
        Self {
            liquid: vec![5],      // water
            transparent: vec![7], // foliage
        }
    }
}

impl MaterialClasses {
    /// The layer a material belongs to.
    pub fn classify(&self, material: u8) -> MeshLayer {
        if self.liquid.contains(&material) {
            MeshLayer::Liquid
        } else if self.transparent.contains(&material) {
            MeshLayer::Transparent
        } else {
            MeshLayer::Solid
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
