//! Depth-stratified material selection.

use crate::params::StrataLayer;

/// Picks the material for a voxel `depth` meters below the surface.
///
/// The first stratum whose `max_depth` reaches the depth wins; past the
/// deepest stratum the default material is returned.
pub fn material_for_depth(strata: &[StrataLayer], default_material: u8, depth: f32) -> u8 {
    for layer in strata {
        if layer.max_depth >= depth {
            return layer.material;
        }
    }
    default_material
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
