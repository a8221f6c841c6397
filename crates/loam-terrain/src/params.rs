//! Terrain generation parameters with canonical defaults and RON-friendly
//! serde support.

use serde::{Deserialize, Serialize};

/// One fractal-noise layer contributing to the height field.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeightLayer {
    /// Peak contribution of the first octave, in meters.
    pub amplitude: f64,
    /// Frequency of the first octave (cycles per meter).
    pub frequency: f64,
    /// Number of octaves composited.
    pub octaves: u32,
}

impl Default for HeightLayer {
    fn default() -> Self {
        Self {
            amplitude: 12.0,
            frequency: 0.004,
            octaves: 3,
        }
    }
}

/// Domain-warp settings applied to `(x, z)` before height evaluation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WarpParams {
    /// Maximum displacement in meters.
    pub amplitude: f64,
    /// Warp noise frequency.
    pub frequency: f64,
    /// Octaves of warp noise.
    pub octaves: u32,
}

impl Default for WarpParams {
    fn default() -> Self {
        Self {
            amplitude: 8.0,
            frequency: 0.008,
            octaves: 2,
        }
    }
}

/// One material stratum: the first layer whose `max_depth` reaches the
/// queried depth wins.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct StrataLayer {
    /// Material id for this stratum.
    pub material: u8,
    /// Depth below the surface, in meters, down to which this stratum runs.
    pub max_depth: f32,
}

/// Standing-water settings inside pathway dips.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaterParams {
    /// Material id for water voxels.
    pub material: u8,
    /// Water surface sits this far below the undipped surface, in meters.
    pub depth: f32,
}

impl Default for WaterParams {
    fn default() -> Self {
        Self {
            material: 5,
            depth: 0.5,
        }
    }
}

/// Cellular pathway overlay settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathwayParams {
    /// Frequency of the cellular field defining path cells.
    pub cell_frequency: f64,
    /// Domain-warp amplitude applied before the cellular lookup, in meters.
    pub warp_amplitude: f64,
    /// Domain-warp frequency for the cellular lookup.
    pub warp_frequency: f64,
    /// Width of a path band, in meters.
    pub path_width: f64,
    /// How far the surface dips at the center of a path, in meters.
    pub dip_depth: f32,
    /// Palette of path surface materials.
    pub materials: Vec<u8>,
    /// Frequency of the low-frequency noise picking from the palette.
    pub material_frequency: f64,
    /// Material used for wall voxels.
    pub wall_material: u8,
    /// Wall height above the dipped surface, in meters.
    pub wall_height: f32,
    /// Path materials that grow walls along their edges.
    pub wall_materials: Vec<u8>,
    /// Width of the border band outside the wall, in meters.
    pub border_width: f64,
    /// Material used for border voxels.
    pub border_material: u8,
    /// Standing water inside dips, if enabled.
    pub water: Option<WaterParams>,
}

impl Default for PathwayParams {
    fn default() -> Self {
        Self {
            cell_frequency: 0.01,
            warp_amplitude: 6.0,
            warp_frequency: 0.02,
            path_width: 3.0,
            dip_depth: 0.75,
            materials: vec![8, 9, 10],
            material_frequency: 0.002,
            wall_material: 11,
            wall_height: 1.0,
            wall_materials: vec![8],
            border_width: 1.0,
            border_material: 12,
            water: Some(WaterParams::default()),
        }
    }
}

/// Surface stamp (tree/rock) scattering settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StampParams {
    /// Minimum spacing between stamp anchors, in meters.
    pub min_spacing: f64,
    /// Candidate placements attempted per tile.
    pub attempts: u32,
    /// Probability in `[0, 1]` that a placement is a tree (else a rock).
    pub tree_chance: f64,
    /// Trunk material id.
    pub trunk_material: u8,
    /// Foliage material id.
    pub leaf_material: u8,
    /// Rock material id.
    pub rock_material: u8,
    /// Trunk height range in meters, scaled by the placement scale.
    pub trunk_height: f32,
    /// Foliage sphere radius in meters, scaled by the placement scale.
    pub leaf_radius: f32,
    /// Rock hemisphere radius in meters, scaled by the placement scale.
    pub rock_radius: f32,
    /// Placement scale range `[min, max]`.
    pub scale_range: (f64, f64),
}

impl Default for StampParams {
    fn default() -> Self {
        Self {
            min_spacing: 6.0,
            attempts: 24,
            tree_chance: 0.7,
            trunk_material: 6,
            leaf_material: 7,
            rock_material: 3,
            trunk_height: 3.0,
            leaf_radius: 1.5,
            rock_radius: 0.8,
            scale_range: (0.75, 1.4),
        }
    }
}

/// Complete terrain generation parameter set.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainParams {
    /// Height-field layers, summed.
    pub height_layers: Vec<HeightLayer>,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Domain warp applied before height evaluation.
    pub warp: WarpParams,
    /// Material strata ordered from the surface down.
    pub strata: Vec<StrataLayer>,
    /// Material returned below the deepest stratum.
    pub default_material: u8,
    /// Pathway overlay; `None` disables it.
    pub pathways: Option<PathwayParams>,
    /// Stamp scattering; `None` disables it.
    pub stamps: Option<StampParams>,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            height_layers: vec![
                // Broad hills.
                HeightLayer {
                    amplitude: 12.0,
                    frequency: 0.004,
                    octaves: 3,
                },
                // Medium bumps.
                HeightLayer {
                    amplitude: 2.5,
                    frequency: 0.02,
                    octaves: 2,
                },
            ],
            lacunarity: 2.0,
            persistence: 0.5,
            warp: WarpParams::default(),
            strata: vec![
                StrataLayer {
                    material: 1, // grass
                    max_depth: 1.2,
                },
                StrataLayer {
                    material: 2, // dirt
                    max_depth: 4.0,
                },
            ],
            default_material: 3, // stone
            pathways: Some(PathwayParams::default()),
            stamps: Some(StampParams::default()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_two_height_layers() {
        let p = TerrainParams::default();
        assert_eq!(p.height_layers.len(), 2);
        assert!(p.pathways.is_some());
        assert!(p.stamps.is_some());
    }

    #[test]
    fn test_params_round_trip_through_ron() {
        let p = TerrainParams::default();
        let text = ron::to_string(&p).expect("serialize");
        let back: TerrainParams = ron::from_str(&text).expect("deserialize");
        assert_eq!(back, p);
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let p: TerrainParams = ron::from_str("(default_material: 9)").expect("deserialize");
        assert_eq!(p.default_material, 9);
        assert_eq!(p.lacunarity, 2.0);
    }
}
