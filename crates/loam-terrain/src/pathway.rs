//! Cellular pathway overlay.
//!
//! A warped Worley value field partitions the plane into irregular cells.
//! Positions near a boundary between two cells form a path band; the band
//! dips into the terrain, gets its own surface material, and can grow a
//! wall on its high-value side and a border strip on the low-value side.

use noise::core::worley::ReturnType;
use noise::{NoiseFn, Simplex, Worley};

use loam_math::smoothstep;

use crate::params::PathwayParams;
use crate::seed::noise_seed;

/// Two cell values closer than this belong to the same cell.
const CELL_EPSILON: f64 = 1e-3;

/// Probe step used to detect walls just outside the path edge, in meters.
/// One voxel keeps the wall band a single column wide.
const WALL_PROBE: f64 = 0.25;

const PURPOSE_CELL: u32 = 0xC0;
const PURPOSE_WARP_X: u32 = 0xC1;
const PURPOSE_WARP_Z: u32 = 0xC2;
const PURPOSE_PALETTE: u32 = 0xC3;

/// Per-column pathway classification.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathwaySample {
    /// The column lies on a path band.
    pub on_path: bool,
    /// Surface lowering in meters (nonzero only on paths).
    pub dip: f32,
    /// Path surface material (valid when `on_path`).
    pub material: u8,
    /// The column carries a wall.
    pub wall: bool,
    /// The column lies in the border strip.
    pub border: bool,
}

/// Evaluates the cellular pathway field.
pub struct PathwayField {
    cell: Worley,
    warp_x: Simplex,
    warp_z: Simplex,
    palette_noise: Simplex,
    params: PathwayParams,
}

impl PathwayField {
    /// Builds the field's noise sources from the world seed.
    pub fn new(world_seed: u64, params: &PathwayParams) -> Self {
        Self {
            cell: Worley::new(noise_seed(world_seed, PURPOSE_CELL))
                .set_return_type(ReturnType::Value)
                .set_frequency(params.cell_frequency),
            warp_x: Simplex::new(noise_seed(world_seed, PURPOSE_WARP_X)),
            warp_z: Simplex::new(noise_seed(world_seed, PURPOSE_WARP_Z)),
            palette_noise: Simplex::new(noise_seed(world_seed, PURPOSE_PALETTE)),
            params: params.clone(),
        }
    }

    /// Classifies world `(x, z)`.
    pub fn sample(&self, x: f64, z: f64) -> PathwaySample {
        let p = &self.params;
        let half = p.path_width / 2.0;
        let center = self.cell_value(x, z);

        // Edge-of-cell detection: a position is on a path iff the cell value
        // changes within half a path width on any axis.
        let offsets = [(half, 0.0), (-half, 0.0), (0.0, half), (0.0, -half)];
        let mut differing = 0u32;
        for (dx, dz) in offsets {
            if (self.cell_value(x + dx, z + dz) - center).abs() > CELL_EPSILON {
                differing += 1;
            }
        }

        if differing > 0 {
            // More differing probes means the position sits closer to the
            // cell boundary, hence deeper into the path.
            let toward_edge = differing as f32 / 4.0;
            return PathwaySample {
                on_path: true,
                dip: p.dip_depth * smoothstep(0.0, 1.0, toward_edge),
                material: self.palette_pick(x, z),
                wall: false,
                border: false,
            };
        }

        // Wall: just outside the path, on the side where the center cell
        // value is the larger of the two, and only for wall-growing path
        // materials.
        let wall_reach = half + WALL_PROBE;
        for (dx, dz) in [
            (wall_reach, 0.0),
            (-wall_reach, 0.0),
            (0.0, wall_reach),
            (0.0, -wall_reach),
        ] {
            let neighbor = self.cell_value(x + dx, z + dz);
            if (neighbor - center).abs() > CELL_EPSILON && center > neighbor {
                let path_material = self.palette_pick(x + dx, z + dz);
                if p.wall_materials.contains(&path_material) {
                    return PathwaySample {
                        wall: true,
                        ..PathwaySample::default()
                    };
                }
            }
        }

        // Border: the low-value side of the path, within the border width.
        let border_reach = half + WALL_PROBE + p.border_width;
        for (dx, dz) in [
            (border_reach, 0.0),
            (-border_reach, 0.0),
            (0.0, border_reach),
            (0.0, -border_reach),
        ] {
            let neighbor = self.cell_value(x + dx, z + dz);
            if (neighbor - center).abs() > CELL_EPSILON && center < neighbor {
                return PathwaySample {
                    border: true,
                    ..PathwaySample::default()
                };
            }
        }

        PathwaySample::default()
    }

    /// Cell value at a point, after the pathway's own domain warp.
    fn cell_value(&self, x: f64, z: f64) -> f64 {
        let p = &self.params;
        let wx = x + self.warp_x.get([x * p.warp_frequency, z * p.warp_frequency]) * p.warp_amplitude;
        let wz = z + self.warp_z.get([x * p.warp_frequency, z * p.warp_frequency]) * p.warp_amplitude;
        self.cell.get([wx, wz])
    }

    /// Picks a path material from the palette by low-frequency noise.
    fn palette_pick(&self, x: f64, z: f64) -> u8 {
        let p = &self.params;
        if p.materials.is_empty() {
            return 0;
        }
        let f = p.material_frequency;
        let v = (self.palette_noise.get([x * f, z * f]) + 1.0) / 2.0;
        let idx = ((v * p.materials.len() as f64) as usize).min(p.materials.len() - 1);
        p.materials[idx]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PathwayParams;

    fn field(seed: u64) -> PathwayField {
        PathwayField::new(seed, &PathwayParams::default())
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let a = field(77);
        let b = field(77);
        for i in 0..64 {
            let x = i as f64 * 17.3;
            let z = i as f64 * -9.8;
            assert_eq!(a.sample(x, z), b.sample(x, z));
        }
    }

    #[test]
    fn test_paths_exist_somewhere() {
        let f = field(3);
        let found = (0..4000).any(|i| {
            let x = (i % 200) as f64 * 2.0;
            let z = (i / 200) as f64 * 2.0;
            f.sample(x, z).on_path
        });
        assert!(found, "no path band in an 400x40 m region");
    }

    #[test]
    fn test_cell_interiors_exist_somewhere() {
        let f = field(3);
        let found = (0..400).any(|i| {
            let x = (i % 20) as f64 * 10.0;
            let z = (i / 20) as f64 * 10.0;
            let s = f.sample(x, z);
            !s.on_path && !s.wall && !s.border
        });
        assert!(found, "everything classified as path/wall/border");
    }

    #[test]
    fn test_path_material_comes_from_palette() {
        let params = PathwayParams::default();
        let f = field(11);
        for i in 0..4000 {
            let x = (i % 200) as f64 * 2.0;
            let z = (i / 200) as f64 * 2.0;
            let s = f.sample(x, z);
            if s.on_path {
                assert!(params.materials.contains(&s.material));
            }
        }
    }

    #[test]
    fn test_dip_bounded_by_dip_depth() {
        let params = PathwayParams::default();
        let f = field(23);
        for i in 0..4000 {
            let x = (i % 200) as f64 * 1.5;
            let z = (i / 200) as f64 * 1.5;
            let s = f.sample(x, z);
            assert!(s.dip >= 0.0 && s.dip <= params.dip_depth);
            if !s.on_path {
                assert_eq!(s.dip, 0.0);
            }
        }
    }

    #[test]
    fn test_flags_are_mutually_exclusive() {
        let f = field(42);
        for i in 0..4000 {
            let x = (i % 200) as f64 * 1.1;
            let z = (i / 200) as f64 * 1.1;
            let s = f.sample(x, z);
            let set = [s.on_path, s.wall, s.border].iter().filter(|&&b| b).count();
            assert!(set <= 1, "overlapping classification at ({x}, {z})");
        }
    }
}
