//! Layered fractal height field with domain warp.
//!
//! The surface height at `(x, z)` is the sum of several fBm layers, each
//! compositing octaves of simplex noise. Before evaluation the sample point
//! is displaced by two independent warp noises, which breaks up the grid
//! alignment simplex otherwise shows on large features.

use noise::{NoiseFn, Simplex};

use crate::params::{HeightLayer, TerrainParams, WarpParams};
use crate::seed::noise_seed;

/// Purpose tags for seed derivation, one per noise source.
const PURPOSE_WARP_X: u32 = 0xA1;
const PURPOSE_WARP_Z: u32 = 0xA2;
const PURPOSE_LAYER_BASE: u32 = 0xB0;

/// Samples surface height in meters from layered, domain-warped fBm.
pub struct HeightField {
    layers: Vec<(Simplex, HeightLayer)>,
    warp_x: Simplex,
    warp_z: Simplex,
    warp: WarpParams,
    lacunarity: f64,
    persistence: f64,
}

impl HeightField {
    /// Builds the height field's noise sources from the world seed.
    pub fn new(world_seed: u64, params: &TerrainParams) -> Self {
        let layers = params
            .height_layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let noise = Simplex::new(noise_seed(world_seed, PURPOSE_LAYER_BASE + i as u32));
                (noise, layer.clone())
            })
            .collect();
        Self {
            layers,
            warp_x: Simplex::new(noise_seed(world_seed, PURPOSE_WARP_X)),
            warp_z: Simplex::new(noise_seed(world_seed, PURPOSE_WARP_Z)),
            warp: params.warp.clone(),
            lacunarity: params.lacunarity,
            persistence: params.persistence,
        }
    }

    /// Surface height in meters at world `(x, z)`.
    pub fn sample(&self, x: f64, z: f64) -> f32 {
        let (wx, wz) = self.warp_point(x, z);
        let mut total = 0.0;
        for (noise, layer) in &self.layers {
            total += fbm(
                noise,
                wx,
                wz,
                layer.frequency,
                layer.amplitude,
                layer.octaves,
                self.lacunarity,
                self.persistence,
            );
        }
        total as f32
    }

    /// Applies the domain warp to a sample point.
    fn warp_point(&self, x: f64, z: f64) -> (f64, f64) {
        if self.warp.amplitude == 0.0 {
            return (x, z);
        }
        let dx = fbm(
            &self.warp_x,
            x,
            z,
            self.warp.frequency,
            self.warp.amplitude,
            self.warp.octaves,
            self.lacunarity,
            self.persistence,
        );
        let dz = fbm(
            &self.warp_z,
            x,
            z,
            self.warp.frequency,
            self.warp.amplitude,
            self.warp.octaves,
            self.lacunarity,
            self.persistence,
        );
        (x + dx, z + dz)
    }
}

/// Multi-octave fractal Brownian motion over one simplex source.
#[allow(clippy::too_many_arguments)]
fn fbm(
    noise: &Simplex,
    x: f64,
    z: f64,
    frequency: f64,
    amplitude: f64,
    octaves: u32,
    lacunarity: f64,
    persistence: f64,
) -> f64 {
    let mut total = 0.0;
    let mut freq = frequency;
    let mut amp = amplitude;
    for _ in 0..octaves {
        total += noise.get([x * freq, z * freq]) * amp;
        freq *= lacunarity;
        amp *= persistence;
    }
    total
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
