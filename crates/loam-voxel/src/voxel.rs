//! The 16-bit packed voxel codec.
//!
//! Layout, LSB to MSB: 5 bits of signed density ("weight"), 7 bits of
//! material id, 4 bits of light. Weight spans `[-0.5, +0.5]` in steps of
//! 1/30, biased so that code 15 is exactly zero. A voxel is solid when its
//! quantized weight is strictly positive.

/// Number of quantization steps per unit weight. ±0.5 maps to ±15.
const WEIGHT_SCALE: f32 = 30.0;

/// Bias added to the signed quantized weight before storage.
const WEIGHT_BIAS: i32 = 15;

/// Highest valid stored weight code. Code 31 is tolerated on read and
/// clamps to +0.5.
const WEIGHT_CODE_MAX: i32 = 30;

/// A fully-empty voxel: weight −0.5, material 0, light 0.
pub const AIR: u16 = 0;

/// Packs weight, material, and light into a 16-bit voxel.
///
/// `weight` is clamped to `[-0.5, +0.5]`, `material` to `[0, 127]`, `light`
/// to `[0, 15]`. A fully-empty voxel (weight at −0.5) always packs with
/// material 0, so air never carries a stray material on the wire.
pub fn pack(weight: f32, material: u8, light: u8) -> u16 {
    let q = (weight.clamp(-0.5, 0.5) * WEIGHT_SCALE).round() as i32;
    let code = (q + WEIGHT_BIAS).clamp(0, WEIGHT_CODE_MAX) as u16;
    let material = if code == 0 { 0 } else { material.min(127) as u16 };
    let light = light.min(15) as u16;
    code | (material << 5) | (light << 12)
}

/// Unpacks a voxel into `(weight, material, light)`.
///
/// Inverse of [`pack`]: weight round-trips to within one quantization step
/// (1/30), material and light exactly.
pub fn unpack(voxel: u16) -> (f32, u8, u8) {
    (weight(voxel), material(voxel), light(voxel))
}

/// The decoded weight in `[-0.5, +0.5]`.
pub fn weight(voxel: u16) -> f32 {
    let code = ((voxel & 0x1F) as i32).min(WEIGHT_CODE_MAX);
    (code - WEIGHT_BIAS) as f32 / WEIGHT_SCALE
}

/// The 7-bit material id.
pub fn material(voxel: u16) -> u8 {
    ((voxel >> 5) & 0x7F) as u8
}

/// The 4-bit light value.
pub fn light(voxel: u16) -> u8 {
    (voxel >> 12) as u8
}

/// True iff the quantized weight is strictly positive.
///
/// A weight of exactly zero (the isosurface) is non-solid.
pub fn is_solid(voxel: u16) -> bool {
    ((voxel & 0x1F) as i32) > WEIGHT_BIAS
}

/// Flat index of a local voxel coordinate, x varying fastest.
pub fn voxel_index(x: usize, y: usize, z: usize) -> usize {
    use crate::chunk::CHUNK_SIZE;
    debug_assert!(x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE);
    x + y * CHUNK_SIZE + z * CHUNK_SIZE * CHUNK_SIZE
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_round_trip_exactly() {
        for w in [-0.5f32, 0.0, 0.5] {
            let (rw, _, _) = unpack(pack(w, 3, 7));
            assert_eq!(rw, w, "weight {w} must round-trip exactly");
        }
    }

    #[test]
    fn test_weight_round_trips_within_one_step() {
        let step = 1.0 / 30.0;
        let mut w = -0.5f32;
        while w <= 0.5 {
            let (rw, _, _) = unpack(pack(w, 1, 0));
            assert!(
                (rw - w).abs() <= step / 2.0 + 1e-6,
                "weight {w} decoded as {rw}"
            );
            w += 0.01;
        }
    }

    #[test]
    fn test_material_and_light_round_trip_exactly() {
        for m in 0..=127u8 {
            for l in [0u8, 5, 15] {
                let v = pack(0.25, m, l);
                assert_eq!(material(v), m);
                assert_eq!(light(v), l);
            }
        }
    }

    #[test]
    fn test_out_of_range_inputs_clamp() {
        let v = pack(7.0, 255, 99);
        assert_eq!(weight(v), 0.5);
        assert_eq!(material(v), 127);
        assert_eq!(light(v), 15);

        let v = pack(-7.0, 255, 99);
        assert_eq!(weight(v), -0.5);
    }

    #[test]
    fn test_fully_empty_voxel_drops_material() {
        let v = pack(-0.5, 42, 3);
        assert_eq!(material(v), 0);
        // Light is independent of the air rule.
        assert_eq!(light(v), 3);
    }

    #[test]
    fn test_solidity_matches_unpacked_weight() {
        for code in 0u16..32 {
            for m in [0u16, 64] {
                let v = code | (m << 5);
                assert_eq!(is_solid(v), weight(v) > 0.0, "code {code}");
            }
        }
    }

    #[test]
    fn test_zero_weight_is_not_solid() {
        assert!(!is_solid(pack(0.0, 5, 0)));
    }

    #[test]
    fn test_stray_code_31_clamps_to_full() {
        let v = 31u16 | (9 << 5);
        assert_eq!(weight(v), 0.5);
        assert!(is_solid(v));
    }

    #[test]
    fn test_air_constant_is_empty() {
        assert_eq!(weight(AIR), -0.5);
        assert_eq!(material(AIR), 0);
        assert!(!is_solid(AIR));
    }

    #[test]
    fn test_voxel_index_ordering() {
        assert_eq!(voxel_index(0, 0, 0), 0);
        assert_eq!(voxel_index(1, 0, 0), 1);
        assert_eq!(voxel_index(0, 1, 0), 32);
        assert_eq!(voxel_index(0, 0, 1), 1024);
        assert_eq!(voxel_index(31, 31, 31), 32767);
    }
}
