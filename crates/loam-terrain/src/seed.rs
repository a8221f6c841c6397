//! Deterministic seed derivation for per-tile generation.
//!
//! Stamp placement and any other per-tile randomness derive their RNG from
//! the world seed and tile coordinate, so regeneration of the same tile is
//! bit-identical on every run and platform.

use std::hash::{DefaultHasher, Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Derives a u64 seed for a tile from the world seed and `(tx, tz)`.
///
/// Uses SipHash (std's `DefaultHasher`) to spread the inputs into a
/// well-distributed u64.
pub fn derive_tile_seed(world_seed: u64, tx: i32, tz: i32) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    tx.hash(&mut hasher);
    tz.hash(&mut hasher);
    hasher.finish()
}

/// Deterministic RNG for a tile: identical sequences for identical
/// `(world_seed, tx, tz)` regardless of thread or platform.
pub fn tile_rng(world_seed: u64, tx: i32, tz: i32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_tile_seed(world_seed, tx, tz))
}

/// Derives a 32-bit noise seed for one of the generator's noise sources.
///
/// `purpose` distinguishes the sources (height layers, warp axes, cell
/// field, palette pick) so they decorrelate.
pub fn noise_seed(world_seed: u64, purpose: u32) -> u32 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    purpose.hash(&mut hasher);
    hasher.finish() as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_inputs_same_seed() {
        assert_eq!(derive_tile_seed(42, 3, -7), derive_tile_seed(42, 3, -7));
    }

    #[test]
    fn test_different_tiles_different_seeds() {
        let a = derive_tile_seed(42, 0, 0);
        assert_ne!(a, derive_tile_seed(42, 1, 0));
        assert_ne!(a, derive_tile_seed(42, 0, 1));
        assert_ne!(a, derive_tile_seed(43, 0, 0));
    }

    #[test]
    fn test_tile_rng_reproduces_sequence() {
        let mut a = tile_rng(7, 2, 2);
        let mut b = tile_rng(7, 2, 2);
        for _ in 0..16 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }

    #[test]
    fn test_noise_seed_varies_by_purpose() {
        assert_ne!(noise_seed(1, 0), noise_seed(1, 1));
    }
}
