//! Per-chunk face-to-face connectivity: a 15-bit summary of which pairs of
//! chunk faces are joined by a path of face-adjacent non-solid voxels.
//!
//! The summary is recomputed after every voxel-data change and consumed by
//! the chunk-graph visibility search, which never has to look at voxels
//! again once the bits exist.

use crate::chunk::{CHUNK_SIZE, CHUNK_VOLUME};
use crate::face::Face;
use crate::voxel;

/// Bitset over the 15 unordered pairs of the six chunk faces.
///
/// Bit `(i, j)` is set iff some connected component of non-solid voxels
/// touches both face `i` and face `j`. Symmetric by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceConnectivity(u16);

impl FaceConnectivity {
    /// No face pair connected (a completely solid chunk).
    pub const EMPTY: Self = Self(0);

    /// Every face pair connected. Used for chunks whose voxels are not
    /// available (missing or pending), which must not block traversal.
    pub const FULLY_OPEN: Self = Self(0x7FFF);

    /// Builds a connectivity value from raw bits (low 15 used).
    pub fn from_bits(bits: u16) -> Self {
        Self(bits & 0x7FFF)
    }

    /// The raw 15-bit pair mask.
    pub fn bits(self) -> u16 {
        self.0
    }

    /// True iff a non-solid path joins faces `a` and `b`.
    ///
    /// `connects(f, f)` is trivially true: re-exiting the entry face is
    /// always admissible.
    pub fn connects(self, a: Face, b: Face) -> bool {
        if a == b {
            return true;
        }
        self.0 & (1 << pair_index(a, b)) != 0
    }

    /// Marks faces `a` and `b` as connected. `a == b` is a no-op.
    pub fn connect(&mut self, a: Face, b: Face) {
        if a != b {
            self.0 |= 1 << pair_index(a, b);
        }
    }
}

/// Bit index of the unordered face pair `(a, b)`, `a != b`.
fn pair_index(a: Face, b: Face) -> u16 {
    let (i, j) = if a.index() < b.index() {
        (a.index() as u16, b.index() as u16)
    } else {
        (b.index() as u16, a.index() as u16)
    };
    i * 6 - i * (i + 1) / 2 + (j - i - 1)
}

/// Computes the face connectivity of a raw voxel buffer.
///
/// Flood-fills non-solid voxels from every boundary voxel; each connected
/// component contributes all pairs among the faces it touches. O(S³).
pub fn compute_connectivity(data: &[u16]) -> FaceConnectivity {
    debug_assert_eq!(data.len(), CHUNK_VOLUME);
    let s = CHUNK_SIZE;
    let mut result = FaceConnectivity::EMPTY;
    let mut visited = vec![false; CHUNK_VOLUME];
    let mut stack: Vec<usize> = Vec::new();

    let mut flood = |seed: usize, visited: &mut Vec<bool>, stack: &mut Vec<usize>| {
        stack.clear();
        stack.push(seed);
        visited[seed] = true;
        let mut touched = [false; 6];
        while let Some(idx) = stack.pop() {
            let x = idx % s;
            let y = (idx / s) % s;
            let z = idx / (s * s);
            if x == 0 {
                touched[Face::NegX.index()] = true;
            }
            if x == s - 1 {
                touched[Face::PosX.index()] = true;
            }
            if y == 0 {
                touched[Face::NegY.index()] = true;
            }
            if y == s - 1 {
                touched[Face::PosY.index()] = true;
            }
            if z == 0 {
                touched[Face::NegZ.index()] = true;
            }
            if z == s - 1 {
                touched[Face::PosZ.index()] = true;
            }
            let mut push = |nidx: usize, visited: &mut Vec<bool>, stack: &mut Vec<usize>| {
                if !visited[nidx] && !voxel::is_solid(data[nidx]) {
                    visited[nidx] = true;
                    stack.push(nidx);
                }
            };
            if x > 0 {
                push(idx - 1, visited, stack);
            }
            if x < s - 1 {
                push(idx + 1, visited, stack);
            }
            if y > 0 {
                push(idx - s, visited, stack);
            }
            if y < s - 1 {
                push(idx + s, visited, stack);
            }
            if z > 0 {
                push(idx - s * s, visited, stack);
            }
            if z < s - 1 {
                push(idx + s * s, visited, stack);
            }
        }
        touched
    };

    // Seed only from boundary voxels: interior components can't touch a face.
    for z in 0..s {
        for y in 0..s {
            for x in 0..s {
                let boundary =
                    x == 0 || x == s - 1 || y == 0 || y == s - 1 || z == 0 || z == s - 1;
                if !boundary {
                    continue;
                }
                let idx = voxel::voxel_index(x, y, z);
                if visited[idx] || voxel::is_solid(data[idx]) {
                    continue;
                }
                let touched = flood(idx, &mut visited, &mut stack);
                for a in Face::ALL {
                    for b in Face::ALL {
                        if a.index() < b.index() && touched[a.index()] && touched[b.index()] {
                            result.connect(a, b);
                        }
                    }
                }
            }
        }
    }

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
