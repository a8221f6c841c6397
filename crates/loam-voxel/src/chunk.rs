//! Fixed-size voxel chunks: a flat array of 32³ packed voxels plus the
//! bookkeeping the streaming and meshing layers need (dirty flag, last
//! applied build sequence, face connectivity summary).

use crate::connectivity::FaceConnectivity;
use crate::neighbors::NeighborChunks;
use crate::voxel::{self, AIR};

/// Side length of a chunk in voxels.
pub const CHUNK_SIZE: usize = 32;

/// Total number of voxels in a chunk (32³).
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Edge length of a voxel in world meters.
pub const VOXEL_SIZE: f32 = 0.25;

/// Edge length of a chunk in world meters.
pub const CHUNK_EXTENT: f32 = CHUNK_SIZE as f32 * VOXEL_SIZE;

/// A 32×32×32 block of packed voxels.
///
/// Storage is a flat array indexed `x + y·S + z·S²`. Mutation happens on
/// exactly two paths: voxel ingest (a whole-buffer copy from the server) and
/// build-operation application. Out-of-bounds writes are silently ignored.
#[derive(Clone, Debug)]
pub struct VoxelChunk {
    data: Vec<u16>,
    dirty: bool,
    last_build_seq: u32,
    connectivity: Option<FaceConnectivity>,
}

impl VoxelChunk {
    /// Creates a chunk filled entirely with air.
    pub fn new() -> Self {
        Self {
            data: vec![AIR; CHUNK_VOLUME],
            dirty: false,
            last_build_seq: 0,
            connectivity: None,
        }
    }

    /// Creates a chunk from a raw voxel buffer.
    ///
    /// Returns `None` unless `data` holds exactly [`CHUNK_VOLUME`] voxels.
    pub fn from_raw(data: Vec<u16>) -> Option<Self> {
        if data.len() != CHUNK_VOLUME {
            return None;
        }
        Some(Self {
            data,
            dirty: false,
            last_build_seq: 0,
            connectivity: None,
        })
    }

    /// Returns the packed voxel at `(x, y, z)`, or [`AIR`] when any
    /// coordinate is out of bounds.
    pub fn get(&self, x: i32, y: i32, z: i32) -> u16 {
        if !in_bounds(x, y, z) {
            return AIR;
        }
        self.data[voxel::voxel_index(x as usize, y as usize, z as usize)]
    }

    /// Returns the packed voxel at an in-bounds local coordinate.
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> u16 {
        self.data[voxel::voxel_index(x, y, z)]
    }

    /// Writes a packed voxel without touching the dirty flag.
    ///
    /// Out-of-bounds coordinates are a silent no-op.
    pub fn set(&mut self, x: i32, y: i32, z: i32, value: u16) {
        if !in_bounds(x, y, z) {
            return;
        }
        self.data[voxel::voxel_index(x as usize, y as usize, z as usize)] = value;
    }

    /// Writes a packed voxel and marks the chunk dirty iff the write landed
    /// in bounds.
    pub fn edit(&mut self, x: i32, y: i32, z: i32, value: u16) {
        if !in_bounds(x, y, z) {
            return;
        }
        self.data[voxel::voxel_index(x as usize, y as usize, z as usize)] = value;
        self.dirty = true;
    }

    /// Samples with a one-voxel margin: coordinates in `[-1, CHUNK_SIZE]`
    /// resolve through the appropriate face, edge, or corner neighbor.
    ///
    /// When the neighbor is not loaded the coordinate is clamped back into
    /// this chunk, which extrapolates the local field instead of introducing
    /// a false surface at the unloaded border.
    pub fn sample_with_margin(&self, x: i32, y: i32, z: i32, neighbors: &NeighborChunks) -> u16 {
        let s = CHUNK_SIZE as i32;
        debug_assert!((-1..=s).contains(&x) && (-1..=s).contains(&y) && (-1..=s).contains(&z));
        if in_bounds(x, y, z) {
            return self.data[voxel::voxel_index(x as usize, y as usize, z as usize)];
        }
        let dx = axis_overflow(x);
        let dy = axis_overflow(y);
        let dz = axis_overflow(z);
        match neighbors.get(dx, dy, dz) {
            Some(chunk) => chunk.get(x - dx * s, y - dy * s, z - dz * s),
            None => {
                // Unloaded neighbor: clamp into this chunk.
                self.data[voxel::voxel_index(
                    x.clamp(0, s - 1) as usize,
                    y.clamp(0, s - 1) as usize,
                    z.clamp(0, s - 1) as usize,
                )]
            }
        }
    }

    /// Overwrites every voxel with a uniform packed value and marks dirty.
    pub fn fill(&mut self, weight: f32, material: u8, light: u8) {
        let value = voxel::pack(weight, material, light);
        self.data.fill(value);
        self.dirty = true;
    }

    /// Fills a flat floor: local voxels below `surface_y` become fully
    /// solid with `material`, the rest air. Marks dirty.
    pub fn generate_flat(&mut self, surface_y: i32, material: u8) {
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                let value = if (y as i32) < surface_y {
                    voxel::pack(0.5, material, 0)
                } else {
                    AIR
                };
                for x in 0..CHUNK_SIZE {
                    self.data[voxel::voxel_index(x, y, z)] = value;
                }
            }
        }
        self.dirty = true;
    }

    /// Replaces the entire voxel buffer (server ingest) and marks dirty.
    pub fn copy_from(&mut self, data: &[u16]) {
        debug_assert_eq!(data.len(), CHUNK_VOLUME);
        self.data.copy_from_slice(data);
        self.dirty = true;
    }

    /// Read-only view of the raw voxel buffer.
    pub fn raw(&self) -> &[u16] {
        &self.data
    }

    /// Whether the chunk needs remeshing.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the chunk as needing a remesh.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the dirty flag after a successful remesh.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Sequence number of the last applied authoritative build.
    pub fn last_build_seq(&self) -> u32 {
        self.last_build_seq
    }

    /// Records the last applied authoritative build sequence.
    pub fn set_last_build_seq(&mut self, seq: u32) {
        self.last_build_seq = seq;
    }

    /// The face-to-face connectivity summary, if computed since the last
    /// voxel-data change.
    pub fn connectivity(&self) -> Option<FaceConnectivity> {
        self.connectivity
    }

    /// Stores a freshly computed connectivity summary.
    pub fn set_connectivity(&mut self, connectivity: FaceConnectivity) {
        self.connectivity = Some(connectivity);
    }
}

impl Default for VoxelChunk {
    fn default() -> Self {
        Self::new()
    }
}

fn in_bounds(x: i32, y: i32, z: i32) -> bool {
    let s = CHUNK_SIZE as i32;
    (0..s).contains(&x) && (0..s).contains(&y) && (0..s).contains(&z)
}

/// −1, 0, or +1 depending on which side of `[0, CHUNK_SIZE)` the coordinate
/// fell out of.
fn axis_overflow(v: i32) -> i32 {
    if v < 0 {
        -1
    } else if v >= CHUNK_SIZE as i32 {
        1
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
