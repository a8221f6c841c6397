//! Packed voxel storage: the 16-bit voxel codec, fixed-size chunks, the
//! chunk store, and per-chunk face-to-face connectivity summaries.

pub mod chunk;
pub mod connectivity;
pub mod coords;
pub mod face;
pub mod neighbors;
pub mod store;
pub mod voxel;

pub use chunk::{CHUNK_EXTENT, CHUNK_SIZE, CHUNK_VOLUME, VOXEL_SIZE, VoxelChunk};
pub use connectivity::{FaceConnectivity, compute_connectivity};
pub use coords::{ChunkCoord, TileCoord};
pub use face::Face;
pub use neighbors::NeighborChunks;
pub use store::ChunkStore;
pub use voxel::{
    AIR, is_solid, light, material, pack, unpack, voxel_index, weight,
};
