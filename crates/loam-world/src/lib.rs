//! The world manager: owns all loaded chunks and meshes, drives streaming
//! against the server (or a local generator), sequences time-budgeted
//! remeshing, and derives visibility from per-chunk connectivity.

pub mod camera;
pub mod hooks;
pub mod manager;
pub mod map_tile;
pub mod remesh;
pub mod visibility;

pub use camera::Camera;
pub use hooks::{MeshSink, RequestSink, TileSink};
pub use manager::{WorldManager, WorldStats};
pub use map_tile::MapTile;
pub use remesh::RemeshQueue;
pub use visibility::{ChunkVisState, VisibilityResult, compute_visibility};
