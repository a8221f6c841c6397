//! Deterministic procedural terrain: layered fractal noise with domain warp,
//! depth-stratified materials, an optional cellular pathway overlay, and
//! Poisson-scattered surface stamps (trees, rocks).

pub mod generator;
pub mod height;
pub mod params;
pub mod pathway;
pub mod seed;
pub mod stamps;
pub mod strata;

pub use generator::{ColumnSample, TerrainGenerator};
pub use height::HeightField;
pub use params::{
    HeightLayer, PathwayParams, StampParams, StrataLayer, TerrainParams, WarpParams, WaterParams,
};
pub use pathway::{PathwayField, PathwaySample};
pub use seed::{derive_tile_seed, noise_seed, tile_rng};
pub use stamps::{StampKind, TilePlacement, placements_for_tile};
pub use strata::material_for_depth;
