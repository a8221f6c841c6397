//! Volumetric build operations: parameterized shapes evaluated against the
//! voxel field in add, subtract, paint, and fill modes.

pub mod engine;
pub mod op;
pub mod shape;

pub use engine::{apply_build_operation, apply_to_chunk};
pub use op::{BuildMode, BuildOperation};
pub use shape::BuildShape;
