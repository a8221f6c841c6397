//! Wire protocol: binary encode/decode of every message the voxel core
//! consumes or emits. All payloads are little-endian with a one-byte
//! message id in front; decoding is bounds-checked end to end and returns
//! errors as values, never panicking on hostile input.

pub mod error;
pub mod messages;
pub mod quant;
pub mod wire;

pub use error::DecodeError;
pub use messages::{
    ClientMessage, ColumnChunk, PlayerState, ServerMessage, build_result, msg,
};
pub use quant::{dequantize_angle, dequantize_cm, quantize_angle, quantize_cm};
pub use wire::{ByteReader, ByteWriter};
