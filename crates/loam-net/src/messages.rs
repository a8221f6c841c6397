//! Message catalog and per-message codecs.
//!
//! Each message is a one-byte id followed by its little-endian payload.
//! Client and server directions are separate enums so each side only ever
//! decodes what it can legally receive.

use glam::Vec3;
use loam_build::{BuildMode, BuildOperation, BuildShape};
use loam_voxel::{CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord, TileCoord};

use crate::error::DecodeError;
use crate::quant::{dequantize_angle, dequantize_cm, quantize_angle, quantize_cm};
use crate::wire::{ByteReader, ByteWriter};

/// Message ids.
pub mod msg {
    pub const JOIN: u8 = 0x01;
    pub const ACK_BUILD: u8 = 0x02;
    pub const PING: u8 = 0x03;
    pub const VOXEL_CHUNK_REQUEST: u8 = 0x10;
    pub const SURFACE_COLUMN_REQUEST: u8 = 0x11;
    pub const MAP_TILE_REQUEST: u8 = 0x12;

    pub const WELCOME: u8 = 0x80;
    pub const ROOM_INFO: u8 = 0x81;
    pub const SNAPSHOT: u8 = 0x82;
    pub const VOXEL_CHUNK_DATA: u8 = 0x90;
    pub const SURFACE_COLUMN_RESPONSE: u8 = 0x91;
    pub const MAP_TILE_RESPONSE: u8 = 0x92;
    pub const VOXEL_BUILD_COMMIT: u8 = 0x93;
    pub const ERROR: u8 = 0xFE;
    pub const PONG: u8 = 0xFF;
}

/// Build commit result codes.
pub mod build_result {
    /// The server applied the build.
    pub const SUCCESS: u8 = 0;
}

/// Pixels in a map tile / surface-column raster.
const TILE_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Messages the core sends to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// Handshake with protocol version and requested player id.
    Join {
        protocol_version: u16,
        player_id: u16,
    },
    /// Acknowledges the newest build sequence the client has applied.
    AckBuild { last_seen_seq: u32 },
    /// Requests one chunk's voxel data.
    ChunkRequest {
        coord: ChunkCoord,
        force_regen: bool,
    },
    /// Requests a surface column (tile raster plus its chunks).
    ColumnRequest { tile: TileCoord },
    /// Requests a map tile raster only.
    TileRequest { tile: TileCoord },
    /// Heartbeat; the server echoes the timestamp in a Pong.
    Ping { timestamp: u32 },
}

impl ClientMessage {
    /// Encodes into a fresh wire buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        match self {
            Self::Join {
                protocol_version,
                player_id,
            } => {
                w.put_u8(msg::JOIN);
                w.put_u16(*protocol_version);
                w.put_u16(*player_id);
            }
            Self::AckBuild { last_seen_seq } => {
                w.put_u8(msg::ACK_BUILD);
                w.put_u32(*last_seen_seq);
            }
            Self::ChunkRequest { coord, force_regen } => {
                w.put_u8(msg::VOXEL_CHUNK_REQUEST);
                w.put_i32(coord.cx);
                w.put_i32(coord.cy);
                w.put_i32(coord.cz);
                w.put_u8(u8::from(*force_regen));
            }
            Self::ColumnRequest { tile } => {
                w.put_u8(msg::SURFACE_COLUMN_REQUEST);
                w.put_i32(tile.tx);
                w.put_i32(tile.tz);
            }
            Self::TileRequest { tile } => {
                w.put_u8(msg::MAP_TILE_REQUEST);
                w.put_i32(tile.tx);
                w.put_i32(tile.tz);
            }
            Self::Ping { timestamp } => {
                w.put_u8(msg::PING);
                w.put_u32(*timestamp);
            }
        }
        w.into_bytes()
    }

    /// Decodes a client message from raw bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(bytes);
        if r.is_empty() {
            return Err(DecodeError::Empty);
        }
        let id = r.get_u8()?;
        match id {
            msg::JOIN => Ok(Self::Join {
                protocol_version: r.get_u16()?,
                player_id: r.get_u16()?,
            }),
            msg::ACK_BUILD => Ok(Self::AckBuild {
                last_seen_seq: r.get_u32()?,
            }),
            msg::VOXEL_CHUNK_REQUEST => Ok(Self::ChunkRequest {
                coord: ChunkCoord::new(r.get_i32()?, r.get_i32()?, r.get_i32()?),
                force_regen: r.get_u8()? != 0,
            }),
            msg::SURFACE_COLUMN_REQUEST => Ok(Self::ColumnRequest {
                tile: TileCoord::new(r.get_i32()?, r.get_i32()?),
            }),
            msg::MAP_TILE_REQUEST => Ok(Self::TileRequest {
                tile: TileCoord::new(r.get_i32()?, r.get_i32()?),
            }),
            msg::PING => Ok(Self::Ping {
                timestamp: r.get_u32()?,
            }),
            other => Err(DecodeError::UnknownMessageId(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// One player's state inside a snapshot, in wire-native quantized units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerState {
    /// Player id.
    pub id: u16,
    /// Position in signed centimeters.
    pub x_cm: i16,
    pub y_cm: i16,
    pub z_cm: i16,
    /// Orientation in π-normalized i16 units.
    pub yaw_q: i16,
    pub pitch_q: i16,
    /// Pressed-button bitmask.
    pub buttons: u8,
    /// Misc state flags.
    pub flags: u8,
}

impl PlayerState {
    /// Builds a quantized state from world-space values.
    pub fn from_world(id: u16, position: Vec3, yaw: f32, pitch: f32, buttons: u8, flags: u8) -> Self {
        Self {
            id,
            x_cm: quantize_cm(position.x),
            y_cm: quantize_cm(position.y),
            z_cm: quantize_cm(position.z),
            yaw_q: quantize_angle(yaw),
            pitch_q: quantize_angle(pitch),
            buttons,
            flags,
        }
    }

    /// Position in world meters.
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            dequantize_cm(self.x_cm),
            dequantize_cm(self.y_cm),
            dequantize_cm(self.z_cm),
        )
    }

    /// `(yaw, pitch)` in radians.
    pub fn angles(&self) -> (f32, f32) {
        (dequantize_angle(self.yaw_q), dequantize_angle(self.pitch_q))
    }
}

/// One chunk inside a surface-column response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChunk {
    /// Chunk Y within the column.
    pub cy: i32,
    /// Last build sequence baked into the voxels.
    pub last_build_seq: u32,
    /// Packed voxels, [`CHUNK_VOLUME`] of them.
    pub voxels: Vec<u16>,
}

/// Messages the core receives from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Join accepted; assigns the player id and room.
    Welcome {
        player_id: u16,
        /// Room identifier, NUL-padded.
        room_id: [u8; 8],
    },
    /// Room occupancy update.
    RoomInfo { player_count: u8 },
    /// Per-tick player state broadcast.
    Snapshot {
        tick: u32,
        players: Vec<PlayerState>,
    },
    /// One chunk's voxel data.
    ChunkData {
        coord: ChunkCoord,
        last_build_seq: u32,
        voxels: Vec<u16>,
    },
    /// A surface column: tile raster plus the column's chunks.
    ColumnResponse {
        tile: TileCoord,
        /// Topmost-solid world voxel Y per pixel, `x + z·S` order.
        heights: Vec<i16>,
        /// Surface material per pixel.
        materials: Vec<u8>,
        /// The column's chunks, bottom-up.
        chunks: Vec<ColumnChunk>,
    },
    /// A map tile raster without chunk data.
    TileResponse {
        tile: TileCoord,
        heights: Vec<i16>,
        materials: Vec<u8>,
    },
    /// An authoritative build operation to apply locally.
    BuildCommit {
        player_id: u16,
        seq: u32,
        /// [`build_result::SUCCESS`] or a failure code.
        result: u8,
        op: BuildOperation,
    },
    /// Server-reported error code.
    Error { code: u8 },
    /// Heartbeat echo.
    Pong { timestamp: u32 },
}

impl ServerMessage {
    /// Encodes into a fresh wire buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        match self {
            Self::Welcome { player_id, room_id } => {
                w.put_u8(msg::WELCOME);
                w.put_u16(*player_id);
                w.put_bytes(room_id);
            }
            Self::RoomInfo { player_count } => {
                w.put_u8(msg::ROOM_INFO);
                w.put_u8(*player_count);
            }
            Self::Snapshot { tick, players } => {
                w.put_u8(msg::SNAPSHOT);
                w.put_u32(*tick);
                w.put_u8(players.len().min(u8::MAX as usize) as u8);
                for p in players.iter().take(u8::MAX as usize) {
                    w.put_u16(p.id);
                    w.put_i16(p.x_cm);
                    w.put_i16(p.y_cm);
                    w.put_i16(p.z_cm);
                    w.put_i16(p.yaw_q);
                    w.put_i16(p.pitch_q);
                    w.put_u8(p.buttons);
                    w.put_u8(p.flags);
                }
            }
            Self::ChunkData {
                coord,
                last_build_seq,
                voxels,
            } => {
                w.put_u8(msg::VOXEL_CHUNK_DATA);
                w.put_i32(coord.cx);
                w.put_i32(coord.cy);
                w.put_i32(coord.cz);
                w.put_u32(*last_build_seq);
                w.put_u16_slice(voxels);
            }
            Self::ColumnResponse {
                tile,
                heights,
                materials,
                chunks,
            } => {
                w.put_u8(msg::SURFACE_COLUMN_RESPONSE);
                w.put_i32(tile.tx);
                w.put_i32(tile.tz);
                w.put_i16_slice(heights);
                w.put_bytes(materials);
                w.put_u8(chunks.len().min(u8::MAX as usize) as u8);
                for chunk in chunks.iter().take(u8::MAX as usize) {
                    w.put_i32(chunk.cy);
                    w.put_u32(chunk.last_build_seq);
                    w.put_u16_slice(&chunk.voxels);
                }
            }
            Self::TileResponse {
                tile,
                heights,
                materials,
            } => {
                w.put_u8(msg::MAP_TILE_RESPONSE);
                w.put_i32(tile.tx);
                w.put_i32(tile.tz);
                w.put_i16_slice(heights);
                w.put_bytes(materials);
            }
            Self::BuildCommit {
                player_id,
                seq,
                result,
                op,
            } => {
                w.put_u8(msg::VOXEL_BUILD_COMMIT);
                w.put_u16(*player_id);
                w.put_u32(*seq);
                w.put_u8(*result);
                encode_operation(&mut w, op);
            }
            Self::Error { code } => {
                w.put_u8(msg::ERROR);
                w.put_u8(*code);
            }
            Self::Pong { timestamp } => {
                w.put_u8(msg::PONG);
                w.put_u32(*timestamp);
            }
        }
        w.into_bytes()
    }

    /// Decodes a server message from raw bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(bytes);
        if r.is_empty() {
            return Err(DecodeError::Empty);
        }
        let id = r.get_u8()?;
        match id {
            msg::WELCOME => {
                let player_id = r.get_u16()?;
                let mut room_id = [0u8; 8];
                room_id.copy_from_slice(r.get_bytes(8)?);
                Ok(Self::Welcome { player_id, room_id })
            }
            msg::ROOM_INFO => Ok(Self::RoomInfo {
                player_count: r.get_u8()?,
            }),
            msg::SNAPSHOT => {
                let tick = r.get_u32()?;
                let n = r.get_u8()? as usize;
                let mut players = Vec::with_capacity(n);
                for _ in 0..n {
                    players.push(PlayerState {
                        id: r.get_u16()?,
                        x_cm: r.get_i16()?,
                        y_cm: r.get_i16()?,
                        z_cm: r.get_i16()?,
                        yaw_q: r.get_i16()?,
                        pitch_q: r.get_i16()?,
                        buttons: r.get_u8()?,
                        flags: r.get_u8()?,
                    });
                }
                Ok(Self::Snapshot { tick, players })
            }
            msg::VOXEL_CHUNK_DATA => Ok(Self::ChunkData {
                coord: ChunkCoord::new(r.get_i32()?, r.get_i32()?, r.get_i32()?),
                last_build_seq: r.get_u32()?,
                voxels: r.get_u16_vec(CHUNK_VOLUME)?,
            }),
            msg::SURFACE_COLUMN_RESPONSE => {
                let tile = TileCoord::new(r.get_i32()?, r.get_i32()?);
                let heights = r.get_i16_vec(TILE_AREA)?;
                let materials = r.get_bytes(TILE_AREA)?.to_vec();
                let n = r.get_u8()? as usize;
                let mut chunks = Vec::with_capacity(n);
                for _ in 0..n {
                    chunks.push(ColumnChunk {
                        cy: r.get_i32()?,
                        last_build_seq: r.get_u32()?,
                        voxels: r.get_u16_vec(CHUNK_VOLUME)?,
                    });
                }
                Ok(Self::ColumnResponse {
                    tile,
                    heights,
                    materials,
                    chunks,
                })
            }
            msg::MAP_TILE_RESPONSE => Ok(Self::TileResponse {
                tile: TileCoord::new(r.get_i32()?, r.get_i32()?),
                heights: r.get_i16_vec(TILE_AREA)?,
                materials: r.get_bytes(TILE_AREA)?.to_vec(),
            }),
            msg::VOXEL_BUILD_COMMIT => {
                let player_id = r.get_u16()?;
                let seq = r.get_u32()?;
                let result = r.get_u8()?;
                let op = decode_operation(&mut r)?;
                Ok(Self::BuildCommit {
                    player_id,
                    seq,
                    result,
                    op,
                })
            }
            msg::ERROR => Ok(Self::Error { code: r.get_u8()? }),
            msg::PONG => Ok(Self::Pong {
                timestamp: r.get_u32()?,
            }),
            other => Err(DecodeError::UnknownMessageId(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Build operation codec
// ---------------------------------------------------------------------------

const OP_FLAG_THICKNESS: u8 = 1 << 0;
const OP_FLAG_ARC_SWEEP: u8 = 1 << 1;
const OP_FLAG_CLOSED: u8 = 1 << 2;

fn encode_operation(w: &mut ByteWriter, op: &BuildOperation) {
    w.put_u8(shape_code(op.shape));
    w.put_u8(mode_code(op.mode));
    let mut flags = 0u8;
    if op.thickness.is_some() {
        flags |= OP_FLAG_THICKNESS;
    }
    if op.arc_sweep.is_some() {
        flags |= OP_FLAG_ARC_SWEEP;
    }
    if op.closed {
        flags |= OP_FLAG_CLOSED;
    }
    w.put_u8(flags);
    for v in [op.center.x, op.center.y, op.center.z] {
        w.put_f32(v);
    }
    for v in [op.size.x, op.size.y, op.size.z] {
        w.put_f32(v);
    }
    w.put_f32(op.rotation);
    w.put_u8(op.material);
    if let Some(t) = op.thickness {
        w.put_f32(t);
    }
    if let Some(a) = op.arc_sweep {
        w.put_f32(a);
    }
}

fn decode_operation(r: &mut ByteReader<'_>) -> Result<BuildOperation, DecodeError> {
    let shape = shape_from_code(r.get_u8()?)?;
    let mode = mode_from_code(r.get_u8()?)?;
    let flags = r.get_u8()?;
    let center = Vec3::new(r.get_f32()?, r.get_f32()?, r.get_f32()?);
    let size = Vec3::new(r.get_f32()?, r.get_f32()?, r.get_f32()?);
    let rotation = r.get_f32()?;
    let material = r.get_u8()?;
    let thickness = if flags & OP_FLAG_THICKNESS != 0 {
        Some(r.get_f32()?)
    } else {
        None
    };
    let arc_sweep = if flags & OP_FLAG_ARC_SWEEP != 0 {
        Some(r.get_f32()?)
    } else {
        None
    };
    Ok(BuildOperation {
        center,
        shape,
        mode,
        size,
        material,
        thickness,
        closed: flags & OP_FLAG_CLOSED != 0,
        arc_sweep,
        rotation,
    })
}

fn shape_code(shape: BuildShape) -> u8 {
    match shape {
        BuildShape::Cube => 0,
        BuildShape::Sphere => 1,
        BuildShape::Cylinder => 2,
        BuildShape::Prism => 3,
    }
}

fn shape_from_code(code: u8) -> Result<BuildShape, DecodeError> {
    match code {
        0 => Ok(BuildShape::Cube),
        1 => Ok(BuildShape::Sphere),
        2 => Ok(BuildShape::Cylinder),
        3 => Ok(BuildShape::Prism),
        other => Err(DecodeError::InvalidField {
            what: "build shape",
            value: other as u32,
        }),
    }
}

fn mode_code(mode: BuildMode) -> u8 {
    match mode {
        BuildMode::Add => 0,
        BuildMode::Subtract => 1,
        BuildMode::Paint => 2,
        BuildMode::Fill => 3,
    }
}

fn mode_from_code(code: u8) -> Result<BuildMode, DecodeError> {
    match code {
        0 => Ok(BuildMode::Add),
        1 => Ok(BuildMode::Subtract),
        2 => Ok(BuildMode::Paint),
        3 => Ok(BuildMode::Fill),
        other => Err(DecodeError::InvalidField {
            what: "build mode",
            value: other as u32,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
