//! Injection points for external collaborators.
//!
//! The core never owns the transport, the map overlay, or the renderer; it
//! talks to them through these small traits, injected at construction. An
//! unset hook is a no-op.

use loam_mesh::MeshLayers;
use loam_net::ClientMessage;
use loam_voxel::{ChunkCoord, TileCoord};

/// Receives outbound requests for the transport to encode and send.
pub trait RequestSink {
    /// Queues one client message for sending. Must not block.
    fn send(&mut self, message: ClientMessage);
}

/// Receives surface-raster updates for the 2D map overlay.
pub trait TileSink {
    /// A tile raster arrived or changed.
    fn tile_updated(&mut self, tile: TileCoord, heights: &[i16], materials: &[u8]);
}

/// Receives mesh lifecycle events for the renderer.
pub trait MeshSink {
    /// A fresh mesh is ready for upload.
    fn mesh_ready(&mut self, coord: ChunkCoord, layers: &MeshLayers);

    /// A mesh's visibility toggled.
    fn visibility_changed(&mut self, coord: ChunkCoord, visible: bool);

    /// The chunk was unloaded; drop its mesh.
    fn mesh_removed(&mut self, coord: ChunkCoord);
}
