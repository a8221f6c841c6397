//! The world manager: single owner of chunks, meshes, tiles, and all
//! streaming state, driven by one cooperative tick.
//!
//! Tick order is fixed: drain inbox → visibility search (when the observer
//! chunk changed or the cache was invalidated) → request emission → mesh
//! visibility → unload → remesh drain. External I/O lands in a thread-safe
//! inbox and is only applied at tick start, so every other structure stays
//! single-threaded.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use loam_build::{BuildOperation, apply_to_chunk};
use loam_config::WorldConfig;
use loam_mesh::{MaterialClasses, MeshLayers, mesh_chunk};
use loam_net::{ClientMessage, ColumnChunk, ServerMessage, build_result};
use loam_terrain::{TerrainGenerator, TerrainParams};
use loam_voxel::{
    CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord, ChunkStore, Face, FaceConnectivity, NeighborChunks,
    TileCoord, VoxelChunk, compute_connectivity,
};

use crate::camera::Camera;
use crate::hooks::{MeshSink, RequestSink, TileSink};
use crate::map_tile::MapTile;
use crate::remesh::RemeshQueue;
use crate::visibility::{ChunkVisState, compute_visibility};

/// A chunk's uploaded mesh plus its current visibility.
struct ChunkMesh {
    layers: MeshLayers,
    visible: bool,
}

/// Counters for debug overlays and logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorldStats {
    /// Chunks currently loaded.
    pub loaded_chunks: usize,
    /// Outstanding chunk requests.
    pub pending_chunks: usize,
    /// Outstanding tile and column requests.
    pub pending_tiles: usize,
    /// Chunks awaiting remesh.
    pub queued_remesh: usize,
    /// Chunks meshed during the last tick.
    pub meshed_last_tick: usize,
    /// Meshes currently visible.
    pub visible_meshes: usize,
}

/// Owns all world-side state and drives the streaming loop.
pub struct WorldManager {
    config: WorldConfig,
    classes: MaterialClasses,

    chunks: ChunkStore,
    meshes: FxHashMap<ChunkCoord, ChunkMesh>,
    tiles: FxHashMap<TileCoord, MapTile>,

    pending_chunks: FxHashSet<ChunkCoord>,
    pending_columns: FxHashSet<TileCoord>,
    pending_tiles: FxHashSet<TileCoord>,
    /// Highest chunk Y worth requesting per column, from tile rasters.
    column_info: FxHashMap<TileCoord, i32>,

    last_observer_chunk: Option<ChunkCoord>,
    last_bfs_chunk: Option<ChunkCoord>,
    cached_reachable: FxHashSet<ChunkCoord>,
    reachable_valid: bool,
    bootstrapped: bool,

    remesh_queue: RemeshQueue,

    inbox_tx: Sender<ServerMessage>,
    inbox_rx: Receiver<ServerMessage>,

    request_sink: Option<Box<dyn RequestSink>>,
    tile_sink: Option<Box<dyn TileSink>>,
    mesh_sink: Option<Box<dyn MeshSink>>,

    /// Local voxel source when the server is not authoritative for us.
    generator: Option<TerrainGenerator>,

    meshed_last_tick: usize,
}

impl WorldManager {
    /// Creates a manager with default terrain parameters for offline use.
    pub fn new(config: WorldConfig) -> Self {
        Self::with_terrain(config, TerrainParams::default())
    }

    /// Creates a manager with explicit terrain parameters.
    pub fn with_terrain(config: WorldConfig, terrain: TerrainParams) -> Self {
        let (inbox_tx, inbox_rx) = unbounded();
        let generator = (!config.use_server_chunks)
            .then(|| TerrainGenerator::new(config.world_seed, terrain));
        Self {
            // Offline mode needs no bootstrap column from the server.
            bootstrapped: !config.use_server_chunks,
            config,
            classes: MaterialClasses::default(),
            chunks: ChunkStore::new(),
            meshes: FxHashMap::default(),
            tiles: FxHashMap::default(),
            pending_chunks: FxHashSet::default(),
            pending_columns: FxHashSet::default(),
            pending_tiles: FxHashSet::default(),
            column_info: FxHashMap::default(),
            last_observer_chunk: None,
            last_bfs_chunk: None,
            cached_reachable: FxHashSet::default(),
            reachable_valid: false,
            remesh_queue: RemeshQueue::new(),
            inbox_tx,
            inbox_rx,
            request_sink: None,
            tile_sink: None,
            mesh_sink: None,
            generator,
            meshed_last_tick: 0,
        }
    }

    /// Attaches the outbound request sink (transport).
    pub fn set_request_sink(&mut self, sink: Box<dyn RequestSink>) {
        self.request_sink = Some(sink);
    }

    /// Attaches the map-overlay tile sink.
    pub fn set_tile_sink(&mut self, sink: Box<dyn TileSink>) {
        self.tile_sink = Some(sink);
    }

    /// Attaches the renderer-side mesh sink.
    pub fn set_mesh_sink(&mut self, sink: Box<dyn MeshSink>) {
        self.mesh_sink = Some(sink);
    }

    /// A clonable handle the transport thread uses to deliver decoded
    /// messages. Drained at the start of each tick.
    pub fn inbox_sender(&self) -> Sender<ServerMessage> {
        self.inbox_tx.clone()
    }

    /// Decodes raw server bytes and ingests the message.
    ///
    /// Malformed input is dropped with a log line; the connection is not
    /// the core's to close.
    pub fn ingest_wire(&mut self, bytes: &[u8]) {
        match ServerMessage::decode(bytes) {
            Ok(message) => self.ingest_message(message),
            Err(error) => warn!(%error, len = bytes.len(), "dropping undecodable message"),
        }
    }

    /// Runs one streaming tick for the given observer state.
    pub fn tick(&mut self, observer_pos: Vec3, camera: &Camera) {
        self.meshed_last_tick = 0;
        self.drain_inbox();

        let observer_chunk = ChunkCoord::containing(observer_pos);
        self.last_observer_chunk = Some(observer_chunk);

        if !self.bootstrapped {
            self.request_bootstrap_column(observer_chunk);
            return;
        }

        let chunk_changed =
            self.last_bfs_chunk != Some(observer_chunk) || !self.reachable_valid;
        if chunk_changed {
            self.run_visibility(observer_chunk, camera);
        }

        self.update_mesh_visibility(observer_chunk, camera);
        self.unload_distant(observer_chunk);
        self.drain_remesh(observer_chunk);
    }

    /// Current counters.
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            loaded_chunks: self.chunks.len(),
            pending_chunks: self.pending_chunks.len(),
            pending_tiles: self.pending_tiles.len() + self.pending_columns.len(),
            queued_remesh: self.remesh_queue.len(),
            meshed_last_tick: self.meshed_last_tick,
            visible_meshes: self.meshes.values().filter(|m| m.visible).count(),
        }
    }

    /// Overrides the material-to-layer classification used by the mesher.
    pub fn set_material_classes(&mut self, classes: MaterialClasses) {
        self.classes = classes;
    }

    /// The chunk the observer occupied on the last tick.
    pub fn observer_chunk(&self) -> Option<ChunkCoord> {
        self.last_observer_chunk
    }

    /// A loaded chunk, if present.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&VoxelChunk> {
        self.chunks.get(coord)
    }

    /// Number of loaded chunks.
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// The reachable set from the last visibility search.
    pub fn reachable(&self) -> &FxHashSet<ChunkCoord> {
        &self.cached_reachable
    }

    /// The cached map tile for a column, if any raster has arrived.
    pub fn tile(&self, tile: TileCoord) -> Option<&MapTile> {
        self.tiles.get(&tile)
    }

    /// Highest chunk Y worth requesting for a column, when known.
    pub fn column_max_cy(&self, tile: TileCoord) -> Option<i32> {
        self.column_info.get(&tile).copied()
    }

    /// Whether the chunk is awaiting a remesh.
    pub fn is_remesh_queued(&self, coord: ChunkCoord) -> bool {
        self.remesh_queue.contains(coord)
    }

    /// The last extracted mesh for a chunk.
    pub fn mesh_layers(&self, coord: ChunkCoord) -> Option<&MeshLayers> {
        self.meshes.get(&coord).map(|m| &m.layers)
    }

    /// Whether the chunk's mesh is currently shown.
    pub fn is_mesh_visible(&self, coord: ChunkCoord) -> bool {
        self.meshes.get(&coord).is_some_and(|m| m.visible)
    }

    // -----------------------------------------------------------------
    // Ingest
    // -----------------------------------------------------------------

    /// Applies one decoded server message to world state.
    pub fn ingest_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::ChunkData {
                coord,
                last_build_seq,
                voxels,
            } => self.ingest_chunk(coord, last_build_seq, voxels),
            ServerMessage::ColumnResponse {
                tile,
                heights,
                materials,
                chunks,
            } => self.ingest_column(tile, heights, materials, chunks),
            ServerMessage::TileResponse {
                tile,
                heights,
                materials,
            } => self.ingest_tile(tile, &heights, &materials),
            ServerMessage::BuildCommit {
                player_id,
                seq,
                result,
                op,
            } => self.ingest_build(player_id, seq, result, op),
            ServerMessage::Welcome { player_id, .. } => {
                debug!(player_id, "welcomed into room");
            }
            ServerMessage::RoomInfo { player_count } => {
                debug!(player_count, "room info");
            }
            // Player snapshots belong to the entity layer, not the voxel core.
            ServerMessage::Snapshot { .. } => {}
            ServerMessage::Error { code } => warn!(code, "server error"),
            ServerMessage::Pong { .. } => {}
        }
    }

    fn drain_inbox(&mut self) {
        let messages: Vec<ServerMessage> = self.inbox_rx.try_iter().collect();
        for message in messages {
            self.ingest_message(message);
        }
    }

    /// Installs a chunk's voxel data, recomputes its connectivity, and
    /// queues it (plus face neighbors) for remesh.
    fn ingest_chunk(&mut self, coord: ChunkCoord, last_build_seq: u32, voxels: Vec<u16>) {
        if voxels.len() != CHUNK_VOLUME {
            warn!(%coord, len = voxels.len(), "chunk data with wrong voxel count");
            return;
        }
        let was_new = !self.chunks.contains(coord);
        let mut chunk = self.chunks.remove(coord).unwrap_or_default();
        chunk.copy_from(&voxels);
        chunk.set_last_build_seq(last_build_seq);
        chunk.set_connectivity(compute_connectivity(chunk.raw()));
        self.chunks.insert(coord, chunk);

        self.pending_chunks.remove(&coord);
        self.remesh_queue.enqueue_with_neighbors(coord);
        if was_new {
            // Fresh voxels can open (or seal) lines of sight.
            self.reachable_valid = false;
        }
        self.update_tile_for_chunk(coord);
    }

    /// Records a column's raster, then ingests its chunks.
    fn ingest_column(
        &mut self,
        tile: TileCoord,
        heights: Vec<i16>,
        materials: Vec<u8>,
        chunks: Vec<ColumnChunk>,
    ) {
        self.record_tile(tile, &heights, &materials);
        self.pending_columns.remove(&tile);
        for column_chunk in chunks {
            self.ingest_chunk(
                ChunkCoord::new(tile.tx, column_chunk.cy, tile.tz),
                column_chunk.last_build_seq,
                column_chunk.voxels,
            );
        }
        self.bootstrapped = true;
    }

    /// Records a raster-only tile response.
    fn ingest_tile(&mut self, tile: TileCoord, heights: &[i16], materials: &[u8]) {
        self.record_tile(tile, heights, materials);
        self.pending_tiles.remove(&tile);
    }

    fn record_tile(&mut self, tile: TileCoord, heights: &[i16], materials: &[u8]) {
        let Some(map_tile) = MapTile::from_raster(heights, materials) else {
            warn!(%tile, "tile raster with wrong pixel count");
            return;
        };
        let max_height = heights.iter().copied().max().unwrap_or(0) as i32;
        self.column_info
            .insert(tile, max_height.div_euclid(CHUNK_SIZE as i32));
        self.tiles.insert(tile, map_tile);
        if let Some(sink) = &mut self.tile_sink {
            sink.tile_updated(tile, heights, materials);
        }
    }

    /// Applies an authoritative build commit.
    fn ingest_build(&mut self, player_id: u16, seq: u32, result: u8, op: BuildOperation) {
        if result != build_result::SUCCESS {
            warn!(player_id, seq, result, "server rejected build");
            return;
        }
        let mut changed = Vec::new();
        for coord in op.affected_chunks() {
            let Some(chunk) = self.chunks.get_mut(coord) else {
                // Not loaded here; the server's copy stays authoritative.
                continue;
            };
            if seq <= chunk.last_build_seq() {
                // Already baked into the voxel data we received.
                continue;
            }
            let touched = apply_to_chunk(chunk, coord, &op);
            chunk.set_last_build_seq(seq);
            if touched {
                chunk.mark_dirty();
                chunk.set_connectivity(compute_connectivity(chunk.raw()));
                changed.push(coord);
            }
        }
        if !changed.is_empty() {
            self.reachable_valid = false;
        }
        for coord in changed {
            self.remesh_queue.enqueue_with_neighbors(coord);
            self.update_tile_for_chunk(coord);
        }
    }

    /// Folds a chunk's voxels into its map tile, if the tile is cached.
    fn update_tile_for_chunk(&mut self, coord: ChunkCoord) {
        let key = coord.tile();
        let (Some(tile), Some(chunk)) = (self.tiles.get_mut(&key), self.chunks.get(coord)) else {
            return;
        };
        tile.update_from_chunk(coord, chunk, None);
        if let Some(sink) = &mut self.tile_sink {
            sink.tile_updated(key, &tile.heights, &tile.materials);
        }
    }

    // -----------------------------------------------------------------
    // Streaming
    // -----------------------------------------------------------------

    fn request_bootstrap_column(&mut self, observer_chunk: ChunkCoord) {
        let tile = observer_chunk.tile();
        if self.pending_columns.contains(&tile) {
            return;
        }
        self.pending_columns.insert(tile);
        self.send(ClientMessage::ColumnRequest { tile });
    }

    fn run_visibility(&mut self, observer_chunk: ChunkCoord, camera: &Camera) {
        let radius = self.config.visibility_radius as i32;
        let chunks = &self.chunks;
        let pending = &self.pending_chunks;
        let result = compute_visibility(observer_chunk, radius, camera, |coord| {
            if let Some(chunk) = chunks.get(coord) {
                ChunkVisState::Loaded(
                    chunk.connectivity().unwrap_or(FaceConnectivity::FULLY_OPEN),
                )
            } else if pending.contains(&coord) {
                ChunkVisState::Pending
            } else {
                ChunkVisState::Missing
            }
        });

        debug!(
            observer = %observer_chunk,
            reachable = result.reachable.len(),
            wanted = result.to_request.len(),
            "visibility recomputed"
        );
        self.cached_reachable = result.reachable;
        self.reachable_valid = true;
        self.last_bfs_chunk = Some(observer_chunk);
        self.emit_requests(&result.to_request);
    }

    /// Turns the visibility search's wish list into bounded requests, or
    /// local generation when the server is not the voxel source.
    fn emit_requests(&mut self, to_request: &[ChunkCoord]) {
        if !self.config.use_server_chunks {
            self.generate_locally(to_request);
            return;
        }

        // Tiles before chunks in the same column: the raster bounds which
        // chunk Ys are worth fetching at all.
        for coord in to_request {
            if self.pending_tiles.len() >= self.config.max_pending_tiles {
                break;
            }
            let tile = coord.tile();
            if self.column_info.contains_key(&tile)
                || self.pending_tiles.contains(&tile)
                || self.pending_columns.contains(&tile)
            {
                continue;
            }
            self.pending_tiles.insert(tile);
            self.send(ClientMessage::TileRequest { tile });
        }

        for coord in to_request {
            if self.pending_chunks.len() >= self.config.max_pending_chunks {
                break;
            }
            if self.pending_chunks.contains(coord) {
                continue;
            }
            let Some(max_cy) = self.column_info.get(&coord.tile()) else {
                // Column unknown: the tile request above comes first.
                continue;
            };
            if coord.cy > *max_cy {
                // Nothing but air above the surface; never fetch it.
                continue;
            }
            self.pending_chunks.insert(*coord);
            self.send(ClientMessage::ChunkRequest {
                coord: *coord,
                force_regen: self.config.force_regenerate_chunks,
            });
        }
    }

    /// Offline path: synthesize the nearest wanted chunks this tick.
    fn generate_locally(&mut self, to_request: &[ChunkCoord]) {
        let budget = self.config.max_pending_chunks.max(1);
        let coords: Vec<ChunkCoord> = to_request.iter().copied().take(budget).collect();
        for coord in coords {
            let Some(generator) = &self.generator else {
                return;
            };
            let voxels = generator.generate_chunk(coord);
            self.ingest_chunk(coord, 0, voxels);
        }
    }

    fn send(&mut self, message: ClientMessage) {
        // An unset transport hook makes sending a no-op.
        if let Some(sink) = &mut self.request_sink {
            sink.send(message);
        }
    }

    // -----------------------------------------------------------------
    // Visibility application, unload, remesh
    // -----------------------------------------------------------------

    fn update_mesh_visibility(&mut self, observer_chunk: ChunkCoord, camera: &Camera) {
        let keep_radius = (self.config.visibility_radius + self.config.buffer_chunks) as i32;
        for (coord, mesh) in self.meshes.iter_mut() {
            let in_set = self.cached_reachable.contains(coord)
                || coord.chebyshev_distance(observer_chunk) <= keep_radius;
            let visible = in_set && camera.frustum.intersects_aabb(&coord.world_aabb());
            if mesh.visible != visible {
                mesh.visible = visible;
                if let Some(sink) = &mut self.mesh_sink {
                    sink.visibility_changed(*coord, visible);
                }
            }
        }
    }

    fn unload_distant(&mut self, observer_chunk: ChunkCoord) {
        let keep_radius = (self.config.visibility_radius + self.config.buffer_chunks) as i32;
        let to_unload: Vec<ChunkCoord> = self
            .chunks
            .coords()
            .filter(|coord| {
                !self.cached_reachable.contains(coord)
                    && coord.chebyshev_distance(observer_chunk) > keep_radius
            })
            .copied()
            .collect();

        for coord in to_unload {
            self.chunks.remove(coord);
            self.remesh_queue.remove(coord);
            if self.meshes.remove(&coord).is_some()
                && let Some(sink) = &mut self.mesh_sink
            {
                sink.mesh_removed(coord);
            }
            debug!(%coord, "unloaded chunk");
        }
    }

    fn drain_remesh(&mut self, observer_chunk: ChunkCoord) {
        let budget = Duration::from_secs_f32(self.config.remesh_budget_ms.max(0.0) / 1000.0);
        let start = Instant::now();
        let mut processed = 0usize;

        for coord in self.remesh_queue.sorted_by_distance(observer_chunk) {
            // The budget is advisory: it stops dispatch, never in-flight
            // work, and the first chunk always goes through.
            if processed >= 1 && start.elapsed() >= budget {
                break;
            }
            if !self.chunks.contains(coord) {
                self.remesh_queue.remove(coord);
                continue;
            }
            // A pending face neighbor would mesh with extrapolated border
            // data and show a seam; keep the chunk queued instead.
            let neighbor_pending = Face::ALL
                .iter()
                .any(|face| self.pending_chunks.contains(&coord.face_neighbor(*face)));
            if neighbor_pending {
                continue;
            }

            self.remesh_queue.remove(coord);
            let Some(layers) = self.extract_mesh(coord) else {
                continue;
            };
            if let Some(sink) = &mut self.mesh_sink {
                sink.mesh_ready(coord, &layers);
            }
            match self.meshes.get_mut(&coord) {
                Some(mesh) => mesh.layers = layers,
                None => {
                    self.meshes.insert(
                        coord,
                        ChunkMesh {
                            layers,
                            visible: false,
                        },
                    );
                }
            }
            if let Some(chunk) = self.chunks.get_mut(coord) {
                chunk.clear_dirty();
            }
            processed += 1;
        }
        self.meshed_last_tick = processed;
    }

    fn extract_mesh(&self, coord: ChunkCoord) -> Option<MeshLayers> {
        let chunk = self.chunks.get(coord)?;
        let neighbors = NeighborChunks::around(&self.chunks, coord);
        Some(mesh_chunk(chunk, &neighbors, &self.classes))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
