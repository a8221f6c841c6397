//! End-to-end streaming scenarios: a fake server answers the manager's
//! requests over the inbox, and the tests assert the world state the
//! renderer would observe.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use loam_config::WorldConfig;
use loam_net::{ClientMessage, ColumnChunk, ServerMessage};
use loam_voxel::{CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord, TileCoord, voxel};
use loam_world::{Camera, RequestSink, WorldManager};

/// Captures outbound requests for inspection and replay.
#[derive(Clone, Default)]
struct RequestLog(Rc<RefCell<Vec<ClientMessage>>>);

impl RequestLog {
    fn drain(&self) -> Vec<ClientMessage> {
        self.0.borrow_mut().drain(..).collect()
    }
}

struct LogSink(RequestLog);

impl RequestSink for LogSink {
    fn send(&mut self, message: ClientMessage) {
        self.0.0.borrow_mut().push(message);
    }
}

/// Voxel buffer that is solid (material `material`) up to and including
/// local voxel Y `surface_ly`.
fn flat_voxels(surface_ly: i32, material: u8) -> Vec<u16> {
    let mut voxels = vec![voxel::AIR; CHUNK_VOLUME];
    for z in 0..CHUNK_SIZE {
        for y in 0..CHUNK_SIZE {
            if (y as i32) <= surface_ly {
                for x in 0..CHUNK_SIZE {
                    voxels[voxel::voxel_index(x, y, z)] = voxel::pack(0.5, material, 0);
                }
            }
        }
    }
    voxels
}

/// A minimal authoritative server: flat world, surface at voxel Y 10,
/// material 1, one chunk layer (cy 0) per column.
fn answer(request: &ClientMessage) -> Option<ServerMessage> {
    match request {
        ClientMessage::ColumnRequest { tile } => Some(ServerMessage::ColumnResponse {
            tile: *tile,
            heights: vec![10; CHUNK_SIZE * CHUNK_SIZE],
            materials: vec![1; CHUNK_SIZE * CHUNK_SIZE],
            chunks: vec![ColumnChunk {
                cy: 0,
                last_build_seq: 0,
                voxels: flat_voxels(10, 1),
            }],
        }),
        ClientMessage::TileRequest { tile } => Some(ServerMessage::TileResponse {
            tile: *tile,
            heights: vec![10; CHUNK_SIZE * CHUNK_SIZE],
            materials: vec![1; CHUNK_SIZE * CHUNK_SIZE],
        }),
        ClientMessage::ChunkRequest { coord, .. } => Some(ServerMessage::ChunkData {
            coord: *coord,
            last_build_seq: 0,
            voxels: if coord.cy == 0 {
                flat_voxels(10, 1)
            } else {
                vec![voxel::AIR; CHUNK_VOLUME]
            },
        }),
        _ => None,
    }
}

fn server_world() -> (WorldManager, RequestLog) {
    let log = RequestLog::default();
    let mut world = WorldManager::new(WorldConfig::default());
    world.set_request_sink(Box::new(LogSink(log.clone())));
    (world, log)
}

/// Runs one tick, then feeds every outstanding request through the fake
/// server back into the inbox.
fn tick_and_answer(world: &mut WorldManager, log: &RequestLog, observer: Vec3, camera: &Camera) {
    world.tick(observer, camera);
    let sender = world.inbox_sender();
    for request in log.drain() {
        if let Some(response) = answer(&request) {
            sender.send(response).expect("inbox open");
        }
    }
}

#[test]
fn test_cold_start_loads_observer_column() {
    let (mut world, log) = server_world();
    let observer = Vec3::new(4.0, 3.5, 4.0);
    let camera = Camera::looking(observer, Vec3::NEG_Y);

    // First tick bootstraps: exactly one column request for (0,0).
    world.tick(observer, &camera);
    let first = log.drain();
    assert_eq!(
        first,
        vec![ClientMessage::ColumnRequest {
            tile: TileCoord::new(0, 0)
        }]
    );
    let sender = world.inbox_sender();
    sender
        .send(answer(&first[0]).expect("column response"))
        .expect("inbox open");

    // Second tick ingests the column and runs the visibility search.
    world.tick(observer, &camera);

    // Surface at voxel Y 10 in a 32-chunk: the whole column fits in cy 0.
    assert_eq!(world.column_max_cy(TileCoord::new(0, 0)), Some(0));
    assert!(world.chunk(ChunkCoord::new(0, 0, 0)).is_some());

    // Map tile: height 10, material 1 for all 1024 pixels.
    let tile = world.tile(TileCoord::new(0, 0)).expect("tile cached");
    for z in 0..CHUNK_SIZE {
        for x in 0..CHUNK_SIZE {
            assert_eq!(tile.pixel(x, z), (10, 1));
        }
    }

    // Reachable covers the observer chunk and its six face neighbors.
    let origin = ChunkCoord::new(0, 0, 0);
    assert!(world.reachable().contains(&origin));
    for face in loam_voxel::Face::ALL {
        assert!(
            world.reachable().contains(&origin.face_neighbor(face)),
            "missing neighbor through {face:?}"
        );
    }

    // Requests went out: the chunk below the observer (camera looks down),
    // bounded by the pending cap, and never above the known surface.
    let followups = log.drain();
    let chunk_requests: Vec<_> = followups
        .iter()
        .filter_map(|m| match m {
            ClientMessage::ChunkRequest { coord, .. } => Some(*coord),
            _ => None,
        })
        .collect();
    assert!(!chunk_requests.is_empty());
    assert!(chunk_requests.len() <= WorldConfig::default().max_pending_chunks);
    assert!(chunk_requests.contains(&ChunkCoord::new(0, -1, 0)));
    for coord in &chunk_requests {
        if let Some(max_cy) = world.column_max_cy(coord.tile()) {
            assert!(coord.cy <= max_cy, "requested air chunk {coord}");
        }
    }
}

#[test]
fn test_cold_start_settles_into_visible_mesh() {
    let (mut world, log) = server_world();
    let observer = Vec3::new(4.0, 3.5, 4.0);
    let camera = Camera::looking(observer, Vec3::NEG_Y);

    for _ in 0..40 {
        tick_and_answer(&mut world, &log, observer, &camera);
    }

    let origin = ChunkCoord::new(0, 0, 0);
    let layers = world.mesh_layers(origin).expect("observer chunk meshed");
    assert!(!layers.solid.is_empty(), "flat surface should mesh");
    assert!(world.is_mesh_visible(origin), "observer chunk mesh hidden");
}

#[test]
fn test_moving_east_requests_new_columns_and_unloads_behind() {
    let (mut world, log) = server_world();
    let start = Vec3::new(4.0, 3.5, 4.0);
    let camera_east = Camera::looking(start, Vec3::X);

    for _ in 0..40 {
        tick_and_answer(&mut world, &log, start, &camera_east);
    }

    // Plant a chunk exactly on the hysteresis edge: distance 8 from the
    // start chunk (radius 6 + buffer 2 keeps it), distance 9 after moving
    // one chunk east (unloads it).
    let far_west = ChunkCoord::new(-8, 0, 0);
    world
        .inbox_sender()
        .send(ServerMessage::ChunkData {
            coord: far_west,
            last_build_seq: 0,
            voxels: flat_voxels(10, 1),
        })
        .expect("inbox open");
    world.tick(start, &camera_east);
    assert!(world.chunk(far_west).is_some(), "hysteresis band chunk kept");

    // Step one chunk east (extent 8 m).
    let moved = Vec3::new(8.0 + 0.1, 3.5, 4.0);
    let camera_moved = Camera::looking(moved, Vec3::X);
    let mut fresh_columns = Vec::new();
    for _ in 0..40 {
        world.tick(moved, &camera_moved);
        for request in log.drain() {
            match &request {
                ClientMessage::TileRequest { tile } | ClientMessage::ColumnRequest { tile } => {
                    fresh_columns.push(*tile);
                }
                _ => {}
            }
            if let Some(response) = answer(&request) {
                world.inbox_sender().send(response).expect("inbox open");
            }
        }
    }

    // The search recentered on (1,0,0).
    assert!(world.reachable().contains(&ChunkCoord::new(1, 0, 0)));

    // Columns ahead of the new position were requested.
    assert!(
        fresh_columns.iter().any(|tile| tile.tx > 1),
        "no new eastward columns in {fresh_columns:?}"
    );

    // The far-west chunk fell outside radius + buffer and was unloaded.
    assert!(
        world.chunk(far_west).is_none(),
        "chunk behind the observer was kept"
    );

    // Unload invariant: every loaded chunk is reachable or within the
    // hysteresis radius of the observer.
    let config = WorldConfig::default();
    let keep = (config.visibility_radius + config.buffer_chunks) as i32;
    let observer_chunk = ChunkCoord::new(1, 0, 0);
    let mut checked = 0;
    for cx in -12..12 {
        for cz in -12..12 {
            let coord = ChunkCoord::new(cx, 0, cz);
            if world.chunk(coord).is_some() {
                checked += 1;
                assert!(
                    world.reachable().contains(&coord)
                        || coord.chebyshev_distance(observer_chunk) <= keep,
                    "stray loaded chunk {coord}"
                );
            }
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_remesh_defers_while_face_neighbor_pending() {
    let (mut world, log) = server_world();
    let observer = Vec3::new(4.0, 3.5, 4.0);
    // Looking east so the +X neighbor is requested.
    let camera = Camera::looking(observer, Vec3::X);

    // Bootstrap the observer column.
    world.tick(observer, &camera);
    let bootstrap = log.drain();
    world
        .inbox_sender()
        .send(answer(&bootstrap[0]).expect("column response"))
        .expect("inbox open");

    // Answer everything except the chunk request for (1,0,0), which is
    // withheld so it stays pending.
    let origin = ChunkCoord::new(0, 0, 0);
    let east = ChunkCoord::new(1, 0, 0);
    let mut east_pending = false;
    for _ in 0..10 {
        world.tick(observer, &camera);
        for request in log.drain() {
            if matches!(request, ClientMessage::ChunkRequest { coord, .. } if coord == east) {
                east_pending = true;
                continue;
            }
            if let Some(response) = answer(&request) {
                world.inbox_sender().send(response).expect("inbox open");
            }
        }
    }
    assert!(east_pending, "(1,0,0) was never requested");

    // With its +X face neighbor pending, (0,0,0) stays queued and unmeshed.
    for _ in 0..3 {
        world.tick(observer, &camera);
        for request in log.drain() {
            if matches!(request, ClientMessage::ChunkRequest { coord, .. } if coord == east) {
                continue;
            }
            if let Some(response) = answer(&request) {
                world.inbox_sender().send(response).expect("inbox open");
            }
        }
        assert!(world.mesh_layers(origin).is_none(), "meshed across a seam");
        assert!(world.is_remesh_queued(origin), "dropped from the queue");
    }

    // Deliver the withheld neighbor; the mesh appears once no face
    // neighbor is pending.
    world
        .inbox_sender()
        .send(ServerMessage::ChunkData {
            coord: east,
            last_build_seq: 0,
            voxels: flat_voxels(10, 1),
        })
        .expect("inbox open");
    let mut meshed = false;
    for _ in 0..10 {
        world.tick(observer, &camera);
        for request in log.drain() {
            if let Some(response) = answer(&request) {
                world.inbox_sender().send(response).expect("inbox open");
            }
        }
        if world.mesh_layers(origin).is_some() {
            meshed = true;
            break;
        }
    }
    assert!(meshed, "(0,0,0) never meshed after the neighbor arrived");
}
