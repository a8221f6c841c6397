//! Chunk-graph visibility search.
//!
//! Breadth-first traversal over the 6-face-adjacent chunk graph, gated by
//! each chunk's face-to-face connectivity bits. Chunks whose voxels have not
//! arrived yet are treated as fully open so an unloaded frontier never
//! blocks the search.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use loam_voxel::{ChunkCoord, Face, FaceConnectivity};

use crate::camera::Camera;

/// What the provider knows about a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkVisState {
    /// Voxels present; traversal uses the connectivity bits.
    Loaded(FaceConnectivity),
    /// Requested but not yet arrived; treated as fully open.
    Pending,
    /// Never requested; treated as fully open and eligible for request.
    Missing,
}

/// Output of one visibility search.
#[derive(Debug, Default)]
pub struct VisibilityResult {
    /// Every chunk the search visited (always contains the observer chunk).
    pub reachable: FxHashSet<ChunkCoord>,
    /// Missing chunks worth requesting: inside the frustum and in the
    /// camera's forward hemisphere, nearest first.
    pub to_request: Vec<ChunkCoord>,
}

/// Runs the visibility search from the observer's chunk.
///
/// `radius` clips the frontier to a Chebyshev ball. The frustum and forward
/// hemisphere only filter `to_request`; reachability itself is geometric so
/// turning the camera never invalidates already-visible chunks.
pub fn compute_visibility<F>(
    observer: ChunkCoord,
    radius: i32,
    camera: &Camera,
    provider: F,
) -> VisibilityResult
where
    F: Fn(ChunkCoord) -> ChunkVisState,
{
    let mut result = VisibilityResult::default();
    let mut queue: VecDeque<(ChunkCoord, Option<Face>)> = VecDeque::new();

    result.reachable.insert(observer);
    queue.push_back((observer, None));
    consider_request(&mut result, observer, camera, &provider);

    while let Some((coord, entry)) = queue.pop_front() {
        let state = provider(coord);
        for exit in Face::ALL {
            if !admissible(state, entry, exit) {
                continue;
            }
            let next = coord.face_neighbor(exit);
            if next.chebyshev_distance(observer) > radius {
                continue;
            }
            if !result.reachable.insert(next) {
                continue;
            }
            queue.push_back((next, Some(exit.opposite())));
            consider_request(&mut result, next, camera, &provider);
        }
    }

    result
}

/// Whether the search may leave `state` through `exit`, having entered
/// through `entry`.
fn admissible(state: ChunkVisState, entry: Option<Face>, exit: Face) -> bool {
    let Some(entry) = entry else {
        // Seed transitions (the observer chunk) are always admissible.
        return true;
    };
    match state {
        ChunkVisState::Loaded(bits) => bits.connects(entry, exit),
        ChunkVisState::Pending | ChunkVisState::Missing => true,
    }
}

fn consider_request<F>(
    result: &mut VisibilityResult,
    coord: ChunkCoord,
    camera: &Camera,
    provider: &F,
) where
    F: Fn(ChunkCoord) -> ChunkVisState,
{
    if provider(coord) != ChunkVisState::Missing {
        return;
    }
    let aabb = coord.world_aabb();
    if !camera.frustum.intersects_aabb(&aabb) {
        return;
    }
    if (aabb.center() - camera.position).dot(camera.forward) < 0.0 {
        return;
    }
    result.to_request.push(coord);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
