//! Remesh scheduling: a coalescing queue of chunks awaiting surface
//! extraction, drained nearest-first under a per-tick time budget.

use rustc_hash::FxHashSet;

use loam_voxel::ChunkCoord;

/// Set-backed remesh queue. Duplicate enqueues coalesce; ordering is
/// decided at drain time against the current observer position.
#[derive(Debug, Default)]
pub struct RemeshQueue {
    pending: FxHashSet<ChunkCoord>,
}

impl RemeshQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
        }
    }

    /// Enqueues a chunk. Re-enqueueing is a no-op.
    pub fn enqueue(&mut self, coord: ChunkCoord) {
        self.pending.insert(coord);
    }

    /// Enqueues a chunk and its six face neighbors.
    pub fn enqueue_with_neighbors(&mut self, coord: ChunkCoord) {
        self.enqueue(coord);
        for face in loam_voxel::Face::ALL {
            self.enqueue(coord.face_neighbor(face));
        }
    }

    /// Drops a chunk from the queue (e.g. on unload).
    pub fn remove(&mut self, coord: ChunkCoord) {
        self.pending.remove(&coord);
    }

    /// Whether the chunk is queued.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.pending.contains(&coord)
    }

    /// Number of queued chunks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Snapshot of the queue ordered by squared chunk distance to the
    /// observer, nearest first. Ties break on the coordinate itself so the
    /// ordering is deterministic.
    pub fn sorted_by_distance(&self, observer: ChunkCoord) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.pending.iter().copied().collect();
        coords.sort_by_key(|coord| (coord.distance_sq(observer), *coord));
        coords
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_enqueues_coalesce() {
        let mut queue = RemeshQueue::new();
        queue.enqueue(ChunkCoord::new(1, 0, 0));
        queue.enqueue(ChunkCoord::new(1, 0, 0));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_enqueue_with_neighbors_adds_seven() {
        let mut queue = RemeshQueue::new();
        queue.enqueue_with_neighbors(ChunkCoord::new(0, 0, 0));
        assert_eq!(queue.len(), 7);
        assert!(queue.contains(ChunkCoord::new(-1, 0, 0)));
        assert!(queue.contains(ChunkCoord::new(0, 0, 1)));
    }

    #[test]
    fn test_drain_order_is_nearest_first() {
        let mut queue = RemeshQueue::new();
        queue.enqueue(ChunkCoord::new(5, 0, 0));
        queue.enqueue(ChunkCoord::new(1, 0, 0));
        queue.enqueue(ChunkCoord::new(3, 0, 0));
        let order = queue.sorted_by_distance(ChunkCoord::new(0, 0, 0));
        assert_eq!(
            order,
            vec![
                ChunkCoord::new(1, 0, 0),
                ChunkCoord::new(3, 0, 0),
                ChunkCoord::new(5, 0, 0)
            ]
        );
    }

    #[test]
    fn test_equal_distances_order_deterministically() {
        let mut a = RemeshQueue::new();
        let mut b = RemeshQueue::new();
        for coord in [
            ChunkCoord::new(1, 0, 0),
            ChunkCoord::new(0, 1, 0),
            ChunkCoord::new(0, 0, 1),
            ChunkCoord::new(-1, 0, 0),
        ] {
            a.enqueue(coord);
            b.enqueue(coord);
        }
        let observer = ChunkCoord::new(0, 0, 0);
        assert_eq!(a.sorted_by_distance(observer), b.sorted_by_distance(observer));
    }
}
