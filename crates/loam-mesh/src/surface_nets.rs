//! Surface-nets contouring over a chunk and its neighbor margin.
//!
//! One vertex is placed per sign-spanning cell at the mass-weighted centroid
//! of its edge zero-crossings; quads are emitted across sign-changing
//! lattice edges and routed to the solid, transparent, or liquid layer by
//! the material on the inside of the crossing.
//!
//! The sample grid spans `[-1, CHUNK_SIZE]` per axis (margin through the
//! neighbor view), and a quad is emitted only when its edge base lies in
//! `[0, CHUNK_SIZE)`. The chunk on the other side of a boundary sees that
//! same edge at base −1 and skips it, so seams get exactly one set of
//! geometry.

use glam::Vec3;
use rustc_hash::FxHashMap;

use loam_voxel::{CHUNK_SIZE, NeighborChunks, VOXEL_SIZE, VoxelChunk, voxel};

use crate::mesh::{MaterialClasses, MeshLayer, MeshLayers, MeshVertex, SurfaceMesh};

/// Samples per axis: the chunk plus a one-voxel margin on both sides.
const N: usize = CHUNK_SIZE + 2;

/// Cells per axis (between adjacent samples).
const CELLS: usize = N - 1;

/// Marker for "no vertex in this cell".
const NO_VERTEX: u32 = u32::MAX;

/// Corner offsets of a cell, index bits: 0 = +x, 1 = +y, 2 = +z.
const CORNER_OFFSETS: [(usize, usize, usize); 8] = [
    (0, 0, 0),
    (1, 0, 0),
    (0, 1, 0),
    (1, 1, 0),
    (0, 0, 1),
    (1, 0, 1),
    (0, 1, 1),
    (1, 1, 1),
];

/// The 12 cell edges as corner-index pairs.
const CUBE_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [0, 2],
    [0, 4],
    [1, 3],
    [1, 5],
    [2, 3],
    [2, 6],
    [3, 7],
    [4, 5],
    [4, 6],
    [5, 7],
    [6, 7],
];

/// Extracts the layered surface meshes for a chunk.
///
/// Output is bit-identical for identical inputs: traversal order, vertex
/// numbering, and the quad split rule are all fixed.
pub fn mesh_chunk(
    chunk: &VoxelChunk,
    neighbors: &NeighborChunks,
    classes: &MaterialClasses,
) -> MeshLayers {
    let grid = SampleGrid::collect(chunk, neighbors);
    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut cell_vertex = vec![NO_VERTEX; CELLS * CELLS * CELLS];

    // Vertex pass: one vertex per sign-spanning cell, fixed z→y→x order.
    for cz in 0..CELLS {
        for cy in 0..CELLS {
            for cx in 0..CELLS {
                let mut weights = [0.0f32; 8];
                let mut mask = 0u8;
                for (k, (dx, dy, dz)) in CORNER_OFFSETS.iter().enumerate() {
                    let w = grid.weight(cx + dx, cy + dy, cz + dz);
                    weights[k] = w;
                    if w > 0.0 {
                        mask |= 1 << k;
                    }
                }
                if mask == 0 || mask == 0xFF {
                    continue;
                }
                let id = vertices.len() as u32;
                vertices.push(build_vertex(&grid, cx, cy, cz, &weights));
                cell_vertex[cell_index(cx, cy, cz)] = id;
            }
        }
    }

    // Edge pass: quads across sign-changing edges whose base sample lies in
    // this chunk's own sample range.
    let mut layers = MeshLayers::default();
    let mut remaps: [FxHashMap<u32, u32>; 3] = Default::default();

    for gz in 1..=CHUNK_SIZE {
        for gy in 1..=CHUNK_SIZE {
            for gx in 1..=CHUNK_SIZE {
                for axis in 0..3 {
                    let (ax, ay, az) = AXIS_OFFSETS[axis];
                    let w0 = grid.weight(gx, gy, gz);
                    let w1 = grid.weight(gx + ax, gy + ay, gz + az);
                    let inside0 = w0 > 0.0;
                    let inside1 = w1 > 0.0;
                    if inside0 == inside1 {
                        continue;
                    }

                    let material = if inside0 {
                        grid.material(gx, gy, gz)
                    } else {
                        grid.material(gx + ax, gy + ay, gz + az)
                    };
                    let layer = classes.classify(material);

                    let Some(quad) = quad_cells(&cell_vertex, gx, gy, gz, axis) else {
                        continue;
                    };
                    emit_quad(
                        layers.layer_mut(layer),
                        &mut remaps[layer_slot(layer)],
                        &vertices,
                        quad,
                        inside0,
                        axis,
                    );
                }
            }
        }
    }

    layers
}

/// Unit sample offsets per axis.
const AXIS_OFFSETS: [(usize, usize, usize); 3] = [(1, 0, 0), (0, 1, 0), (0, 0, 1)];

/// Decoded voxel samples over the margin grid.
struct SampleGrid {
    weights: Vec<f32>,
    materials: Vec<u8>,
    lights: Vec<u8>,
}

impl SampleGrid {
    fn collect(chunk: &VoxelChunk, neighbors: &NeighborChunks) -> Self {
        let mut weights = vec![0.0f32; N * N * N];
        let mut materials = vec![0u8; N * N * N];
        let mut lights = vec![0u8; N * N * N];
        for gz in 0..N {
            for gy in 0..N {
                for gx in 0..N {
                    let v = chunk.sample_with_margin(
                        gx as i32 - 1,
                        gy as i32 - 1,
                        gz as i32 - 1,
                        neighbors,
                    );
                    let idx = sample_index(gx, gy, gz);
                    weights[idx] = voxel::weight(v);
                    materials[idx] = voxel::material(v);
                    lights[idx] = voxel::light(v);
                }
            }
        }
        Self {
            weights,
            materials,
            lights,
        }
    }

    fn weight(&self, gx: usize, gy: usize, gz: usize) -> f32 {
        self.weights[sample_index(gx, gy, gz)]
    }

    fn material(&self, gx: usize, gy: usize, gz: usize) -> u8 {
        self.materials[sample_index(gx, gy, gz)]
    }

    fn light(&self, gx: usize, gy: usize, gz: usize) -> u8 {
        self.lights[sample_index(gx, gy, gz)]
    }
}

fn sample_index(gx: usize, gy: usize, gz: usize) -> usize {
    gx + gy * N + gz * N * N
}

fn cell_index(cx: usize, cy: usize, cz: usize) -> usize {
    cx + cy * CELLS + cz * CELLS * CELLS
}

fn layer_slot(layer: MeshLayer) -> usize {
    match layer {
        MeshLayer::Solid => 0,
        MeshLayer::Transparent => 1,
        MeshLayer::Liquid => 2,
    }
}

/// Builds the vertex for a sign-spanning cell.
///
/// `cx/cy/cz` are cell-grid indices; the cell's minimum sample corner is at
/// lattice position `(cx − 1, cy − 1, cz − 1)`.
fn build_vertex(
    grid: &SampleGrid,
    cx: usize,
    cy: usize,
    cz: usize,
    weights: &[f32; 8],
) -> MeshVertex {
    // Mass-weighted centroid of edge zero-crossings.
    let mut sum = Vec3::ZERO;
    let mut crossings = 0u32;
    for [a, b] in CUBE_EDGES {
        let wa = weights[a];
        let wb = weights[b];
        if (wa > 0.0) == (wb > 0.0) {
            continue;
        }
        let t = wa / (wa - wb);
        let pa = corner_position(a);
        let pb = corner_position(b);
        sum += pa + (pb - pa) * t;
        crossings += 1;
    }
    let centroid = if crossings == 0 {
        Vec3::splat(0.5)
    } else {
        sum / crossings as f32
    };

    let cell_min = Vec3::new(cx as f32 - 1.0, cy as f32 - 1.0, cz as f32 - 1.0);
    let position = (cell_min + centroid) * VOXEL_SIZE;

    // Outward normal from the density gradient (density rises into the
    // solid, so the surface faces the negative gradient).
    let gx = (weights[1] + weights[3] + weights[5] + weights[7]
        - weights[0]
        - weights[2]
        - weights[4]
        - weights[6])
        * 0.25;
    let gy = (weights[2] + weights[3] + weights[6] + weights[7]
        - weights[0]
        - weights[1]
        - weights[4]
        - weights[5])
        * 0.25;
    let gz = (weights[4] + weights[5] + weights[6] + weights[7]
        - weights[0]
        - weights[1]
        - weights[2]
        - weights[3])
        * 0.25;
    let gradient = Vec3::new(gx, gy, gz);
    let normal = if gradient.length_squared() > 1e-12 {
        (-gradient).normalize()
    } else {
        Vec3::Y
    };

    let (material_ids, material_weights) = dominant_materials(grid, cx, cy, cz, weights);

    let mut light_sum = 0u32;
    for (dx, dy, dz) in CORNER_OFFSETS {
        light_sum += grid.light(cx + dx, cy + dy, cz + dz) as u32;
    }

    MeshVertex {
        position: position.to_array(),
        normal: normal.to_array(),
        material_ids,
        material_weights,
        light: light_sum as f32 / (8.0 * 15.0),
    }
}

fn corner_position(k: usize) -> Vec3 {
    let (dx, dy, dz) = CORNER_OFFSETS[k];
    Vec3::new(dx as f32, dy as f32, dz as f32)
}

/// Up to three dominant materials among the cell's solid corners, with
/// normalized blend weights. Ordered by corner count, ties broken by the
/// lower material id, so output is stable.
fn dominant_materials(
    grid: &SampleGrid,
    cx: usize,
    cy: usize,
    cz: usize,
    weights: &[f32; 8],
) -> ([u8; 4], [f32; 3]) {
    let mut counts: Vec<(u8, u32)> = Vec::with_capacity(4);
    for (k, (dx, dy, dz)) in CORNER_OFFSETS.iter().enumerate() {
        if weights[k] <= 0.0 {
            continue;
        }
        let material = grid.material(cx + dx, cy + dy, cz + dz);
        if material == 0 {
            continue;
        }
        match counts.iter_mut().find(|(m, _)| *m == material) {
            Some((_, c)) => *c += 1,
            None => counts.push((material, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    counts.truncate(3);

    if counts.is_empty() {
        return ([0; 4], [1.0, 0.0, 0.0]);
    }
    let total: u32 = counts.iter().map(|(_, c)| c).sum();
    let mut ids = [counts[0].0; 4];
    ids[3] = 0;
    let mut blend = [0.0f32; 3];
    for (i, (material, count)) in counts.iter().enumerate() {
        ids[i] = *material;
        blend[i] = *count as f32 / total as f32;
    }
    (ids, blend)
}

/// The four cell-vertex ids around an edge, or `None` if any cell lacks a
/// vertex (cannot happen for a genuine sign-changing edge, but kept safe).
fn quad_cells(
    cell_vertex: &[u32],
    gx: usize,
    gy: usize,
    gz: usize,
    axis: usize,
) -> Option<[u32; 4]> {
    // Cells sharing an edge along `axis` vary over the other two axes.
    // Cell-grid index of the cell whose min corner sits at the edge base is
    // (gx, gy, gz) itself (cell c covers samples c-1..c in grid indexing).
    let cell = |dx: usize, dy: usize, dz: usize| -> u32 {
        cell_vertex[cell_index(gx - dx, gy - dy, gz - dz)]
    };
    let ids = match axis {
        0 => [cell(0, 1, 1), cell(0, 0, 1), cell(0, 1, 0), cell(0, 0, 0)],
        1 => [cell(1, 0, 1), cell(1, 0, 0), cell(0, 0, 1), cell(0, 0, 0)],
        _ => [cell(1, 1, 0), cell(0, 1, 0), cell(1, 0, 0), cell(0, 0, 0)],
    };
    if ids.iter().any(|&id| id == NO_VERTEX) {
        return None;
    }
    Some(ids)
}

/// Emits one quad (two triangles, fixed split) into a layer mesh, copying
/// referenced vertices into the layer's buffer on first use.
fn emit_quad(
    mesh: &mut SurfaceMesh,
    remap: &mut FxHashMap<u32, u32>,
    vertices: &[MeshVertex],
    quad: [u32; 4],
    inside_low: bool,
    axis: usize,
) {
    let mut local = [0u32; 4];
    for (slot, &global) in local.iter_mut().zip(&quad) {
        *slot = *remap.entry(global).or_insert_with(|| {
            let id = mesh.vertices.len() as u32;
            mesh.vertices.push(vertices[global as usize]);
            id
        });
    }
    let [v00, v10, v01, v11] = local;
    // Winding flips with the crossing direction; the Y axis flips once more
    // to keep the cyclic (axis, u, v) frames consistent.
    let flip = inside_low ^ (axis == 1);
    if flip {
        mesh.indices
            .extend_from_slice(&[v00, v01, v11, v00, v11, v10]);
    } else {
        mesh.indices
            .extend_from_slice(&[v00, v10, v11, v00, v11, v01]);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
