use crate::bounds::BoundingBox;
use crate::error::{Error, Result};
use crate::bounds::{BOX_ID_BACK, BOX_ID_BOTTOM, BOX_ID_FRONT, BOX_ID_LEFT, BOX_ID_RIGHT, BOX_ID_TOP};

/// Distance below which a vertex counts as lying on a clipping plane, relative to
/// the largest extent of the box the cell started from.
const PLANE_EPS: f64 = 1e-9;

/// Scratch buffers reused between clips of the same cell.
#[derive(Default, Clone, Debug)]
struct ClipScratch {
    vertices: Vec<f64>,
    face_counts: Vec<u32>,
    face_indices: Vec<u32>,
    face_neighbors: Vec<i32>,
    dists: Vec<f64>,
    is_intersection: Vec<bool>,
    old_to_new: Vec<Option<u32>>,
    intersection_map: Vec<(u64, u32)>,
    lid_segments: Vec<(u32, u32)>,
    lid_map: Vec<u32>,
    face_buffer: Vec<u32>,
    lid_buffer: Vec<u32>,
}

/// A convex polyhedron: the Voronoi cell of one site.
///
/// Faces are consistently oriented (counter-clockwise seen from outside) lists of
/// indices into the vertex list, and every face carries the ID of what lies on its
/// other side: a site ID (`>= 0`) or a negative boundary marker.
#[derive(Clone, Debug)]
pub struct Cell {
    // Flat array of vertices [x, y, z, x, y, z, ...]
    vertices: Vec<f64>,
    // Number of vertices for each face
    face_counts: Vec<u32>,
    // Flattened indices for all faces
    face_indices: Vec<u32>,
    // Neighbor ID for each face
    face_neighbors: Vec<i32>,
    // Absolute on-plane tolerance, scaled to the cell's starting size
    tolerance: f64,
    scratch: ClipScratch,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            face_counts: Vec::new(),
            face_indices: Vec::new(),
            face_neighbors: Vec::new(),
            tolerance: PLANE_EPS,
            scratch: ClipScratch::default(),
        }
    }
}

impl Cell {
    /// An empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// The whole box as a cell, each face tagged with its box side ID.
    pub fn from_box(bounds: &BoundingBox) -> Self {
        let mut cell = Self::new();
        cell.reset(bounds);
        cell
    }

    /// Builds a cell from explicit geometry. Faces must be oriented consistently.
    ///
    /// Fails with `InvalidArgument` when the vertex list is not made of triples,
    /// when `neighbors` does not hold one ID per face, or when a face refers to a
    /// missing vertex.
    pub fn from_faces(vertices: Vec<f64>, faces: &[Vec<usize>], neighbors: Vec<i32>) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            return Err(Error::invalid(format!("cell vertices must come in triples, got {} values", vertices.len())));
        }
        if faces.len() != neighbors.len() {
            return Err(Error::invalid(format!(
                "one neighbor per face is required, got {} faces and {} neighbors",
                faces.len(),
                neighbors.len()
            )));
        }
        let n = vertices.len() / 3;
        if let Some(&i) = faces.iter().flatten().find(|&&i| i >= n || i > u32::MAX as usize) {
            return Err(Error::invalid(format!("face vertex {} out of range ({} vertices)", i, n)));
        }

        let mut cell = Self::new();
        if let Some(bb) = BoundingBox::enclosing(&vertices) {
            cell.tolerance = scaled_tolerance(&bb);
        }
        cell.vertices = vertices;
        for face in faces {
            cell.face_counts.push(face.len() as u32);
            cell.face_indices.extend(face.iter().map(|&i| i as u32));
        }
        cell.face_neighbors = neighbors;
        Ok(cell)
    }

    /// Reinitializes the cell to `bounds`, keeping allocations.
    pub fn reset(&mut self, bounds: &BoundingBox) {
        let [x0, y0, z0] = bounds.min;
        let [x1, y1, z1] = bounds.max;
        self.tolerance = scaled_tolerance(bounds);

        self.vertices.clear();
        self.vertices.extend_from_slice(&[
            x0, y0, z0, // 0
            x1, y0, z0, // 1
            x1, y1, z0, // 2
            x0, y1, z0, // 3
            x0, y0, z1, // 4
            x1, y0, z1, // 5
            x1, y1, z1, // 6
            x0, y1, z1, // 7
        ]);

        self.face_counts.clear();
        self.face_counts.extend_from_slice(&[4, 4, 4, 4, 4, 4]);

        self.face_indices.clear();
        self.face_indices.extend_from_slice(&[
            0, 4, 7, 3, // x-
            1, 2, 6, 5, // x+
            0, 1, 5, 4, // y-
            2, 3, 7, 6, // y+
            3, 2, 1, 0, // z-
            4, 5, 6, 7, // z+
        ]);

        self.face_neighbors.clear();
        self.face_neighbors.extend_from_slice(&[
            BOX_ID_LEFT,
            BOX_ID_RIGHT,
            BOX_ID_FRONT,
            BOX_ID_BACK,
            BOX_ID_BOTTOM,
            BOX_ID_TOP,
        ]);
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.face_counts.clear();
        self.face_indices.clear();
        self.face_neighbors.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Flat array of vertices `[x, y, z, x, y, z, ...]`.
    pub fn vertices(&self) -> &[f64] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn vertex(&self, index: usize) -> [f64; 3] {
        [
            self.vertices[index * 3],
            self.vertices[index * 3 + 1],
            self.vertices[index * 3 + 2],
        ]
    }

    pub fn face_count(&self) -> usize {
        self.face_counts.len()
    }

    /// Iterates the faces as slices of vertex indices.
    pub fn faces(&self) -> impl Iterator<Item = &[u32]> + '_ {
        let mut offset = 0;
        self.face_counts.iter().map(move |&count| {
            let face = &self.face_indices[offset..offset + count as usize];
            offset += count as usize;
            face
        })
    }

    /// Neighbor ID of every face, in face order. Negative values are boundaries.
    pub fn neighbors(&self) -> &[i32] {
        &self.face_neighbors
    }

    pub fn volume(&self) -> f64 {
        if self.vertices.is_empty() {
            return 0.0;
        }
        // Pivot on vertex 0 to keep the terms small.
        let o = self.vertex(0);
        let mut volume = 0.0;

        for face in self.faces() {
            if face.len() < 3 {
                continue;
            }
            let a = sub(self.vertex(face[0] as usize), o);
            for i in 1..face.len() - 1 {
                let b = sub(self.vertex(face[i] as usize), o);
                let c = sub(self.vertex(face[i + 1] as usize), o);
                volume += triple(a, b, c);
            }
        }

        (volume / 6.0).abs()
    }

    /// Squared distance from `center` to the furthest vertex.
    pub fn max_radius_sq(&self, center: &[f64; 3]) -> f64 {
        let mut max_d2: f64 = 0.0;
        for v in self.vertices.chunks_exact(3) {
            let dx = v[0] - center[0];
            let dy = v[1] - center[1];
            let dz = v[2] - center[2];
            max_d2 = max_d2.max(dx * dx + dy * dy + dz * dz);
        }
        max_d2
    }

    /// Clips the cell by the plane through `point` with outward `normal`, tagging the
    /// new face with `neighbor_id`. `normal` need not be unit length; a zero normal
    /// leaves the cell untouched.
    ///
    /// Returns `(true, new_max_radius_sq)` if the cell was modified, or `(false, 0.0)`
    /// if not. The radius is measured from `site` and is only computed when a site is
    /// given.
    pub fn clip(&mut self, point: &[f64; 3], normal: &[f64; 3], neighbor_id: i32, site: Option<&[f64; 3]>) -> (bool, f64) {
        let Cell { vertices, face_counts, face_indices, face_neighbors, tolerance, scratch } = self;
        let eps = *tolerance;

        let len = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
        if !(len > 0.0) || !len.is_finite() {
            return (false, 0.0);
        }
        let normal = [normal[0] / len, normal[1] / len, normal[2] / len];

        let num_verts = vertices.len() / 3;
        scratch.dists.clear();
        let mut all_inside = true;
        let mut all_outside = true;

        // 1. Signed distances to the plane
        for v in vertices.chunks_exact(3) {
            let d = (v[0] - point[0]) * normal[0] + (v[1] - point[1]) * normal[1] + (v[2] - point[2]) * normal[2];
            scratch.dists.push(d);
            if d > eps {
                all_inside = false;
            } else if d < -eps {
                all_outside = false;
            }
        }

        if all_inside {
            return (false, 0.0);
        }
        if all_outside {
            vertices.clear();
            face_counts.clear();
            face_indices.clear();
            face_neighbors.clear();
            return (true, 0.0);
        }

        // 2. Keep the vertices on the inner side
        scratch.vertices.clear();
        scratch.face_counts.clear();
        scratch.face_indices.clear();
        scratch.face_neighbors.clear();
        scratch.is_intersection.clear();
        scratch.old_to_new.clear();
        scratch.old_to_new.resize(num_verts, None);
        scratch.intersection_map.clear();
        scratch.lid_segments.clear();

        let mut max_d2: f64 = 0.0;

        for i in 0..num_verts {
            if scratch.dists[i] <= eps {
                let p = [vertices[i * 3], vertices[i * 3 + 1], vertices[i * 3 + 2]];
                let new_idx = push_vertex(scratch, p, false, site, &mut max_d2);
                scratch.old_to_new[i] = Some(new_idx);
            }
        }

        // 3. Clip each face
        let mut offset = 0;
        for (face_idx, &count) in face_counts.iter().enumerate() {
            let count = count as usize;
            let face = &face_indices[offset..offset + count];
            offset += count;

            scratch.face_buffer.clear();
            for i in 0..count {
                let s = face[i] as usize;
                let e = face[(i + 1) % count] as usize;
                let s_in = scratch.dists[s] <= eps;
                let e_in = scratch.dists[e] <= eps;

                if s_in && e_in {
                    if let Some(idx) = scratch.old_to_new[e] {
                        scratch.face_buffer.push(idx);
                    }
                } else if s_in {
                    // Leaving the kept side: only the crossing point.
                    let idx = split_edge(scratch, vertices, s, e, site, &mut max_d2);
                    scratch.face_buffer.push(idx);
                } else if e_in {
                    // Entering the kept side: crossing point, then the end vertex.
                    let idx = split_edge(scratch, vertices, s, e, site, &mut max_d2);
                    scratch.face_buffer.push(idx);
                    if let Some(idx) = scratch.old_to_new[e] {
                        scratch.face_buffer.push(idx);
                    }
                }
            }

            if scratch.face_buffer.len() >= 3 {
                scratch.face_counts.push(scratch.face_buffer.len() as u32);
                scratch.face_neighbors.push(face_neighbors[face_idx]);

                // Segments connecting two crossing points bound the new face.
                let n = scratch.face_buffer.len();
                for i in 0..n {
                    let u = scratch.face_buffer[i];
                    let v = scratch.face_buffer[(i + 1) % n];
                    if scratch.is_intersection[u as usize] && scratch.is_intersection[v as usize] {
                        scratch.lid_segments.push((v, u));
                    }
                }
                scratch.face_indices.extend_from_slice(&scratch.face_buffer);
            }
        }

        // 4. Close the cell with the face lying on the clipping plane
        if !scratch.lid_segments.is_empty() {
            scratch.lid_buffer.clear();
            scratch.lid_map.clear();
            scratch.lid_map.resize(scratch.vertices.len() / 3, u32::MAX);
            for &(u, v) in &scratch.lid_segments {
                scratch.lid_map[u as usize] = v;
            }

            let (start, next) = scratch.lid_segments[0];
            scratch.lid_buffer.push(start);
            let mut current = next;
            while current != start && scratch.lid_buffer.len() <= scratch.lid_segments.len() {
                scratch.lid_buffer.push(current);
                current = scratch.lid_map[current as usize];
                if current == u32::MAX {
                    break;
                }
            }

            if scratch.lid_buffer.len() >= 3 {
                scratch.face_counts.push(scratch.lid_buffer.len() as u32);
                scratch.face_indices.extend_from_slice(&scratch.lid_buffer);
                scratch.face_neighbors.push(neighbor_id);
            }
        }

        std::mem::swap(vertices, &mut scratch.vertices);
        std::mem::swap(face_counts, &mut scratch.face_counts);
        std::mem::swap(face_indices, &mut scratch.face_indices);
        std::mem::swap(face_neighbors, &mut scratch.face_neighbors);

        (true, max_d2)
    }
}

fn push_vertex(scratch: &mut ClipScratch, p: [f64; 3], is_intersection: bool, site: Option<&[f64; 3]>, max_d2: &mut f64) -> u32 {
    let idx = (scratch.vertices.len() / 3) as u32;
    scratch.vertices.extend_from_slice(&p);
    scratch.is_intersection.push(is_intersection);
    if let Some(g) = site {
        let d = sub(p, *g);
        *max_d2 = max_d2.max(d[0] * d[0] + d[1] * d[1] + d[2] * d[2]);
    }
    idx
}

/// Index of the point where edge `(a, b)` crosses the plane, created on first use.
fn split_edge(scratch: &mut ClipScratch, vertices: &[f64], a: usize, b: usize, site: Option<&[f64; 3]>, max_d2: &mut f64) -> u32 {
    let key = if a < b { (a as u64) << 32 | b as u64 } else { (b as u64) << 32 | a as u64 };
    if let Some(&(_, idx)) = scratch.intersection_map.iter().find(|&&(k, _)| k == key) {
        return idx;
    }

    let d_a = scratch.dists[a];
    let d_b = scratch.dists[b];
    let t = (d_a / (d_a - d_b)).clamp(0.0, 1.0);
    let p = [
        vertices[a * 3] + t * (vertices[b * 3] - vertices[a * 3]),
        vertices[a * 3 + 1] + t * (vertices[b * 3 + 1] - vertices[a * 3 + 1]),
        vertices[a * 3 + 2] + t * (vertices[b * 3 + 2] - vertices[a * 3 + 2]),
    ];
    let idx = push_vertex(scratch, p, true, site, max_d2);
    scratch.intersection_map.push((key, idx));
    idx
}

/// On-plane tolerance for a cell spanning `bounds`.
fn scaled_tolerance(bounds: &BoundingBox) -> f64 {
    let scale = bounds.extents().into_iter().fold(0.0, f64::max);
    if scale.is_finite() && scale > 0.0 { PLANE_EPS * scale } else { PLANE_EPS }
}

#[inline]
pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Scalar triple product `a . (b x c)`.
#[inline]
pub(crate) fn triple(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> f64 {
    a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0]) + a[2] * (b[0] * c[1] - b[1] * c[0])
}
