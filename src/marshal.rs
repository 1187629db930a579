use crate::bounds::BoundingBox;
use crate::error::{Error, Result};
use crate::postprocess::SiteRecords;

/// Padding of unused neighbor slots. Distinct from every site ID (`>= 0`), box
/// face ID (`-1..=-6`) and the wall ID (`-7`).
pub const NEIGHBOR_SENTINEL: i32 = -10;

/// Fixed-width, row-major output of one call. Row `i` always belongs to site `i`.
#[derive(Clone, Debug, Default)]
pub struct CellArrays {
    /// `len() * max_neighbors` neighbor IDs, padded with [`NEIGHBOR_SENTINEL`].
    pub neighbors: Vec<i32>,
    pub max_neighbors: usize,
    /// One volume per site.
    pub volumes: Vec<f64>,
    /// `len() * 3` lower cell bounds.
    pub bb_min: Vec<f64>,
    /// `len() * 3` upper cell bounds.
    pub bb_max: Vec<f64>,
    /// `len() * max_vertex_coords` vertex coordinates padded with NaN, if requested.
    pub vertices: Option<Vec<f64>>,
    /// Row width of `vertices`; 0 when vertices were not requested.
    pub max_vertex_coords: usize,
    /// `len() * samples_per_site * 3` sample coordinates, if requested.
    pub sample_points: Option<Vec<f64>>,
    pub samples_per_site: usize,
}

impl CellArrays {
    /// Number of sites.
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Neighbor IDs of site `i`, without padding.
    pub fn neighbors_of(&self, i: usize) -> &[i32] {
        let row = &self.neighbors[i * self.max_neighbors..(i + 1) * self.max_neighbors];
        let end = row.iter().position(|&n| n == NEIGHBOR_SENTINEL).unwrap_or(row.len());
        &row[..end]
    }

    /// Vertex coordinates of site `i` as flat triples, without padding.
    pub fn vertices_of(&self, i: usize) -> Option<&[f64]> {
        let vertices = self.vertices.as_ref()?;
        let row = &vertices[i * self.max_vertex_coords..(i + 1) * self.max_vertex_coords];
        let end = row.iter().position(|v| v.is_nan()).unwrap_or(row.len());
        Some(&row[..end])
    }

    pub fn bounding_box(&self, i: usize) -> BoundingBox {
        BoundingBox::new(
            [self.bb_min[i * 3], self.bb_min[i * 3 + 1], self.bb_min[i * 3 + 2]],
            [self.bb_max[i * 3], self.bb_max[i * 3 + 1], self.bb_max[i * 3 + 2]],
        )
    }

    /// Sample points of site `i` as flat triples.
    pub fn samples_of(&self, i: usize) -> Option<&[f64]> {
        let k = self.samples_per_site * 3;
        self.sample_points.as_ref().map(|s| &s[i * k..(i + 1) * k])
    }

    pub fn total_volume(&self) -> f64 {
        self.volumes.iter().sum()
    }
}

/// Packs the variable-length per-site records into fixed-width arrays.
pub fn marshal(records: SiteRecords) -> Result<CellArrays> {
    let samples_per_site = records.samples_per_site();
    let SiteRecords { volumes, bb_min, bb_max, neighbors, vertices, samples, .. } = records;

    let max_neighbors = neighbors.iter().map(Vec::len).max().unwrap_or(0);
    let neighbors = pad_rows(&neighbors, max_neighbors, NEIGHBOR_SENTINEL)?;

    let (vertices, max_vertex_coords) = match vertices {
        Some(rows) => {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            (Some(pad_rows(&rows, width, f64::NAN)?), width)
        }
        None => (None, 0),
    };

    Ok(CellArrays {
        neighbors,
        max_neighbors,
        volumes,
        bb_min: flatten(&bb_min)?,
        bb_max: flatten(&bb_max)?,
        vertices,
        max_vertex_coords,
        sample_points: samples,
        samples_per_site,
    })
}

/// Copies each row into a `rows.len() * width` array, filling the tail with `pad`.
fn pad_rows<T: Copy>(rows: &[Vec<T>], width: usize, pad: T) -> Result<Vec<T>> {
    let len = rows
        .len()
        .checked_mul(width)
        .ok_or_else(|| Error::fault(format!("{} rows of width {} overflow the output array", rows.len(), width)))?;
    let mut out = Vec::new();
    out.try_reserve_exact(len)?;
    for row in rows {
        out.extend_from_slice(row);
        out.extend(std::iter::repeat(pad).take(width - row.len()));
    }
    Ok(out)
}

fn flatten(points: &[[f64; 3]]) -> Result<Vec<f64>> {
    let len = points
        .len()
        .checked_mul(3)
        .ok_or_else(|| Error::fault(format!("{} points overflow the output array", points.len())))?;
    let mut out = Vec::new();
    out.try_reserve_exact(len)?;
    out.extend(points.iter().flatten());
    Ok(out)
}
