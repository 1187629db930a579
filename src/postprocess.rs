use rand::Rng;

use crate::bounds::BoundingBox;
use crate::cell::Cell;
use crate::container::{Container, Site};
use crate::error::{Error, Result};
use crate::sampling::TetraFan;

/// Per-site accumulators filled while iterating the container.
///
/// Rows are indexed by site ID and stay variable-length; padding happens only in
/// [`marshal`](crate::marshal::marshal). Sites that are never recorded (rejected
/// by the container, or whose cell vanished) keep their defaults: zero volume, no
/// neighbors, a bounding box collapsed on the site, no vertices, NaN samples.
#[derive(Debug)]
pub struct SiteRecords {
    pub volumes: Vec<f64>,
    pub bb_min: Vec<[f64; 3]>,
    pub bb_max: Vec<[f64; 3]>,
    pub neighbors: Vec<Vec<i32>>,
    /// Flat vertex coordinates per site, when requested.
    pub vertices: Option<Vec<Vec<f64>>>,
    /// `samples * 3` coordinates per site, when requested.
    pub samples: Option<Vec<f64>>,
    samples_per_site: usize,
    /// Number of sites recorded with a live cell.
    pub recorded: usize,
}

/// Scratch state reused across sites.
#[derive(Default)]
struct Scratch {
    cell: Cell,
    vertices: Vec<f64>,
    fan: TetraFan,
    points: Vec<f64>,
}

impl SiteRecords {
    /// Accumulators for the sites of `points` (flat triples).
    pub fn new(points: &[f64], with_vertices: bool, samples: Option<usize>) -> Result<Self> {
        let n = points.len() / 3;
        let mut bb_min = Vec::new();
        bb_min.try_reserve_exact(n)?;
        bb_min.extend(points.chunks_exact(3).map(|p| [p[0], p[1], p[2]]));
        let bb_max = bb_min.clone();

        let mut volumes = Vec::new();
        volumes.try_reserve_exact(n)?;
        volumes.resize(n, 0.0);

        let mut neighbors = Vec::new();
        neighbors.try_reserve_exact(n)?;
        neighbors.resize_with(n, Vec::new);

        let vertices = if with_vertices {
            let mut rows = Vec::new();
            rows.try_reserve_exact(n)?;
            rows.resize_with(n, Vec::new);
            Some(rows)
        } else {
            None
        };

        let samples_per_site = samples.unwrap_or(0);
        let samples = match samples {
            Some(k) => {
                let len = n
                    .checked_mul(k)
                    .and_then(|v| v.checked_mul(3))
                    .ok_or_else(|| Error::fault(format!("{} samples for {} sites overflow the sample array", k, n)))?;
                let mut flat = Vec::new();
                flat.try_reserve_exact(len)?;
                flat.resize(len, f64::NAN);
                Some(flat)
            }
            None => None,
        };

        Ok(Self {
            volumes,
            bb_min,
            bb_max,
            neighbors,
            vertices,
            samples,
            samples_per_site,
            recorded: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn samples_per_site(&self) -> usize {
        self.samples_per_site
    }

    /// Records the derived quantities of one computed cell.
    pub fn record<R: Rng + ?Sized>(&mut self, id: usize, cell: &Cell, scratch_vertices: &mut Vec<f64>, fan: &mut TetraFan, points: &mut Vec<f64>, rng: &mut R) -> Result<()> {
        if id >= self.len() {
            return Err(Error::fault(format!("container reported site {} but only {} sites exist", id, self.len())));
        }
        if cell.is_empty() {
            return Err(Error::fault(format!("the cell of site {} has no vertices", id)));
        }

        self.volumes[id] = cell.volume();

        // Vertices go straight into the output row when requested.
        let vertices = match self.vertices.as_mut() {
            Some(rows) => &mut rows[id],
            None => scratch_vertices,
        };
        vertices.clear();
        vertices.extend_from_slice(cell.vertices());

        let bb = BoundingBox::enclosing(vertices)
            .ok_or_else(|| Error::fault(format!("the cell of site {} has no vertices", id)))?;
        self.bb_min[id] = bb.min;
        self.bb_max[id] = bb.max;

        let row = &mut self.neighbors[id];
        row.clear();
        row.extend_from_slice(cell.neighbors());

        if let Some(samples) = self.samples.as_mut() {
            let k = self.samples_per_site;
            fan.build(cell);
            points.clear();
            fan.sample(cell, k, rng, points)?;
            samples[id * k * 3..(id + 1) * k * 3].copy_from_slice(points);
        }

        self.recorded += 1;
        Ok(())
    }
}

/// Runs every site of `container` through the post-processor into `records`.
pub fn process_cells<C, R>(container: &C, records: &mut SiteRecords, rng: &mut R) -> Result<()>
where
    C: Container,
    R: Rng + ?Sized,
{
    let mut scratch = Scratch::default();
    for site in container.sites() {
        process_site(container, &site, records, &mut scratch, rng)?;
    }
    Ok(())
}

fn process_site<C, R>(container: &C, site: &Site, records: &mut SiteRecords, scratch: &mut Scratch, rng: &mut R) -> Result<()>
where
    C: Container,
    R: Rng + ?Sized,
{
    let Scratch { cell, vertices, fan, points } = scratch;
    if !container.compute_cell(site, cell)? {
        log::debug!("the cell of site {} vanished", site.id);
        return Ok(());
    }
    records.record(site.id, cell, vertices, fan, points, rng)
}
