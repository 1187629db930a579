use std::panic::{self, AssertUnwindSafe};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::blocks::block_counts;
use crate::bounds::BoundingBox;
use crate::container::{Backend, Container, GridBackend};
use crate::error::{Error, Result};
use crate::marshal::{marshal, CellArrays};
use crate::neighbors::symmetrize;
use crate::options::Options;
use crate::postprocess::{process_cells, SiteRecords};
use crate::util::Timed;
use crate::wall::configure_wall;

/// One independent point cloud, e.g. the sites owned by one partition of a
/// larger simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    pub bounds: BoundingBox,
    /// Flat `[x, y, z, ...]` site coordinates.
    pub points: Vec<f64>,
}

impl Partition {
    pub fn new(bounds: BoundingBox, points: Vec<f64>) -> Self {
        Self { bounds, points }
    }
}

/// Tessellates `points` inside `bounds` and returns the per-site cell arrays.
///
/// Uses the built-in [`GridBackend`] and an entropy-seeded generator for the
/// optional volume sampling.
pub fn compute(bounds: &BoundingBox, points: &[f64], options: &Options) -> Result<CellArrays> {
    let mut rng = StdRng::from_entropy();
    compute_with(&GridBackend, bounds, points, options, &mut rng)
}

/// Same as [`compute`] with an injected tessellation backend and generator.
///
/// Any panic raised while processing is caught here and reported as
/// [`Error::InternalFault`]; no partial output is returned.
pub fn compute_with<B, R>(backend: &B, bounds: &BoundingBox, points: &[f64], options: &Options, rng: &mut R) -> Result<CellArrays>
where
    B: Backend,
    R: Rng + ?Sized,
{
    match panic::catch_unwind(AssertUnwindSafe(|| run(backend, bounds, points, options, rng))) {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!("panic while computing the Voronoi grid: {}", msg);
            Err(Error::fault(msg))
        }
    }
}

/// Runs [`compute`] over every partition on the rayon pool. Results keep the
/// order of `partitions`.
pub fn compute_partitions(partitions: &[Partition], options: &Options) -> Vec<Result<CellArrays>> {
    let _t = Timed::at("partitions", options.log_level());
    partitions
        .par_iter()
        .map(|p| compute(&p.bounds, &p.points, options))
        .collect()
}

/// Checks the domain and the site coordinates. Returns the number of sites.
fn validate(bounds: &BoundingBox, points: &[f64]) -> Result<usize> {
    bounds.validate()?;
    if points.len() % 3 != 0 {
        return Err(Error::invalid(format!(
            "the site coordinates must come in triples, got {} values",
            points.len()
        )));
    }
    let n = points.len() / 3;
    if n > i32::MAX as usize {
        return Err(Error::invalid(format!("too many sites: {}", n)));
    }
    if let Some(i) = points.iter().position(|v| !v.is_finite()) {
        return Err(Error::invalid(format!(
            "coordinate {} of site {} is not finite: {}",
            i % 3,
            i / 3,
            points[i]
        )));
    }
    Ok(n)
}

fn run<B, R>(backend: &B, bounds: &BoundingBox, points: &[f64], options: &Options, rng: &mut R) -> Result<CellArrays>
where
    B: Backend,
    R: Rng + ?Sized,
{
    let level = options.log_level();
    let n = validate(bounds, points)?;
    let wall = configure_wall(options.wall.as_ref(), options.unknown_wall, level)?;

    let blocks = block_counts(bounds, n);
    log::log!(level, "Number of sites: {}", n);
    log::log!(level, "Domain: {:?} - {:?}", bounds.min, bounds.max);
    log::log!(level, "Block grid: {:?}", blocks);
    log::log!(level, "Vertices: {}, samples per cell: {:?}", options.with_vertices, options.samples);

    let mut container = backend.container(bounds, blocks)?;
    if let Some(wall) = wall {
        container.add_wall(wall);
    }

    let mut inserted = 0;
    for (id, p) in points.chunks_exact(3).enumerate() {
        if container.put(id, [p[0], p[1], p[2]]) {
            inserted += 1;
        } else {
            log::debug!("site {} at {:?} lies outside the domain and is excluded", id, p);
        }
    }
    if inserted < n {
        log::warn!("{} of {} sites lie outside the domain and were excluded", n - inserted, n);
    }

    let mut records = SiteRecords::new(points, options.with_vertices, options.samples)?;
    {
        let _t = Timed::at("cell post-processing", level);
        process_cells(&container, &mut records, rng)?;
    }
    drop(container);

    let added = symmetrize(&mut records.neighbors)?;
    if added > 0 {
        log::debug!("added {} missing reverse neighbor entries", added);
    }
    if records.recorded < inserted {
        log::debug!("{} cells vanished", inserted - records.recorded);
    }

    let arrays = marshal(records)?;
    log::log!(level, "Max neighbors per cell: {}", arrays.max_neighbors);
    if options.with_vertices {
        log::log!(level, "Max vertex coordinates per cell: {}", arrays.max_vertex_coords);
    }
    Ok(arrays)
}
