use super::{Backend, Container, Site};
use crate::bounds::BoundingBox;
use crate::cell::Cell;
use crate::error::{Error, Result};
use crate::wall::Wall;

/// Backend producing [`GridContainer`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridBackend;

impl Backend for GridBackend {
    type Container = GridContainer;

    fn container(&self, bounds: &BoundingBox, blocks: [usize; 3]) -> Result<GridContainer> {
        if blocks.iter().any(|&n| n == 0) {
            return Err(Error::fault(format!("block counts must be positive, got {:?}", blocks)));
        }
        Ok(GridContainer::new(*bounds, blocks[0], blocks[1], blocks[2]))
    }
}

/// A container binning sites into a uniform block grid.
///
/// Cells start as the domain box, are clipped by the walls, then by the bisector
/// planes of nearby sites, visiting blocks in order of increasing distance until
/// no block can hold a site closer than twice the current cell radius.
pub struct GridContainer {
    bounds: BoundingBox,
    /// Number of blocks along each axis.
    res: [usize; 3],
    /// Scale factor from coordinate offset to block index.
    scale: [f64; 3],
    /// Maximum valid fractional block index per axis.
    limit: [f64; 3],
    /// Site slots of each block.
    blocks: Vec<Vec<usize>>,
    /// Flat positions of the slots `[x, y, z, ...]`.
    positions: Vec<f64>,
    /// Caller-side ID of each slot.
    ids: Vec<usize>,
    walls: Vec<Wall>,
    /// Block offsets with their minimal squared distance, nearest first.
    search_order: Vec<([isize; 3], f64)>,
}

impl GridContainer {
    pub fn new(bounds: BoundingBox, nx: usize, ny: usize, nz: usize) -> Self {
        let res = [nx, ny, nz];
        let extents = bounds.extents();
        let scale = [0usize, 1, 2].map(|j| res[j] as f64 / extents[j]);
        let block_size = [0usize, 1, 2].map(|j| 1.0 / scale[j]);

        let (rx, ry, rz) = (nx as isize, ny as isize, nz as isize);
        let mut search_order = Vec::with_capacity(((2 * nx + 1) * (2 * ny + 1) * (2 * nz + 1)).min(1 << 24));
        for z in -rz..=rz {
            for y in -ry..=ry {
                for x in -rx..=rx {
                    let offset = [x, y, z];
                    search_order.push((offset, min_dist_sq(offset, block_size)));
                }
            }
        }
        search_order.sort_unstable_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        GridContainer {
            bounds,
            res,
            scale,
            limit: res.map(|n| n as f64 - 1e-5),
            blocks: vec![Vec::new(); nx * ny * nz],
            positions: Vec::new(),
            ids: Vec::new(),
            walls: Vec::new(),
            search_order,
        }
    }

    pub fn block_counts(&self) -> [usize; 3] {
        self.res
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn block_coords(&self, p: &[f64; 3]) -> [usize; 3] {
        [0usize, 1, 2].map(|j| ((p[j] - self.bounds.min[j]) * self.scale[j]).clamp(0.0, self.limit[j]) as usize)
    }

    /// Linear index of the block holding `p`.
    pub fn block_index(&self, p: &[f64; 3]) -> usize {
        let [ix, iy, iz] = self.block_coords(p);
        ix + iy * self.res[0] + iz * self.res[0] * self.res[1]
    }

    fn position(&self, slot: usize) -> [f64; 3] {
        [self.positions[slot * 3], self.positions[slot * 3 + 1], self.positions[slot * 3 + 2]]
    }

    /// Calls `visitor` for every other site that may still cut the cell of `slot`.
    /// The visitor returns the updated squared cell radius.
    fn visit_neighbors<F>(&self, slot: usize, pos: [f64; 3], max_dist_sq: &mut f64, mut visitor: F)
    where
        F: FnMut(usize, [f64; 3], f64) -> f64,
    {
        let [nx, ny, nz] = self.res;
        let idx = self.block_coords(&pos);
        let block_size = [0usize, 1, 2].map(|j| 1.0 / self.scale[j]);
        // Position of the site inside its own block, in block units.
        let rel = [0usize, 1, 2].map(|j| (pos[j] - self.bounds.min[j]) * self.scale[j] - idx[j] as f64);

        for &(offset, min_d2) in &self.search_order {
            if min_d2 > 4.0 * *max_dist_sq {
                break;
            }

            let bx = idx[0] as isize + offset[0];
            let by = idx[1] as isize + offset[1];
            let bz = idx[2] as isize + offset[2];
            if bx < 0 || bx >= nx as isize || by < 0 || by >= ny as isize || bz < 0 || bz >= nz as isize {
                continue;
            }

            // Exact gap between the site and the block.
            let mut gap_sq = 0.0;
            for j in 0..3 {
                let d = offset[j];
                let gap = if d > 0 {
                    (d as f64 - rel[j]) * block_size[j]
                } else if d < 0 {
                    (-(d + 1) as f64 + rel[j]) * block_size[j]
                } else {
                    0.0
                };
                let gap = gap.max(0.0);
                gap_sq += gap * gap;
            }
            if gap_sq > 4.0 * *max_dist_sq {
                continue;
            }

            let block = bx as usize + by as usize * nx + bz as usize * nx * ny;
            for &other in &self.blocks[block] {
                if other == slot {
                    continue;
                }
                *max_dist_sq = visitor(other, self.position(other), *max_dist_sq);
            }
        }
    }
}

impl Container for GridContainer {
    fn add_wall(&mut self, wall: Wall) {
        self.walls.push(wall);
    }

    fn put(&mut self, id: usize, position: [f64; 3]) -> bool {
        if !self.bounds.contains(&position) || self.walls.iter().any(|w| !w.contains(&position)) {
            return false;
        }
        let slot = self.ids.len();
        let block = self.block_index(&position);
        self.blocks[block].push(slot);
        self.positions.extend_from_slice(&position);
        self.ids.push(id);
        true
    }

    fn sites(&self) -> impl Iterator<Item = Site> + '_ {
        self.blocks.iter().flatten().map(move |&slot| Site {
            id: self.ids[slot],
            slot,
            position: self.position(slot),
        })
    }

    fn compute_cell(&self, site: &Site, cell: &mut Cell) -> Result<bool> {
        if site.slot >= self.ids.len() || self.ids[site.slot] != site.id {
            return Err(Error::fault(format!("site {} is not stored in slot {}", site.id, site.slot)));
        }
        let g = site.position;
        cell.reset(&self.bounds);

        // 1. Clip against walls
        for wall in &self.walls {
            if let Some((point, normal)) = wall.cut(&g) {
                cell.clip(&point, &normal, wall.id(), None);
            }
        }
        if cell.is_empty() {
            return Ok(false);
        }

        // 2. Clip against the bisector planes of nearby sites
        let mut max_dist_sq = cell.max_radius_sq(&g);
        self.visit_neighbors(site.slot, g, &mut max_dist_sq, |other, pos, cur_dist| {
            let d = [pos[0] - g[0], pos[1] - g[1], pos[2] - g[2]];
            let dist_sq = d[0] * d[0] + d[1] * d[1] + d[2] * d[2];
            if dist_sq > 4.0 * cur_dist {
                return cur_dist;
            }
            let mid = [g[0] + d[0] * 0.5, g[1] + d[1] * 0.5, g[2] + d[2] * 0.5];
            match cell.clip(&mid, &d, self.ids[other] as i32, Some(&g)) {
                (true, new_radius) => new_radius,
                (false, _) => cur_dist,
            }
        });

        Ok(!cell.is_empty())
    }
}

fn min_dist_sq(offset: [isize; 3], block_size: [f64; 3]) -> f64 {
    let mut d2 = 0.0;
    for j in 0..3 {
        let steps = offset[j].unsigned_abs().saturating_sub(1) as f64;
        let m = steps * block_size[j];
        d2 += m * m;
    }
    d2
}
