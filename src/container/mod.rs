//! The tessellation capability the post-processing runs against.
//!
//! A [`Backend`] creates a [`Container`] for one call; the container takes the
//! optional wall, the sites, and then computes the cell of each inserted site.
//! [`GridBackend`] is the built-in implementation; tests substitute fakes.

mod grid;

pub use grid::{GridBackend, GridContainer};

use crate::bounds::BoundingBox;
use crate::cell::Cell;
use crate::error::Result;
use crate::wall::Wall;

/// An inserted site as reported by [`Container::sites`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Site {
    /// Caller-side ID: the output row of the site.
    pub id: usize,
    /// Container-local handle of the site.
    pub slot: usize,
    pub position: [f64; 3],
}

/// Creates containers. Implementations carry whatever configuration they need.
pub trait Backend: Sync {
    type Container: Container;

    /// Creates an empty container over `bounds` split into `blocks` along each axis.
    fn container(&self, bounds: &BoundingBox, blocks: [usize; 3]) -> Result<Self::Container>;
}

/// One tessellation in progress.
pub trait Container {
    /// Binds a wall. Must be called before any site is inserted.
    fn add_wall(&mut self, wall: Wall);

    /// Inserts a site. Returns `false` when the site is rejected because it lies
    /// outside the box or a wall.
    fn put(&mut self, id: usize, position: [f64; 3]) -> bool;

    /// The inserted sites, in the container's own iteration order.
    fn sites(&self) -> impl Iterator<Item = Site> + '_;

    /// Computes the cell of `site` into `cell`. Returns `Ok(false)` when the cell
    /// vanished entirely.
    fn compute_cell(&self, site: &Site, cell: &mut Cell) -> Result<bool>;
}
