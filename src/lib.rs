//! # vorogrid
//!
//! `vorogrid` turns a 3D point set into per-site Voronoi cell data for simulation
//! grids. Every site inside a rectangular domain (optionally bounded further by an
//! analytic sphere or cylinder wall) gets its cell volume, bounding box and the IDs
//! of its neighbors, plus optionally the cell vertices and volume-uniform sample
//! points inside the cell. Results come back as fixed-width row-major arrays,
//! padded with [`NEIGHBOR_SENTINEL`] and NaN.
//!
//! ## Features
//!
//! - **Grid sizing**: the container block grid follows the domain aspect ratio.
//! - **Walls**: `"sphere"` and `"cylinder"` walls, validated before any work.
//! - **Volume sampling**: tetrahedral fan decomposition of every cell.
//! - **Symmetric adjacency**: neighbor lists are repaired to be mutual.
//! - **Pluggable backend**: [`Backend`]/[`Container`] abstract the tessellator;
//!   [`GridBackend`] is built in.
//!
//! ## Main Interface
//!
//! ```ignore
//! use vorogrid::{compute, BoundingBox, Options, WallSpec};
//!
//! let bounds = BoundingBox::new([0.0; 3], [1.0; 3]);
//! let points = vec![0.25, 0.5, 0.5, 0.75, 0.5, 0.5];
//! let options = Options::new().with_vertices(true).with_wall(WallSpec::sphere([0.5; 3], 0.5));
//! let cells = compute(&bounds, &points, &options)?;
//! assert!(cells.neighbors_of(0).contains(&1));
//! ```

pub mod blocks;
mod bounds;
mod cell;
pub mod container;
mod error;
mod marshal;
pub mod neighbors;
mod options;
mod pipeline;
pub mod postprocess;
pub mod sampling;
mod util;
pub mod wall;

pub use blocks::block_counts;
pub use bounds::box_side;
pub use bounds::BoundingBox;
pub use bounds::BOX_ID_BACK;
pub use bounds::BOX_ID_BOTTOM;
pub use bounds::BOX_ID_FRONT;
pub use bounds::BOX_ID_LEFT;
pub use bounds::BOX_ID_RIGHT;
pub use bounds::BOX_ID_TOP;
pub use cell::Cell;
pub use container::{Backend, Container, GridBackend, GridContainer, Site};
pub use error::{Error, Result};
pub use marshal::{marshal, CellArrays, NEIGHBOR_SENTINEL};
pub use options::{Options, UnknownWallPolicy, WallSpec};
pub use pipeline::{compute, compute_partitions, compute_with, Partition};
pub use wall::{configure_wall, Wall, WallGeometry, WallKind, WALL_ID};
