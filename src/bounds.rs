use crate::error::{Error, Result};

/// Boundary ID for the x- face of the domain box. Box IDs are negative to prevent
/// conflicts with site IDs.
pub const BOX_ID_LEFT: i32 = -1;
/// Boundary ID for the x+ face of the domain box.
pub const BOX_ID_RIGHT: i32 = -2;
/// Boundary ID for the y- face of the domain box.
pub const BOX_ID_FRONT: i32 = -3;
/// Boundary ID for the y+ face of the domain box.
pub const BOX_ID_BACK: i32 = -4;
/// Boundary ID for the z- face of the domain box.
pub const BOX_ID_BOTTOM: i32 = -5;
/// Boundary ID for the z+ face of the domain box.
pub const BOX_ID_TOP: i32 = -6;

/// Calculates the boundary ID of a domain box face from its axis and direction.
///
/// - Axis 0 (X) Min: -1, Max: -2
/// - Axis 1 (Y) Min: -3, Max: -4
/// - Axis 2 (Z) Min: -5, Max: -6
pub fn box_side(axis: usize, is_max: bool) -> i32 {
    -1 - (axis * 2 + if is_max { 1 } else { 0 }) as i32
}

/// Axis-aligned box in 3D, used both for the domain and for per-cell bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Builds the box from the `xmin, xmax, ymin, ymax, zmin, zmax` ordering used by
    /// simulation codes.
    pub fn from_limits(xmin: f64, xmax: f64, ymin: f64, ymax: f64, zmin: f64, zmax: f64) -> Self {
        Self { min: [xmin, ymin, zmin], max: [xmax, ymax, zmax] }
    }

    pub fn extents(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn volume(&self) -> f64 {
        let [w, h, d] = self.extents();
        w * h * d
    }

    pub fn contains(&self, p: &[f64; 3]) -> bool {
        (0..3).all(|j| p[j] >= self.min[j] && p[j] <= self.max[j])
    }

    /// Checks that the box can hold a tessellation: finite limits and `min < max` on
    /// every axis.
    pub fn validate(&self) -> Result<()> {
        const AXES: [char; 3] = ['x', 'y', 'z'];
        for j in 0..3 {
            if !self.min[j].is_finite() || !self.max[j].is_finite() {
                return Err(Error::invalid(format!(
                    "the {} limits of the domain must be finite, got [{}, {}]",
                    AXES[j], self.min[j], self.max[j]
                )));
            }
            if self.min[j] >= self.max[j] {
                return Err(Error::invalid(format!(
                    "the domain must satisfy {}min < {}max, got [{}, {}]",
                    AXES[j], AXES[j], self.min[j], self.max[j]
                )));
            }
        }
        Ok(())
    }

    /// Smallest box holding a flat `[x, y, z, x, y, z, ...]` vertex list, seeded from
    /// the first vertex. Returns `None` for an empty list.
    pub fn enclosing(vertices: &[f64]) -> Option<Self> {
        let mut chunks = vertices.chunks_exact(3);
        let first = chunks.next()?;
        let mut min = [first[0], first[1], first[2]];
        let mut max = min;
        for v in chunks {
            for j in 0..3 {
                if v[j] < min[j] {
                    min[j] = v[j];
                }
                if v[j] > max[j] {
                    max[j] = v[j];
                }
            }
        }
        Some(Self { min, max })
    }
}
