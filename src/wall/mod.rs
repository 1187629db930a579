pub mod geometries;

use std::str::FromStr;

use crate::error::{Error, Result};
use crate::options::{UnknownWallPolicy, WallSpec};
use geometries::{CylinderGeometry, SphereGeometry};

/// Boundary ID reported for faces cut by the analytic wall. It follows the six box
/// IDs (-1 to -6) and is distinct from the neighbor padding sentinel.
pub const WALL_ID: i32 = -7;

/// Trait defining the geometry of a wall.
pub trait WallGeometry: Send + Sync + std::fmt::Debug {
    /// Checks if a point is inside the valid region defined by the wall.
    fn contains(&self, point: &[f64; 3]) -> bool;

    /// Calculates the clipping plane for a given site as `(point_on_plane, normal)`.
    /// The normal points OUT of the valid region. `None` when no plane is defined
    /// for the site (e.g. a site on the sphere center).
    fn cut(&self, site: &[f64; 3]) -> Option<([f64; 3], [f64; 3])>;
}

/// A clipping boundary with the ID reported in the neighbor lists of the cells
/// it cuts.
#[derive(Debug)]
pub struct Wall {
    id: i32,
    inner: Box<dyn WallGeometry>,
}

impl Wall {
    pub fn new(id: i32, geometry: Box<dyn WallGeometry>) -> Self {
        Self { id, inner: geometry }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn contains(&self, point: &[f64; 3]) -> bool {
        self.inner.contains(point)
    }

    pub fn cut(&self, site: &[f64; 3]) -> Option<([f64; 3], [f64; 3])> {
        self.inner.cut(site)
    }
}

/// The wall types accepted by [`configure_wall`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallKind {
    Sphere,
    Cylinder,
}

impl WallKind {
    pub fn name(self) -> &'static str {
        match self {
            WallKind::Sphere => "sphere",
            WallKind::Cylinder => "cylinder",
        }
    }

    /// Exact number of parameters the wall type takes.
    pub fn arity(self) -> usize {
        match self {
            WallKind::Sphere => 4,
            WallKind::Cylinder => 7,
        }
    }

    /// Validates `params` and builds the wall.
    pub fn build(self, params: &[f64]) -> Result<Wall> {
        let name = self.name();
        if params.len() != self.arity() {
            return Err(Error::invalid(format!(
                "invalid number of arguments for a '{}' wall, exactly {} are needed, got {}",
                name,
                self.arity(),
                params.len()
            )));
        }
        if params.iter().any(|p| !p.is_finite()) {
            return Err(Error::invalid(format!("the parameters of a '{}' wall must be finite", name)));
        }
        let radius = params[self.arity() - 1];
        if radius <= 0.0 {
            return Err(Error::invalid(format!(
                "the radius of a '{}' wall must be strictly positive",
                name
            )));
        }

        let geometry: Box<dyn WallGeometry> = match self {
            WallKind::Sphere => Box::new(SphereGeometry::new([params[0], params[1], params[2]], radius)),
            WallKind::Cylinder => {
                let axis = [params[3], params[4], params[5]];
                if axis.iter().all(|&a| a == 0.0) {
                    return Err(Error::invalid("the axis of a 'cylinder' wall must be non-zero"));
                }
                Box::new(CylinderGeometry::new([params[0], params[1], params[2]], axis, radius))
            }
        };
        Ok(Wall::new(WALL_ID, geometry))
    }
}

/// Tag that names neither a wall type nor "no wall".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWallTag(pub String);

impl FromStr for WallKind {
    type Err = UnknownWallTag;

    fn from_str(tag: &str) -> std::result::Result<Self, Self::Err> {
        match tag {
            "sphere" => Ok(WallKind::Sphere),
            "cylinder" => Ok(WallKind::Cylinder),
            other => Err(UnknownWallTag(other.to_string())),
        }
    }
}

fn is_no_wall(tag: &str) -> bool {
    tag.is_empty() || tag == "none"
}

/// Turns the raw wall request into a validated [`Wall`].
///
/// Returns `Ok(None)` when no wall was requested, or when the tag is unknown and
/// the policy is [`UnknownWallPolicy::Ignore`].
pub fn configure_wall(spec: Option<&WallSpec>, policy: UnknownWallPolicy, level: log::Level) -> Result<Option<Wall>> {
    let Some(spec) = spec else {
        return Ok(None);
    };
    if is_no_wall(&spec.kind) {
        return Ok(None);
    }

    log::log!(level, "Wall type: {}", spec.kind);
    log::log!(level, "Wall number of args: {}", spec.params.len());
    log::log!(level, "Wall params: {:?}", spec.params);

    match spec.kind.parse::<WallKind>() {
        Ok(kind) => kind.build(&spec.params).map(Some),
        Err(UnknownWallTag(tag)) => match policy {
            UnknownWallPolicy::Reject => Err(Error::invalid(format!(
                "unknown wall type '{}', expected 'sphere' or 'cylinder'",
                tag
            ))),
            UnknownWallPolicy::Ignore => {
                log::warn!("ignoring unknown wall type '{}'", tag);
                Ok(None)
            }
        },
    }
}
