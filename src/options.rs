/// Raw wall request: a type tag and its flat parameter array, validated by
/// [`configure_wall`](crate::wall::configure_wall).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallSpec {
    /// `"sphere"` or `"cylinder"`. The empty tag and `"none"` request no wall.
    pub kind: String,
    /// Sphere: `cx, cy, cz, r`. Cylinder: `px, py, pz, ax, ay, az, r` with `p` a point
    /// on the axis and `a` the axis direction.
    pub params: Vec<f64>,
}

impl WallSpec {
    pub fn new(kind: impl Into<String>, params: impl Into<Vec<f64>>) -> Self {
        Self { kind: kind.into(), params: params.into() }
    }

    pub fn sphere(center: [f64; 3], radius: f64) -> Self {
        Self::new("sphere", vec![center[0], center[1], center[2], radius])
    }

    pub fn cylinder(point: [f64; 3], axis: [f64; 3], radius: f64) -> Self {
        Self::new("cylinder", vec![point[0], point[1], point[2], axis[0], axis[1], axis[2], radius])
    }
}

/// What to do with a wall tag that is neither a known wall type nor a "no wall" tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnknownWallPolicy {
    /// Fail with `InvalidArgument`.
    #[default]
    Reject,
    /// Log a warning and tessellate without a wall.
    Ignore,
}

/// Per-call settings of [`compute`](crate::compute).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Return the cell vertices as a NaN-padded matrix.
    pub with_vertices: bool,
    /// Optional bounding wall on top of the domain box.
    pub wall: Option<WallSpec>,
    /// Number of volume-uniform sample points per cell; `None` disables sampling.
    pub samples: Option<usize>,
    /// Report the call summary at `info` instead of `debug` level.
    pub verbose: bool,
    pub unknown_wall: UnknownWallPolicy,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vertices(mut self, enabled: bool) -> Self {
        self.with_vertices = enabled;
        self
    }

    pub fn with_wall(mut self, wall: WallSpec) -> Self {
        self.wall = Some(wall);
        self
    }

    pub fn with_sampling(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub fn unknown_wall(mut self, policy: UnknownWallPolicy) -> Self {
        self.unknown_wall = policy;
        self
    }

    pub(crate) fn log_level(&self) -> log::Level {
        if self.verbose { log::Level::Info } else { log::Level::Debug }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let opts = Options::new()
            .with_vertices(true)
            .with_wall(WallSpec::sphere([0.5, 0.5, 0.5], 0.4))
            .with_sampling(10)
            .verbose(true);
        assert!(opts.with_vertices);
        assert_eq!(opts.samples, Some(10));
        assert_eq!(opts.wall.as_ref().unwrap().params, vec![0.5, 0.5, 0.5, 0.4]);
        assert_eq!(opts.unknown_wall, UnknownWallPolicy::Reject);
        assert_eq!(opts.log_level(), log::Level::Info);
        assert_eq!(Options::default().log_level(), log::Level::Debug);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_options_from_json() {
        let opts: Options = serde_json::from_str(
            r#"{ "with_vertices": true, "wall": { "kind": "cylinder", "params": [0, 0, 0, 0, 0, 1, 2] }, "unknown_wall": "Ignore" }"#,
        )
        .unwrap();
        assert!(opts.with_vertices);
        assert_eq!(opts.samples, None);
        assert_eq!(opts.wall.unwrap().kind, "cylinder");
        assert_eq!(opts.unknown_wall, UnknownWallPolicy::Ignore);
    }
}
