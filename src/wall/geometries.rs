use super::WallGeometry;

/// A spherical wall. The valid region is the inside of the sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereGeometry {
    pub center: [f64; 3],
    pub radius: f64,
}

impl SphereGeometry {
    pub fn new(center: [f64; 3], radius: f64) -> Self {
        Self { center, radius }
    }
}

impl WallGeometry for SphereGeometry {
    fn contains(&self, point: &[f64; 3]) -> bool {
        let dx = point[0] - self.center[0];
        let dy = point[1] - self.center[1];
        let dz = point[2] - self.center[2];
        (dx * dx + dy * dy + dz * dz) <= self.radius * self.radius
    }

    fn cut(&self, site: &[f64; 3]) -> Option<([f64; 3], [f64; 3])> {
        let dx = site[0] - self.center[0];
        let dy = site[1] - self.center[1];
        let dz = site[2] - self.center[2];
        let dist = (dx * dx + dy * dy + dz * dz).sqrt();

        if dist == 0.0 {
            return None;
        }

        // Tangent plane at the projection of the site onto the surface.
        let scale = self.radius / dist;
        let point = [
            self.center[0] + dx * scale,
            self.center[1] + dy * scale,
            self.center[2] + dz * scale,
        ];
        let normal = [dx / dist, dy / dist, dz / dist];

        Some((point, normal))
    }
}

/// An infinite cylindrical wall. The valid region is within `radius` of the axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderGeometry {
    /// A point on the axis.
    pub center: [f64; 3],
    /// Unit axis direction.
    pub axis: [f64; 3],
    pub radius: f64,
}

impl CylinderGeometry {
    /// `axis` does not need to be normalized but must be non-zero.
    pub fn new(center: [f64; 3], axis: [f64; 3], radius: f64) -> Self {
        let len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
        let axis = if len == 0.0 { [0.0, 0.0, 1.0] } else { [axis[0] / len, axis[1] / len, axis[2] / len] };
        Self { center, axis, radius }
    }

    /// Component of `point - center` perpendicular to the axis, and the offset along it.
    fn split(&self, point: &[f64; 3]) -> ([f64; 3], f64) {
        let dx = point[0] - self.center[0];
        let dy = point[1] - self.center[1];
        let dz = point[2] - self.center[2];

        let along = dx * self.axis[0] + dy * self.axis[1] + dz * self.axis[2];
        let perp = [
            dx - along * self.axis[0],
            dy - along * self.axis[1],
            dz - along * self.axis[2],
        ];
        (perp, along)
    }
}

impl WallGeometry for CylinderGeometry {
    fn contains(&self, point: &[f64; 3]) -> bool {
        let (perp, _) = self.split(point);
        (perp[0] * perp[0] + perp[1] * perp[1] + perp[2] * perp[2]) <= self.radius * self.radius
    }

    fn cut(&self, site: &[f64; 3]) -> Option<([f64; 3], [f64; 3])> {
        let (perp, along) = self.split(site);
        let dist = (perp[0] * perp[0] + perp[1] * perp[1] + perp[2] * perp[2]).sqrt();
        if dist == 0.0 {
            return None;
        }

        let scale = self.radius / dist;
        let point = [
            self.center[0] + along * self.axis[0] + perp[0] * scale,
            self.center[1] + along * self.axis[1] + perp[1] * scale,
            self.center[2] + along * self.axis[2] + perp[2] * scale,
        ];
        let normal = [perp[0] / dist, perp[1] / dist, perp[2] / dist];

        Some((point, normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_contains_and_cut() {
        let sphere = SphereGeometry::new([1.0, 1.0, 1.0], 2.0);
        assert!(sphere.contains(&[1.0, 1.0, 2.9]));
        assert!(!sphere.contains(&[1.0, 1.0, 3.1]));

        let (p, n) = sphere.cut(&[1.0, 1.0, 2.0]).unwrap();
        assert!((p[2] - 3.0).abs() < 1e-12);
        assert!((n[2] - 1.0).abs() < 1e-12);
        assert!(sphere.cut(&[1.0, 1.0, 1.0]).is_none());
    }

    #[test]
    fn test_cylinder_contains_and_cut() {
        let cyl = CylinderGeometry::new([0.0, 0.0, 0.0], [0.0, 0.0, 5.0], 1.0);
        assert_eq!(cyl.axis, [0.0, 0.0, 1.0]);
        assert!(cyl.contains(&[0.5, 0.5, 100.0]));
        assert!(!cyl.contains(&[1.0, 0.5, -3.0]));

        let (p, n) = cyl.cut(&[0.5, 0.0, 7.0]).unwrap();
        assert!((p[0] - 1.0).abs() < 1e-12);
        assert!((p[2] - 7.0).abs() < 1e-12);
        assert!((n[0] - 1.0).abs() < 1e-12);
        assert!(cyl.cut(&[0.0, 0.0, 2.0]).is_none());
    }
}
