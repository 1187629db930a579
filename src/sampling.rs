//! Volume-uniform sampling inside a convex cell.
//!
//! The cell is split into a fan of tetrahedra anchored at vertex 0. A tetrahedron
//! is picked with probability proportional to its volume through a cumulative
//! volume prefix, then a point is drawn uniformly inside it.

use rand::Rng;

use crate::cell::{sub, triple, Cell};
use crate::error::{Error, Result};

/// Tetrahedral fan decomposition of one cell.
#[derive(Default, Clone, Debug)]
pub struct TetraFan {
    /// Four cell-local vertex indices per tetrahedron, the first always 0.
    tetras: Vec<[u32; 4]>,
    /// Cumulative tetrahedron volumes, non-decreasing.
    prefix: Vec<f64>,
}

impl TetraFan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the fan for `cell`, keeping allocations.
    ///
    /// Faces containing vertex 0 are skipped: their tetrahedra would be flat. Every
    /// other face `(v0, ..., vm-1)` contributes `(0, v0, vk, vk+1)` for
    /// `k = 1..m-2`.
    pub fn build(&mut self, cell: &Cell) {
        self.tetras.clear();
        self.prefix.clear();
        if cell.is_empty() {
            return;
        }

        let anchor = cell.vertex(0);
        let mut total = 0.0;
        for face in cell.faces() {
            if face.len() < 3 || face.contains(&0) {
                continue;
            }
            let a = sub(cell.vertex(face[0] as usize), anchor);
            for k in 1..face.len() - 1 {
                let b = sub(cell.vertex(face[k] as usize), anchor);
                let c = sub(cell.vertex(face[k + 1] as usize), anchor);
                total += triple(a, b, c).abs() / 6.0;
                self.tetras.push([0, face[0], face[k], face[k + 1]]);
                self.prefix.push(total);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tetras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tetras.is_empty()
    }

    pub fn tetras(&self) -> &[[u32; 4]] {
        &self.tetras
    }

    /// Sum of the tetrahedron volumes.
    pub fn volume(&self) -> f64 {
        self.prefix.last().copied().unwrap_or(0.0)
    }

    /// Index of the tetrahedron covering the cumulative volume `r`: the first prefix
    /// entry strictly greater than `r`. `None` when `r` lies past the last entry.
    pub fn locate(&self, r: f64) -> Option<usize> {
        let idx = self.prefix.partition_point(|&c| c <= r);
        (idx < self.prefix.len()).then_some(idx)
    }

    /// Draws `n` points uniformly by volume inside `cell` and appends them to `out`
    /// as flat triples. The fan must have been built from `cell`.
    pub fn sample<R: Rng + ?Sized>(&self, cell: &Cell, n: usize, rng: &mut R, out: &mut Vec<f64>) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        let total = self.volume();
        if !(total > 0.0) {
            return Err(Error::fault(format!(
                "cannot sample a cell with {} tetrahedra and volume {}",
                self.len(),
                total
            )));
        }

        let mut drawn = 0;
        while drawn < n {
            let r = rng.r#gen::<f64>() * total;
            // Rounding can push the draw past the last entry; draw again.
            let Some(t) = self.locate(r) else {
                continue;
            };
            let [i0, i1, i2, i3] = self.tetras[t];
            let p = sample_in_tetra(
                rng,
                cell.vertex(i0 as usize),
                cell.vertex(i1 as usize),
                cell.vertex(i2 as usize),
                cell.vertex(i3 as usize),
            );
            out.extend_from_slice(&p);
            drawn += 1;
        }
        Ok(())
    }
}

/// Uniform point inside the tetrahedron `(p0, p1, p2, p3)`.
///
/// Three uniforms are folded into the unit simplex and used as barycentric
/// weights.
pub fn sample_in_tetra<R: Rng + ?Sized>(rng: &mut R, p0: [f64; 3], p1: [f64; 3], p2: [f64; 3], p3: [f64; 3]) -> [f64; 3] {
    let s: f64 = rng.r#gen();
    let t: f64 = rng.r#gen();
    let u: f64 = rng.r#gen();
    let (a, s, t, u) = fold_into_simplex(s, t, u);

    let mut p = [0.0; 3];
    for j in 0..3 {
        p[j] = p0[j] * a + p1[j] * s + p2[j] * t + p3[j] * u;
    }
    p
}

/// Maps a point of the unit cube onto the unit simplex, preserving uniformity.
/// Returns the barycentric weights `(a, s, t, u)`, all in `[0, 1]` and summing to 1.
pub fn fold_into_simplex(mut s: f64, mut t: f64, mut u: f64) -> (f64, f64, f64, f64) {
    if s + t > 1.0 {
        (s, t) = (1.0 - t, 1.0 - s);
    }

    if t + u > 1.0 {
        let u_old = u;
        u = 1.0 - s - t;
        t = 1.0 - u_old;
    } else if s + t + u > 1.0 {
        let u_old = u;
        u = s + t + u - 1.0;
        s = 1.0 - t - u_old;
    }

    (1.0 - s - t - u, s, t, u)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoundingBox;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_fold_into_simplex_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10_000 {
            let (a, s, t, u) = fold_into_simplex(rng.r#gen(), rng.r#gen(), rng.r#gen());
            for w in [a, s, t, u] {
                assert!((-1e-12..=1.0 + 1e-12).contains(&w), "weight {} out of range", w);
            }
            assert!((a + s + t + u - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fold_branches() {
        // s + t > 1 is reflected.
        let (_, s, t, _) = fold_into_simplex(0.9, 0.8, 0.0);
        assert!((s - 0.2).abs() < 1e-12 && (t - 0.1).abs() < 1e-12);
        // t + u > 1.
        let (a, s, t, u) = fold_into_simplex(0.1, 0.5, 0.7);
        assert!((u - 0.4).abs() < 1e-12 && (t - 0.3).abs() < 1e-12 && (s - 0.1).abs() < 1e-12);
        assert!((a - 0.2).abs() < 1e-12);
        // s + t + u > 1 with t + u <= 1.
        let (a, s, t, u) = fold_into_simplex(0.5, 0.3, 0.4);
        assert!((u - 0.2).abs() < 1e-12 && (s - 0.3).abs() < 1e-12 && (t - 0.3).abs() < 1e-12);
        assert!((a - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_fan_skips_faces_at_anchor() {
        let cell = Cell::from_box(&BoundingBox::new([0.0; 3], [1.0; 3]));
        let mut fan = TetraFan::new();
        fan.build(&cell);
        // Vertex 0 touches x-, y- and z-: the three other quads give two tetrahedra each.
        assert_eq!(fan.len(), 6);
        assert!(fan.tetras().iter().all(|t| t[0] == 0));
        assert!((fan.volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_locate() {
        let cell = Cell::from_box(&BoundingBox::new([0.0; 3], [1.0; 3]));
        let mut fan = TetraFan::new();
        fan.build(&cell);
        assert_eq!(fan.locate(0.0), Some(0));
        assert_eq!(fan.locate(0.999), Some(5));
        assert_eq!(fan.locate(fan.volume()), None);
    }

    #[test]
    fn test_sample_empty_fan_is_fault() {
        let fan = TetraFan::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut out = Vec::new();
        let err = fan.sample(&Cell::new(), 3, &mut rng, &mut out).unwrap_err();
        assert!(err.is_internal_fault());
        assert!(fan.sample(&Cell::new(), 0, &mut rng, &mut out).is_ok());
    }
}
