use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use vorogrid::sampling::{sample_in_tetra, TetraFan};
use vorogrid::{BoundingBox, Cell};

fn fan_of(cell: &Cell) -> TetraFan {
    let mut fan = TetraFan::new();
    fan.build(cell);
    fan
}

fn assert_fan_matches(cell: &Cell, label: &str) {
    let fan = fan_of(cell);
    let expected = cell.volume();
    let error = (fan.volume() - expected).abs() / expected;
    assert!(error < 1e-6, "{}: fan volume {} vs cell volume {}", label, fan.volume(), expected);
}

/// Box `[-1, 1]^3` cut by `planes` random planes tangent to a sphere of radius 0.9.
/// Returns the cell and the unit normals of the planes.
fn random_polyhedron(planes: usize, seed: u64) -> (Cell, Vec<[f64; 3]>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cell = Cell::from_box(&BoundingBox::new([-1.0; 3], [1.0; 3]));
    let mut normals = Vec::with_capacity(planes);
    let mut cut = 0;
    while cut < planes {
        let d: [f64; 3] = [rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)];
        let norm = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
        if !(0.1..=1.0).contains(&norm) {
            continue;
        }
        let n = [d[0] / norm, d[1] / norm, d[2] / norm];
        let p = [n[0] * 0.9, n[1] * 0.9, n[2] * 0.9];
        cell.clip(&p, &n, cut as i32, None);
        normals.push(n);
        cut += 1;
    }
    (cell, normals)
}

#[test]
fn test_fan_volume_cube() {
    let cell = Cell::from_box(&BoundingBox::new([0.0, -1.0, 2.0], [2.0, 0.5, 3.0]));
    assert_fan_matches(&cell, "cube");
    assert!((fan_of(&cell).volume() - 3.0).abs() < 1e-12);
}

#[test]
fn test_fan_volume_regular_tetrahedron() {
    let vertices = vec![1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 1.0, -1.0, -1.0, -1.0, 1.0];
    let faces = vec![vec![3, 2, 1], vec![2, 3, 0], vec![3, 1, 0], vec![1, 2, 0]];
    let cell = Cell::from_faces(vertices, &faces, vec![0, 1, 2, 3]).unwrap();
    assert_fan_matches(&cell, "tetrahedron");
    // Edge 2 * sqrt(2): volume a^3 / (6 sqrt(2)) = 8 / 3.
    assert!((cell.volume() - 8.0 / 3.0).abs() < 1e-12);
    assert_eq!(fan_of(&cell).len(), 1);
}

#[test]
fn test_fan_volume_random_polyhedron() {
    for seed in 0..5 {
        let (cell, _) = random_polyhedron(20, seed);
        assert!(!cell.is_empty());
        let volume = cell.volume();
        let inscribed = 4.0 / 3.0 * std::f64::consts::PI * 0.9f64.powi(3);
        assert!(volume > inscribed && volume < 8.0, "seed {}: volume {}", seed, volume);
        assert_fan_matches(&cell, "random polyhedron");
    }
}

#[test]
fn test_cube_samples_are_uniform() {
    let cell = Cell::from_box(&BoundingBox::new([0.0; 3], [1.0; 3]));
    let fan = fan_of(&cell);
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let n = 10_000;
    let mut samples = Vec::new();
    fan.sample(&cell, n, &mut rng, &mut samples).unwrap();
    assert_eq!(samples.len(), n * 3);

    const BINS: usize = 4;
    let mut counts = [0usize; BINS * BINS * BINS];
    for p in samples.chunks_exact(3) {
        for &c in p {
            assert!((-1e-12..=1.0 + 1e-12).contains(&c), "sample {:?} outside the cube", p);
        }
        let b = |c: f64| ((c * BINS as f64) as usize).min(BINS - 1);
        counts[b(p[0]) + BINS * b(p[1]) + BINS * BINS * b(p[2])] += 1;
    }

    let expected = n as f64 / counts.len() as f64;
    let chi2: f64 = counts.iter().map(|&c| (c as f64 - expected).powi(2) / expected).sum();
    // 63 degrees of freedom: mean 63, standard deviation about 11.
    assert!(chi2 < 130.0, "chi-square {} too large for uniform samples", chi2);
}

#[test]
fn test_tetra_samples_stay_inside() {
    let p0 = [0.0, 0.0, 0.0];
    let p1 = [1.0, 0.0, 0.0];
    let p2 = [0.0, 1.0, 0.0];
    let p3 = [0.0, 0.0, 1.0];
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut mean = [0.0; 3];
    let n = 20_000;
    for _ in 0..n {
        let p = sample_in_tetra(&mut rng, p0, p1, p2, p3);
        assert!(p.iter().all(|&c| c >= -1e-12));
        assert!(p[0] + p[1] + p[2] <= 1.0 + 1e-12);
        for j in 0..3 {
            mean[j] += p[j] / n as f64;
        }
    }
    // The centroid of the corner tetrahedron is (1/4, 1/4, 1/4).
    for m in mean {
        assert!((m - 0.25).abs() < 0.01, "mean {:?}", mean);
    }
}

#[test]
fn test_random_polyhedron_samples_inside() {
    let (cell, normals) = random_polyhedron(20, 42);
    let fan = fan_of(&cell);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut samples = Vec::new();
    fan.sample(&cell, 2000, &mut rng, &mut samples).unwrap();
    for p in samples.chunks_exact(3) {
        for j in 0..3 {
            assert!(p[j].abs() <= 1.0 + 1e-12);
        }
        for n in &normals {
            let d = p[0] * n[0] + p[1] * n[1] + p[2] * n[2];
            assert!(d <= 0.9 + 1e-9, "sample {:?} beyond a cut plane", p);
        }
    }
}
