use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use vorogrid::neighbors::is_symmetric;
use vorogrid::{compute, compute_with, BoundingBox, CellArrays, GridBackend, Options, NEIGHBOR_SENTINEL, WALL_ID};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_points(n: usize, bounds: &BoundingBox, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(n * 3);
    for _ in 0..n {
        for j in 0..3 {
            points.push(rng.gen_range(bounds.min[j]..bounds.max[j]));
        }
    }
    points
}

fn run(bounds: &BoundingBox, points: &[f64], options: &Options) -> CellArrays {
    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    compute_with(&GridBackend, bounds, points, options, &mut rng).unwrap()
}

fn neighbor_rows(arrays: &CellArrays) -> Vec<Vec<i32>> {
    (0..arrays.len()).map(|i| arrays.neighbors_of(i).to_vec()).collect()
}

#[test]
fn test_random_unit_cube() {
    init();
    let bounds = BoundingBox::new([0.0; 3], [1.0; 3]);
    let points = random_points(100, &bounds, 7);
    let arrays = run(&bounds, &points, &Options::new().with_vertices(true));

    assert_eq!(arrays.len(), 100);
    assert!(arrays.sample_points.is_none());
    let total = arrays.total_volume();
    assert!((total - 1.0).abs() < 1e-9, "Total volume should be 1.0, got {}", total);

    for i in 0..arrays.len() {
        let row = arrays.neighbors_of(i);
        assert!(row.len() >= 4, "cell {} has only {} neighbors", i, row.len());
        assert!(arrays.volumes[i] > 0.0);

        let bb = arrays.bounding_box(i);
        for j in 0..3 {
            assert!(bb.min[j] <= bb.max[j]);
        }
        let vertices = arrays.vertices_of(i).unwrap();
        assert!(!vertices.is_empty());
        assert_eq!(vertices.len() % 3, 0);
        for v in vertices.chunks_exact(3) {
            for j in 0..3 {
                assert!(v[j] >= bb.min[j] && v[j] <= bb.max[j], "vertex {:?} outside the box of cell {}", v, i);
            }
        }
        // The site lies inside its own cell.
        assert!(bb.contains(&[points[i * 3], points[i * 3 + 1], points[i * 3 + 2]]));
    }
}

#[test]
fn test_neighbors_are_symmetric() {
    init();
    let bounds = BoundingBox::new([-2.0, 0.0, 1.0], [2.0, 1.0, 3.0]);
    let points = random_points(300, &bounds, 11);
    let arrays = run(&bounds, &points, &Options::default());
    let rows = neighbor_rows(&arrays);
    assert!(is_symmetric(&rows));
    assert!((arrays.total_volume() - bounds.volume()).abs() < 1e-9 * bounds.volume());
}

#[test]
fn test_volume_sum_across_length_scales() {
    init();
    for scale in [1e-6, 1e-4, 1e-3, 1.0, 1e3, 1e12] {
        let bounds = BoundingBox::new([0.0; 3], [scale; 3]);
        let points = random_points(100, &bounds, 7);
        let arrays = run(&bounds, &points, &Options::default());

        let ratio = arrays.total_volume() / bounds.volume();
        assert!((ratio - 1.0).abs() < 1e-9, "scale {}: total volume / box volume = {}", scale, ratio);
        for i in 0..arrays.len() {
            let sites = arrays.neighbors_of(i).iter().filter(|&&n| n >= 0).count();
            assert!(sites > 0, "scale {}: cell {} has no site neighbors", scale, i);
            assert!(arrays.neighbors_of(i).len() >= 4);
        }
        assert!(is_symmetric(&neighbor_rows(&arrays)));
    }
}

#[test]
fn test_padding_follows_real_entries() {
    init();
    let bounds = BoundingBox::new([0.0; 3], [1.0; 3]);
    let points = random_points(50, &bounds, 3);
    let arrays = run(&bounds, &points, &Options::new().with_vertices(true));

    assert_eq!(arrays.neighbors.len(), arrays.len() * arrays.max_neighbors);
    for row in arrays.neighbors.chunks_exact(arrays.max_neighbors) {
        let real = row.iter().take_while(|&&n| n != NEIGHBOR_SENTINEL).count();
        assert!(row[real..].iter().all(|&n| n == NEIGHBOR_SENTINEL));
        assert!(row[..real].iter().all(|n| (0..50).contains(n) || (-6..=-1).contains(n)));
    }

    let vertices = arrays.vertices.as_ref().unwrap();
    assert_eq!(vertices.len(), arrays.len() * arrays.max_vertex_coords);
    for row in vertices.chunks_exact(arrays.max_vertex_coords) {
        let real = row.iter().take_while(|v| !v.is_nan()).count();
        assert_eq!(real % 3, 0);
        assert!(row[real..].iter().all(|v| v.is_nan()));
    }
    // At least one row fills its width.
    assert!((0..arrays.len()).any(|i| arrays.neighbors_of(i).len() == arrays.max_neighbors));
}

#[test]
fn test_samples_inside_cells() {
    init();
    let bounds = BoundingBox::new([0.0; 3], [1.0; 3]);
    let points = random_points(40, &bounds, 5);
    let arrays = run(&bounds, &points, &Options::new().with_sampling(25));

    assert_eq!(arrays.samples_per_site, 25);
    assert_eq!(arrays.sample_points.as_ref().unwrap().len(), 40 * 25 * 3);
    for i in 0..arrays.len() {
        let bb = arrays.bounding_box(i);
        let samples = arrays.samples_of(i).unwrap();
        for p in samples.chunks_exact(3) {
            for j in 0..3 {
                assert!(p[j] >= bb.min[j] - 1e-12 && p[j] <= bb.max[j] + 1e-12, "sample {:?} outside cell {}", p, i);
            }
        }
        // Samples are closer to their own site than to any neighbor site.
        let site = &points[i * 3..i * 3 + 3];
        for p in samples.chunks_exact(3) {
            let own = dist_sq(p, site);
            for &n in arrays.neighbors_of(i).iter().filter(|&&n| n >= 0) {
                let other = &points[n as usize * 3..n as usize * 3 + 3];
                assert!(own <= dist_sq(p, other) + 1e-9, "sample of cell {} is closer to site {}", i, n);
            }
        }
    }
}

#[test]
fn test_sphere_wall_lattice() {
    init();
    let size = 10.0;
    let bounds = BoundingBox::new([0.0; 3], [size; 3]);
    let n = 10;
    let step = size / n as f64;
    let mut points = Vec::new();
    for x in 0..n {
        for y in 0..n {
            for z in 0..n {
                points.extend_from_slice(&[(x as f64 + 0.5) * step, (y as f64 + 0.5) * step, (z as f64 + 0.5) * step]);
            }
        }
    }

    let options = Options::new().with_wall(vorogrid::WallSpec::sphere([5.0; 3], 4.0));
    let arrays = run(&bounds, &points, &options);
    let expected = 4.0 / 3.0 * std::f64::consts::PI * 4.0f64.powi(3);
    let volume = arrays.total_volume();
    let error = (volume - expected).abs() / expected;
    assert!(error < 0.05, "Sphere wall volume: got {:.4}, expected {:.4}", volume, expected);

    let mut excluded = 0;
    for i in 0..arrays.len() {
        let p = [points[i * 3], points[i * 3 + 1], points[i * 3 + 2]];
        let r2: f64 = p.iter().map(|c| (c - 5.0) * (c - 5.0)).sum();
        if r2 > 16.0 {
            excluded += 1;
            assert_eq!(arrays.volumes[i], 0.0);
            assert!(arrays.neighbors_of(i).is_empty());
            assert_eq!(arrays.bounding_box(i), BoundingBox::new(p, p));
        }
    }
    assert!(excluded > 0);
    assert!((0..arrays.len()).any(|i| arrays.neighbors_of(i).contains(&WALL_ID)));
    assert!(is_symmetric(&neighbor_rows(&arrays)));
}

#[test]
fn test_entropy_seeded_compute() {
    init();
    let bounds = BoundingBox::new([0.0; 3], [1.0; 3]);
    let points = random_points(20, &bounds, 9);
    let arrays = compute(&bounds, &points, &Options::new().with_sampling(4).verbose(true)).unwrap();
    assert_eq!(arrays.len(), 20);
    assert!(arrays.sample_points.unwrap().iter().all(|v| v.is_finite()));
}

fn dist_sq(a: &[f64], b: &[f64]) -> f64 {
    (0..3).map(|j| (a[j] - b[j]) * (a[j] - b[j])).sum()
}
