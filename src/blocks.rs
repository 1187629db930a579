use crate::bounds::BoundingBox;

/// Average number of sites per container block, determined experimentally. The
/// clipping search stays cheap as long as block occupancy is close to uniform.
pub const SITES_PER_BLOCK: f64 = 5.0;

/// Number of container blocks along each axis for `n_sites` sites in `bounds`.
///
/// The total block count targets `n_sites / SITES_PER_BLOCK`. Its cube root is the
/// average edge count, which every axis scales by its extent relative to the
/// geometric-mean edge of the domain, so anisotropic domains get anisotropic block
/// counts. The `+ 1` absorbs truncation and keeps every count at least one, also
/// for degenerate extents.
pub fn block_counts(bounds: &BoundingBox, n_sites: usize) -> [usize; 3] {
    let edge_blocks = (n_sites as f64 / SITES_PER_BLOCK).cbrt();
    let mean_edge = bounds.volume().cbrt();
    let extents = bounds.extents();

    let mut counts = [1usize; 3];
    for j in 0..3 {
        let scaled = extents[j] / mean_edge * edge_blocks;
        // NaN and negative values (zero-volume domains) collapse to a single block.
        if scaled.is_finite() && scaled > 0.0 {
            counts[j] = scaled as usize + 1;
        }
    }
    counts
}
