//! Horizontal evaluation: one query point per lane
//!
//! Each lane carries its own stencil origin and offsets, so samples are
//! gathered lane by lane; the cubic passes then run once per component for the
//! whole batch.

use crate::grid::{SampleGrid, Storage};
use crate::kernel::cubic;
use crate::lanes::F32x;
use crate::position::resolve_lanes;
use crate::{Point2, Point3};

/// Points per batch: the AVX register width for `f32`
pub const BATCH: usize = 8;

/// Interpolate `N` points at once; result `i` belongs to `points[i]`
#[inline]
pub fn evaluate_batch<S: Storage, const N: usize>(grid: &SampleGrid<S>, points: &[Point2; N]) -> [Point3; N] {
    let coords = resolve_lanes(points, grid.axis_a(), grid.axis_b());
    let nb = grid.nb();
    let storage = grid.storage();
    let origins: [usize; N] = std::array::from_fn(|l| coords.stencil_origin(l, nb));

    let mut out = [[0.0f32; 3]; N];
    for c in 0..3 {
        let rows: [F32x<N>; 4] = std::array::from_fn(|r| {
            let v: [F32x<N>; 4] = std::array::from_fn(|k| {
                F32x::from_fn(|l| storage.component(origins[l] + r * nb + k, c))
            });
            cubic(v[0], v[1], v[2], v[3], coords.db)
        });
        let res = cubic(rows[0], rows[1], rows[2], rows[3], coords.da);
        for (o, v) in out.iter_mut().zip(res.0) {
            o[c] = v;
        }
    }
    out
}

/// Group `points` into full batches; a trailing partial batch is dropped
pub fn batches(points: &[Point2]) -> Vec<[Point2; BATCH]> {
    points
        .chunks_exact(BATCH)
        .map(|chunk| std::array::from_fn(|i| chunk[i]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSet;
    use crate::scalar;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_batch_matches_scalar_in_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut grids = GridSet::new(-1.0, 1.0, 13);
        grids.fill_random(&mut rng);

        for _ in 0..50 {
            let points: [Point2; BATCH] =
                std::array::from_fn(|_| [rng.random_range(-1.0f32..1.0), rng.random_range(-1.0f32..1.0)]);
            let padded = evaluate_batch(&grids.padded, &points);
            let planar = evaluate_batch(&grids.planar, &points);

            for (l, &p) in points.iter().enumerate() {
                let expected = scalar::evaluate(&grids.padded, p);
                for c in 0..3 {
                    assert!((padded[l][c] - expected[c]).abs() <= 1e-5);
                    assert!((planar[l][c] - expected[c]).abs() <= 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_odd_batch_width() {
        let mut grids = GridSet::new(-1.0, 1.0, 6);
        grids.fill(7, [0.5, -0.5, 0.25]);
        let points = [[-0.9, -0.7], [0.0, 0.0], [1.0, 1.0]];
        let out = evaluate_batch(&grids.packed, &points);
        for (l, &p) in points.iter().enumerate() {
            assert_eq!(out[l], scalar::evaluate(&grids.padded, p));
        }
    }

    #[test]
    fn test_batches_drop_partial_tail() {
        let points: Vec<Point2> = (0..19).map(|i| [i as f32, 0.0]).collect();
        let grouped = batches(&points);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[1][0], [8.0, 0.0]);
        assert_eq!(grouped[1][7], [15.0, 0.0]);
    }
}
