//! AVX2 horizontal evaluation
//!
//! Eight query points per call, one per 256-bit lane. Coordinates are
//! resolved with vector floor/min/max and the stencil samples are fetched
//! with `vgatherdps`. The same kernel serves both storage layouts through a
//! pair of strides:
//! - padded: sample `i`, component `c` at `4 * i + c`
//! - planar: sample `i`, component `c` at `i + c * N`

use std::arch::x86_64::*;

use crate::batch::BATCH;
use crate::grid::{Axis, PaddedGrid, PlanarGrid};
use crate::{Point2, Point3};

/// [`crate::kernel::cubic`] on eight lanes
#[inline]
#[target_feature(enable = "avx")]
unsafe fn cubic_ps(v0: __m256, v1: __m256, v2: __m256, v3: __m256, x: __m256) -> __m256 {
    let half = _mm256_set1_ps(0.5);
    let dv = _mm256_sub_ps(v2, v1);
    let z0 = _mm256_mul_ps(half, _mm256_sub_ps(v2, v0));
    let z1 = _mm256_mul_ps(half, _mm256_sub_ps(v3, v1));
    let t1 = _mm256_mul_ps(_mm256_sub_ps(z1, dv), _mm256_sub_ps(x, _mm256_set1_ps(1.0)));
    let t2 = _mm256_mul_ps(_mm256_sub_ps(z0, dv), _mm256_sub_ps(x, _mm256_set1_ps(2.0)));
    _mm256_add_ps(
        _mm256_mul_ps(_mm256_mul_ps(x, x), _mm256_add_ps(t1, t2)),
        _mm256_add_ps(_mm256_mul_ps(z0, x), v1),
    )
}

/// Vector form of [`crate::position::resolve_axis`]
#[inline]
#[target_feature(enable = "avx")]
unsafe fn resolve_axis_ps(coord: __m256, axis: &Axis) -> (__m256i, __m256) {
    let raw = _mm256_mul_ps(
        _mm256_sub_ps(coord, _mm256_set1_ps(axis.min)),
        _mm256_set1_ps(axis.scale),
    );
    let index = _mm256_min_ps(
        _mm256_max_ps(_mm256_floor_ps(raw), _mm256_set1_ps(1.0)),
        _mm256_set1_ps((axis.bins - 3) as f32),
    );
    (_mm256_cvttps_epi32(index), _mm256_sub_ps(raw, index))
}

#[target_feature(enable = "avx2")]
#[allow(clippy::too_many_arguments)]
unsafe fn evaluate_strided(
    data: &[f32],
    point_stride: i32,
    component_stride: i32,
    axis_a: &Axis,
    axis_b: &Axis,
    points: &[Point2; BATCH],
) -> [Point3; BATCH] {
    let nb = axis_b.bins;
    // Highest flat index any stencil can touch; the clamp in resolve_axis
    // keeps every lane below it
    let last = ((axis_a.bins * nb - 1) as i64 * point_stride as i64 + 2 * component_stride as i64) as usize;
    assert!(last < data.len(), "storage smaller than the grid it belongs to");

    let mut a = [0.0f32; BATCH];
    let mut b = [0.0f32; BATCH];
    for (i, p) in points.iter().enumerate() {
        a[i] = p[0];
        b[i] = p[1];
    }

    let (ia, da) = resolve_axis_ps(_mm256_loadu_ps(a.as_ptr()), axis_a);
    let (ib, db) = resolve_axis_ps(_mm256_loadu_ps(b.as_ptr()), axis_b);

    let one = _mm256_set1_epi32(1);
    let origin = _mm256_add_epi32(
        _mm256_mullo_epi32(_mm256_sub_epi32(ia, one), _mm256_set1_epi32(nb as i32)),
        _mm256_sub_epi32(ib, one),
    );
    let base = _mm256_mullo_epi32(origin, _mm256_set1_epi32(point_stride));
    let row_step = _mm256_set1_epi32(nb as i32 * point_stride);
    let col_step = _mm256_set1_epi32(point_stride);

    let mut out = [[0.0f32; BATCH]; 3];
    for (c, lanes) in out.iter_mut().enumerate() {
        let mut row_offsets = _mm256_add_epi32(base, _mm256_set1_epi32(c as i32 * component_stride));
        let mut rows = [_mm256_setzero_ps(); 4];
        for row in rows.iter_mut() {
            let o0 = row_offsets;
            let o1 = _mm256_add_epi32(o0, col_step);
            let o2 = _mm256_add_epi32(o1, col_step);
            let o3 = _mm256_add_epi32(o2, col_step);
            *row = cubic_ps(
                _mm256_i32gather_ps::<4>(data.as_ptr(), o0),
                _mm256_i32gather_ps::<4>(data.as_ptr(), o1),
                _mm256_i32gather_ps::<4>(data.as_ptr(), o2),
                _mm256_i32gather_ps::<4>(data.as_ptr(), o3),
                db,
            );
            row_offsets = _mm256_add_epi32(row_offsets, row_step);
        }
        let res = cubic_ps(rows[0], rows[1], rows[2], rows[3], da);
        _mm256_storeu_ps(lanes.as_mut_ptr(), res);
    }

    std::array::from_fn(|l| [out[0][l], out[1][l], out[2][l]])
}

/// AVX2 batch evaluation over padded storage (`Horizontal`)
///
/// # Safety
///
/// Requires AVX2. Caller must verify it is available.
#[target_feature(enable = "avx2")]
pub unsafe fn evaluate_batch_padded_avx2(grid: &PaddedGrid, points: &[Point2; BATCH]) -> [Point3; BATCH] {
    evaluate_strided(grid.storage().as_flat(), 4, 1, grid.axis_a(), grid.axis_b(), points)
}

/// AVX2 batch evaluation over planar storage (`Horizontal2`)
///
/// # Safety
///
/// Requires AVX2. Caller must verify it is available.
#[target_feature(enable = "avx2")]
pub unsafe fn evaluate_batch_planar_avx2(grid: &PlanarGrid, points: &[Point2; BATCH]) -> [Point3; BATCH] {
    let n = grid.point_count() as i32;
    evaluate_strided(grid.storage().as_flat(), 1, n, grid.axis_a(), grid.axis_b(), points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSet;
    use crate::scalar;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_avx2_batch_matches_scalar() {
        if !is_x86_feature_detected!("avx2") {
            return;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for size in [4, 7, 31] {
            let mut grids = GridSet::new(-1.0, 1.0, size);
            grids.fill_random(&mut rng);

            for _ in 0..100 {
                let mut points: [Point2; BATCH] =
                    std::array::from_fn(|_| [rng.random_range(-1.0f32..1.0), rng.random_range(-1.0f32..1.0)]);
                points[0] = [-1.0, -1.0];
                points[7] = [1.0, 1.0];

                let padded = unsafe { evaluate_batch_padded_avx2(&grids.padded, &points) };
                let planar = unsafe { evaluate_batch_planar_avx2(&grids.planar, &points) };

                for (l, &p) in points.iter().enumerate() {
                    let expected = scalar::evaluate(&grids.padded, p);
                    for c in 0..3 {
                        assert_eq!(padded[l][c].to_bits(), expected[c].to_bits(), "padded at {p:?}");
                        assert_eq!(planar[l][c].to_bits(), expected[c].to_bits(), "planar at {p:?}");
                    }
                }
            }
        }
    }
}
