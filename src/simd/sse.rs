//! SSE single-point evaluation
//!
//! Lanes hold the `[x, y, z, pad]` components of one sample, so a padded
//! sample is one aligned 128-bit load. SSE2 is part of the x86-64 baseline.

use std::arch::x86_64::*;

use crate::grid::PaddedGrid;
use crate::{Point2, Point3};

/// [`crate::kernel::cubic`] on four lanes
#[inline(always)]
pub(crate) unsafe fn cubic_ps(v0: __m128, v1: __m128, v2: __m128, v3: __m128, x: __m128) -> __m128 {
    let half = _mm_set1_ps(0.5);
    let dv = _mm_sub_ps(v2, v1);
    let z0 = _mm_mul_ps(half, _mm_sub_ps(v2, v0));
    let z1 = _mm_mul_ps(half, _mm_sub_ps(v3, v1));
    let t1 = _mm_mul_ps(_mm_sub_ps(z1, dv), _mm_sub_ps(x, _mm_set1_ps(1.0)));
    let t2 = _mm_mul_ps(_mm_sub_ps(z0, dv), _mm_sub_ps(x, _mm_set1_ps(2.0)));
    _mm_add_ps(
        _mm_mul_ps(_mm_mul_ps(x, x), _mm_add_ps(t1, t2)),
        _mm_add_ps(_mm_mul_ps(z0, x), v1),
    )
}

/// SSE evaluation of one query point (`Vectorized`)
///
/// # Safety
///
/// Requires SSE2, which every x86-64 CPU provides.
#[target_feature(enable = "sse2")]
pub unsafe fn evaluate_sse(grid: &PaddedGrid, p: Point2) -> Point3 {
    let coord = grid.resolve(p);
    let nb = grid.nb();
    let samples = grid.storage().samples();
    let db = _mm_set1_ps(coord.db);
    let mut ind = coord.stencil_origin(nb);

    let mut rows = [_mm_setzero_ps(); 4];
    for row in rows.iter_mut() {
        // Bounds-checked slice of the four samples, then aligned loads
        let m = samples[ind..ind + 4].as_ptr() as *const f32;
        *row = cubic_ps(
            _mm_load_ps(m),
            _mm_load_ps(m.add(4)),
            _mm_load_ps(m.add(8)),
            _mm_load_ps(m.add(12)),
            db,
        );
        ind += nb;
    }

    let res = cubic_ps(rows[0], rows[1], rows[2], rows[3], _mm_set1_ps(coord.da));
    let mut out = [0.0f32; 4];
    _mm_storeu_ps(out.as_mut_ptr(), res);
    [out[0], out[1], out[2]]
}
