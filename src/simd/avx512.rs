//! AVX-512 16-lane evaluation (`Vec16`)
//!
//! The four padded stencil rows of one column fill a single 512-bit register,
//! so the first spline pass is one kernel invocation per column. The four
//! row results are then finished with the 4-lane SSE kernel.

use std::arch::x86_64::*;

use crate::grid::PaddedGrid;
use crate::simd::sse::cubic_ps as cubic_ps128;
use crate::{Point2, Point3};

#[inline]
#[target_feature(enable = "avx512f")]
unsafe fn cubic_ps(v0: __m512, v1: __m512, v2: __m512, v3: __m512, x: __m512) -> __m512 {
    let half = _mm512_set1_ps(0.5);
    let dv = _mm512_sub_ps(v2, v1);
    let z0 = _mm512_mul_ps(half, _mm512_sub_ps(v2, v0));
    let z1 = _mm512_mul_ps(half, _mm512_sub_ps(v3, v1));
    let t1 = _mm512_mul_ps(_mm512_sub_ps(z1, dv), _mm512_sub_ps(x, _mm512_set1_ps(1.0)));
    let t2 = _mm512_mul_ps(_mm512_sub_ps(z0, dv), _mm512_sub_ps(x, _mm512_set1_ps(2.0)));
    _mm512_add_ps(
        _mm512_mul_ps(_mm512_mul_ps(x, x), _mm512_add_ps(t1, t2)),
        _mm512_add_ps(_mm512_mul_ps(z0, x), v1),
    )
}

/// AVX-512 evaluation of one query point
///
/// # Safety
///
/// Requires AVX-512F. Caller must verify it is available.
#[target_feature(enable = "avx512f")]
pub unsafe fn evaluate_vec16_avx512(grid: &PaddedGrid, p: Point2) -> Point3 {
    let coord = grid.resolve(p);
    let nb = grid.nb();
    let samples = grid.storage().samples();
    let origin = coord.stencil_origin(nb);

    let mut column = [0.0f32; 16];
    let mut cols = [_mm512_setzero_ps(); 4];
    for (k, col) in cols.iter_mut().enumerate() {
        for r in 0..4 {
            column[4 * r..4 * r + 4].copy_from_slice(&samples[origin + r * nb + k].0);
        }
        *col = _mm512_loadu_ps(column.as_ptr());
    }

    let wide = cubic_ps(cols[0], cols[1], cols[2], cols[3], _mm512_set1_ps(coord.db));
    let mut rows = [0.0f32; 16];
    _mm512_storeu_ps(rows.as_mut_ptr(), wide);

    let res = cubic_ps128(
        _mm_loadu_ps(rows.as_ptr()),
        _mm_loadu_ps(rows.as_ptr().add(4)),
        _mm_loadu_ps(rows.as_ptr().add(8)),
        _mm_loadu_ps(rows.as_ptr().add(12)),
        _mm_set1_ps(coord.da),
    );
    let mut out = [0.0f32; 4];
    _mm_storeu_ps(out.as_mut_ptr(), res);
    [out[0], out[1], out[2]]
}
