//! Third-order spline on four control points
//!
//! `x = 0` reproduces `v1` and `x = 1` reproduces `v2`; the tangents at those
//! points are the central differences `(v2 - v0) / 2` and `(v3 - v1) / 2`.
//! Every evaluator, scalar or vector, goes through this exact operation order.
//! The SIMD intrinsic versions in [`crate::simd`] mirror it instruction for
//! instruction and must not use fused multiply-add.

use crate::lanes::Lanes;

#[inline(always)]
pub fn cubic<T: Lanes>(v0: T, v1: T, v2: T, v3: T, x: T) -> T {
    let dv = v2 - v1;
    let z0 = T::splat(0.5) * (v2 - v0);
    let z1 = T::splat(0.5) * (v3 - v1);
    (x * x) * ((z1 - dv) * (x - T::splat(1.0)) + (z0 - dv) * (x - T::splat(2.0))) + (z0 * x + v1)
}

#[inline(always)]
pub fn cubic_slice<T: Lanes>(v: &[T; 4], x: T) -> T {
    cubic(v[0], v[1], v[2], v[3], x)
}
