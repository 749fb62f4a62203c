//! Bicubic spline interpolation on a 2D grid of 3D samples, scalar and SIMD
//!
//! This crate evaluates a tensor-product cubic spline (4-point stencils along
//! each axis) at arbitrary query points, in several numerically equivalent
//! variants that differ only in data layout and SIMD width, and ships a
//! harness that times them against each other and cross-validates them
//! against the scalar reference.
//!
//! # Variants
//!
//! - **Scalar**: per-component loops ([`scalar`])
//! - **Vectorized**: `[x, y, z, pad]` in one 4-lane vector (SSE)
//! - **Vec16**: four stencil rows in one 16-lane vector (AVX-512)
//! - **Vec2**: planar storage, per-component loads
//! - **Vec12**: packed storage, 12 contiguous floats per stencil row
//! - **Horizontal** / **Horizontal2**: eight query points per call, padded or
//!   planar storage (AVX2 gathers)
//!
//! Intrinsic paths are chosen at runtime; the portable evaluators in
//! [`layout`] and [`batch`] run everywhere else.
//!
//! # Example
//!
//! ```rust
//! use spline2d_simd::{evaluate_scalar, evaluate_vectorized, PaddedGrid};
//!
//! let mut grid = PaddedGrid::new(-1.0, 1.0, 16, -1.0, 1.0, 16);
//! for i in 0..grid.point_count() {
//!     grid.fill(i, [i as f32, 0.0, 1.0]);
//! }
//!
//! let a = evaluate_scalar(&grid, [0.25, -0.5]);
//! let b = evaluate_vectorized(&grid, [0.25, -0.5]);
//! assert!((a[0] - b[0]).abs() <= 1e-5);
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod grid;
pub mod harness;
pub mod kernel;
pub mod lanes;
pub mod layout;
pub mod position;
pub mod report;
pub mod scalar;
pub mod simd;
pub mod tsc;

pub use batch::BATCH;
pub use config::{BenchConfig, EnabledVariants};
pub use error::{BenchError, Mismatch};
pub use grid::{GridSet, PackedGrid, PaddedGrid, PlanarGrid, SampleGrid};
pub use harness::{Harness, Measurement, Ratio, TrialReport};

use layout::{PlanarWide, Wide12, Wide16};
use serde::Serialize;

/// Query point `[a, b]`
pub type Point2 = [f32; 2];
/// Interpolated value `[x, y, z]`
pub type Point3 = [f32; 3];

/// One measured configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Variant {
    Scalar,
    Vectorized,
    Vec16,
    Vec2,
    Vec12,
    Horizontal,
    Horizontal2,
}

/// How a variant is called
#[derive(Clone, Copy)]
pub enum Evaluation {
    Single(fn(&GridSet, Point2) -> Point3),
    Batch(fn(&GridSet, &[Point2; BATCH]) -> [Point3; BATCH]),
}

impl Variant {
    /// Report order
    pub const ALL: [Variant; 7] = [
        Variant::Scalar,
        Variant::Vectorized,
        Variant::Vec16,
        Variant::Vec2,
        Variant::Vec12,
        Variant::Horizontal,
        Variant::Horizontal2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Scalar => "Scalar",
            Variant::Vectorized => "Vectorized",
            Variant::Vec16 => "Vec16",
            Variant::Vec2 => "Vec2",
            Variant::Vec12 => "Vec12",
            Variant::Horizontal => "Horizontal",
            Variant::Horizontal2 => "Horizontal2",
        }
    }

    pub fn is_batch(self) -> bool {
        matches!(self, Variant::Horizontal | Variant::Horizontal2)
    }

    pub fn evaluation(self) -> Evaluation {
        match self {
            Variant::Scalar => Evaluation::Single(|g, p| evaluate_scalar(&g.padded, p)),
            Variant::Vectorized => Evaluation::Single(|g, p| evaluate_vectorized(&g.padded, p)),
            Variant::Vec16 => Evaluation::Single(|g, p| evaluate_vec16(&g.padded, p)),
            Variant::Vec2 => Evaluation::Single(|g, p| evaluate_vec2(&g.planar, p)),
            Variant::Vec12 => Evaluation::Single(|g, p| evaluate_vec12(&g.packed, p)),
            Variant::Horizontal => Evaluation::Batch(|g, b| evaluate_horizontal(&g.padded, b)),
            Variant::Horizontal2 => Evaluation::Batch(|g, b| evaluate_horizontal2(&g.planar, b)),
        }
    }
}

/// Reference evaluation, one component at a time
#[inline]
pub fn evaluate_scalar(grid: &PaddedGrid, p: Point2) -> Point3 {
    scalar::evaluate(grid, p)
}

/// Component-lane evaluation (SSE on x86-64)
#[cfg(target_arch = "x86_64")]
#[inline]
pub fn evaluate_vectorized(grid: &PaddedGrid, p: Point2) -> Point3 {
    // SAFETY: SSE2 is part of the x86-64 baseline
    unsafe { simd::sse::evaluate_sse(grid, p) }
}

/// Component-lane evaluation
#[cfg(not(target_arch = "x86_64"))]
#[inline]
pub fn evaluate_vectorized(grid: &PaddedGrid, p: Point2) -> Point3 {
    layout::evaluate::<layout::Rowwise>(grid, p)
}

/// 16-lane first pass (AVX-512 when available)
#[inline]
pub fn evaluate_vec16(grid: &PaddedGrid, p: Point2) -> Point3 {
    #[cfg(all(target_arch = "x86_64", has_stable_avx512))]
    {
        if is_x86_feature_detected!("avx512f") {
            return unsafe { simd::avx512::evaluate_vec16_avx512(grid, p) };
        }
    }

    layout::evaluate::<Wide16>(grid, p)
}

/// Planar storage, per-component loads
#[inline]
pub fn evaluate_vec2(grid: &PlanarGrid, p: Point2) -> Point3 {
    layout::evaluate::<PlanarWide>(grid, p)
}

/// Packed storage, 12-lane first pass
#[inline]
pub fn evaluate_vec12(grid: &PackedGrid, p: Point2) -> Point3 {
    layout::evaluate::<Wide12>(grid, p)
}

/// Eight points at once over padded storage (AVX2 when available)
#[inline]
pub fn evaluate_horizontal(grid: &PaddedGrid, points: &[Point2; BATCH]) -> [Point3; BATCH] {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            return unsafe { simd::avx2::evaluate_batch_padded_avx2(grid, points) };
        }
    }

    batch::evaluate_batch(grid, points)
}

/// Eight points at once over planar storage (AVX2 when available)
#[inline]
pub fn evaluate_horizontal2(grid: &PlanarGrid, points: &[Point2; BATCH]) -> [Point3; BATCH] {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            return unsafe { simd::avx2::evaluate_batch_planar_avx2(grid, points) };
        }
    }

    batch::evaluate_batch(grid, points)
}
