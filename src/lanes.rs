//! Portable fixed-width `f32` lane vectors
//!
//! The generic evaluators are written against the [`Lanes`] trait so the same
//! two-pass spline code runs on a single `f32`, on a short vector holding the
//! components of one sample, or on a wide vector holding several rows or
//! several query points. The element loops compile to packed SSE/AVX code in
//! release builds; the explicit intrinsic versions live in [`crate::simd`].

use std::ops::{Add, Mul, Sub};

/// Arithmetic needed by the cubic kernel, applied lane by lane
pub trait Lanes: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> {
    /// Number of `f32` lanes
    const WIDTH: usize;

    /// Broadcast a scalar to every lane
    fn splat(v: f32) -> Self;
}

impl Lanes for f32 {
    const WIDTH: usize = 1;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        v
    }
}

/// `N` packed `f32` lanes, 16-byte aligned so padded samples can be loaded
/// straight into SSE registers
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C, align(16))]
pub struct F32x<const N: usize>(pub [f32; N]);

pub type F32x3 = F32x<3>;
pub type F32x4 = F32x<4>;
pub type F32x8 = F32x<8>;
pub type F32x12 = F32x<12>;
pub type F32x16 = F32x<16>;

impl<const N: usize> F32x<N> {
    pub const ZERO: Self = Self([0.0; N]);

    #[inline(always)]
    pub fn from_fn(f: impl FnMut(usize) -> f32) -> Self {
        Self(std::array::from_fn(f))
    }

    #[inline(always)]
    pub fn to_array(self) -> [f32; N] {
        self.0
    }

    /// Copy `M` consecutive lanes starting at `start`
    #[inline(always)]
    pub fn chunk<const M: usize>(&self, start: usize) -> F32x<M> {
        F32x::from_fn(|i| self.0[start + i])
    }
}

impl<const N: usize> Default for F32x<N> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const N: usize> From<[f32; N]> for F32x<N> {
    #[inline(always)]
    fn from(v: [f32; N]) -> Self {
        Self(v)
    }
}

impl<const N: usize> Add for F32x<N> {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl<const N: usize> Sub for F32x<N> {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}

impl<const N: usize> Mul for F32x<N> {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] * rhs.0[i]))
    }
}

impl<const N: usize> Lanes for F32x<N> {
    const WIDTH: usize = N;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        Self([v; N])
    }
}

/// Four independent row values evaluated side by side
///
/// Used by the row-wise layout, where the first spline pass runs once per
/// stencil row on a component vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rows<L>(pub [L; 4]);

impl<L: Lanes> Add for Rows<L> {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|r| self.0[r] + rhs.0[r]))
    }
}

impl<L: Lanes> Sub for Rows<L> {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|r| self.0[r] - rhs.0[r]))
    }
}

impl<L: Lanes> Mul for Rows<L> {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|r| self.0[r] * rhs.0[r]))
    }
}

impl<L: Lanes> Lanes for Rows<L> {
    const WIDTH: usize = 4 * L::WIDTH;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        Self([L::splat(v); 4])
    }
}
