//! Generic two-pass tensor-product evaluator
//!
//! Every single-point variant runs the same algorithm:
//!
//! 1. resolve the query point to a stencil origin and offsets `(da, db)`
//! 2. gather the four stencil columns along the second axis, each column
//!    holding four rows of samples packed into one lane vector
//! 3. one cubic pass with `db` over the columns, split into four rows
//! 4. one cubic pass with `da` over the rows
//!
//! A [`StencilLayout`] decides the storage it reads, how samples are packed
//! into lanes, and how wide each pass is.

use crate::grid::{Packed, Padded, Planar, SampleGrid, Storage};
use crate::kernel::cubic;
use crate::lanes::{F32x12, F32x16, F32x3, F32x4, Lanes, Rows};
use crate::{Point2, Point3};

/// Gather strategy and lane width of one evaluator variant
pub trait StencilLayout {
    type Storage: Storage;
    /// Lanes of the first pass: four rows of one stencil column
    type Wide: Lanes;
    /// Lanes of the second pass: one row, at least three components
    type Row: Lanes;

    /// Columns `k = 0..4` of the stencil whose first sample is `origin`
    fn gather(storage: &Self::Storage, origin: usize, nb: usize) -> [Self::Wide; 4];

    fn split(wide: Self::Wide) -> [Self::Row; 4];

    fn finish(row: Self::Row) -> Point3;
}

#[inline]
pub fn evaluate<L: StencilLayout>(grid: &SampleGrid<L::Storage>, p: Point2) -> Point3 {
    let coord = grid.resolve(p);
    let nb = grid.nb();
    let cols = L::gather(grid.storage(), coord.stencil_origin(nb), nb);
    let rows = L::split(cubic(cols[0], cols[1], cols[2], cols[3], L::Wide::splat(coord.db)));
    L::finish(cubic(rows[0], rows[1], rows[2], rows[3], L::Row::splat(coord.da)))
}

/// Component lanes, one first-pass kernel per row (`Vectorized`)
pub struct Rowwise;

impl StencilLayout for Rowwise {
    type Storage = Padded;
    type Wide = Rows<F32x4>;
    type Row = F32x4;

    #[inline(always)]
    fn gather(storage: &Padded, origin: usize, nb: usize) -> [Rows<F32x4>; 4] {
        let m = storage.samples();
        std::array::from_fn(|k| Rows(std::array::from_fn(|r| m[origin + r * nb + k])))
    }

    #[inline(always)]
    fn split(wide: Rows<F32x4>) -> [F32x4; 4] {
        wide.0
    }

    #[inline(always)]
    fn finish(row: F32x4) -> Point3 {
        [row.0[0], row.0[1], row.0[2]]
    }
}

/// Four padded rows in one 16-lane first pass (`Vec16`)
pub struct Wide16;

impl StencilLayout for Wide16 {
    type Storage = Padded;
    type Wide = F32x16;
    type Row = F32x4;

    #[inline(always)]
    fn gather(storage: &Padded, origin: usize, nb: usize) -> [F32x16; 4] {
        let m = storage.samples();
        std::array::from_fn(|k| F32x16::from_fn(|i| m[origin + (i / 4) * nb + k].0[i % 4]))
    }

    #[inline(always)]
    fn split(wide: F32x16) -> [F32x4; 4] {
        std::array::from_fn(|r| wide.chunk(4 * r))
    }

    #[inline(always)]
    fn finish(row: F32x4) -> Point3 {
        [row.0[0], row.0[1], row.0[2]]
    }
}

/// Packed storage: each stencil row is 12 contiguous floats (`Vec12`)
///
/// Lane `3r + c` of column `k` holds component `c` of row `r`.
pub struct Wide12;

impl StencilLayout for Wide12 {
    type Storage = Packed;
    type Wide = F32x12;
    type Row = F32x3;

    #[inline(always)]
    fn gather(storage: &Packed, origin: usize, nb: usize) -> [F32x12; 4] {
        let flat = storage.as_flat();
        let rows: [&[f32]; 4] = std::array::from_fn(|r| {
            let start = (origin + r * nb) * 3;
            &flat[start..start + 12]
        });
        std::array::from_fn(|k| F32x12::from_fn(|i| rows[i / 3][3 * k + i % 3]))
    }

    #[inline(always)]
    fn split(wide: F32x12) -> [F32x3; 4] {
        std::array::from_fn(|r| wide.chunk(3 * r))
    }

    #[inline(always)]
    fn finish(row: F32x3) -> Point3 {
        row.0
    }
}

/// Planar storage, per-component contiguous loads (`Vec2`)
///
/// Lane `4c + r` of column `k` holds component `c` of row `r`; the split
/// transposes back to one `[x, y, z]` vector per row.
pub struct PlanarWide;

impl StencilLayout for PlanarWide {
    type Storage = Planar;
    type Wide = F32x12;
    type Row = F32x3;

    #[inline(always)]
    fn gather(storage: &Planar, origin: usize, nb: usize) -> [F32x12; 4] {
        let planes = [storage.plane(0), storage.plane(1), storage.plane(2)];
        let runs: [[&[f32]; 4]; 3] = std::array::from_fn(|c| {
            std::array::from_fn(|r| {
                let start = origin + r * nb;
                &planes[c][start..start + 4]
            })
        });
        std::array::from_fn(|k| F32x12::from_fn(|i| runs[i / 4][i % 4][k]))
    }

    #[inline(always)]
    fn split(wide: F32x12) -> [F32x3; 4] {
        std::array::from_fn(|r| F32x3::from_fn(|c| wide.0[4 * c + r]))
    }

    #[inline(always)]
    fn finish(row: F32x3) -> Point3 {
        row.0
    }
}
