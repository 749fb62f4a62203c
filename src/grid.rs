//! Regular 2D lattice of 3-component samples
//!
//! Samples are stored flat and row-major (`index = iA * NB + iB`) so every
//! evaluator can walk a stencil with plain stride arithmetic. The storage
//! layout is a type parameter:
//!
//! - [`Padded`]: one 16-byte aligned `[x, y, z, 0]` vector per sample
//! - [`Planar`]: one contiguous plane per component, shape `(3, N)`
//! - [`Packed`]: `[x, y, z]` per sample without padding, shape `(N, 3)`

use crate::lanes::F32x4;
use crate::position::{resolve, GridCoordinate};
use crate::{Point2, Point3};
use ndarray::Array2;
use rand::Rng;

/// Smallest number of nodes per axis that still holds a 4-point stencil
pub const MIN_BINS: usize = 4;

/// One lattice axis: origin, node spacing and node count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub min: f32,
    pub step: f32,
    /// `1 / step`, used to map coordinates to node indices
    pub scale: f32,
    pub bins: usize,
}

impl Axis {
    /// Build an axis over `[min, max]` with `bins` nodes
    ///
    /// `bins` is raised to [`MIN_BINS`]. An empty or inverted range is
    /// replaced by `[min, min + 1]`.
    pub fn new(min: f32, max: f32, bins: usize) -> Self {
        let bins = bins.max(MIN_BINS);
        let max = if max <= min { min + 1.0 } else { max };
        let step = (max - min) / (bins - 1) as f32;
        Self {
            min,
            step,
            scale: 1.0 / step,
            bins,
        }
    }

    /// Coordinate of node `i`
    #[inline]
    pub fn node(&self, i: usize) -> f32 {
        self.min + i as f32 * self.step
    }
}

/// Backing store for the samples of a [`SampleGrid`]
pub trait Storage {
    /// Allocate `len` zero samples
    fn zeroed(len: usize) -> Self;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fill(&mut self, index: usize, value: Point3);

    fn get(&self, index: usize) -> Point3;

    /// Component `c` (0..3) of sample `index`
    fn component(&self, index: usize, c: usize) -> f32;
}

/// Interleaved samples padded to four lanes
#[derive(Debug, Clone)]
pub struct Padded {
    samples: Vec<F32x4>,
}

impl Padded {
    #[inline]
    pub fn samples(&self) -> &[F32x4] {
        &self.samples
    }

    /// The samples as one `f32` slice of length `4 * len`
    #[inline]
    pub fn as_flat(&self) -> &[f32] {
        // SAFETY: F32x4 is repr(C) over [f32; 4] with size 16 and no padding,
        // so a slice of them is a contiguous run of 4 * len f32 values.
        unsafe { std::slice::from_raw_parts(self.samples.as_ptr() as *const f32, self.samples.len() * 4) }
    }
}

impl Storage for Padded {
    fn zeroed(len: usize) -> Self {
        Self {
            samples: vec![F32x4::ZERO; len],
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    fn fill(&mut self, index: usize, value: Point3) {
        self.samples[index] = F32x4::from([value[0], value[1], value[2], 0.0]);
    }

    #[inline]
    fn get(&self, index: usize) -> Point3 {
        let s = self.samples[index].0;
        [s[0], s[1], s[2]]
    }

    #[inline]
    fn component(&self, index: usize, c: usize) -> f32 {
        self.samples[index].0[c]
    }
}

/// Structure-of-arrays storage: all x, then all y, then all z
#[derive(Debug, Clone)]
pub struct Planar {
    planes: Array2<f32>,
}

impl Planar {
    /// All three planes back to back, length `3 * len`
    #[inline]
    pub fn as_flat(&self) -> &[f32] {
        self.planes.as_slice().expect("planar storage is allocated in standard layout")
    }

    #[inline]
    pub fn plane(&self, c: usize) -> &[f32] {
        let len = self.len();
        &self.as_flat()[c * len..(c + 1) * len]
    }
}

impl Storage for Planar {
    fn zeroed(len: usize) -> Self {
        Self {
            planes: Array2::zeros((3, len)),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.planes.ncols()
    }

    #[inline]
    fn fill(&mut self, index: usize, value: Point3) {
        for (c, v) in value.into_iter().enumerate() {
            self.planes[[c, index]] = v;
        }
    }

    #[inline]
    fn get(&self, index: usize) -> Point3 {
        [self.planes[[0, index]], self.planes[[1, index]], self.planes[[2, index]]]
    }

    #[inline]
    fn component(&self, index: usize, c: usize) -> f32 {
        self.planes[[c, index]]
    }
}

/// Interleaved samples without padding
#[derive(Debug, Clone)]
pub struct Packed {
    values: Array2<f32>,
}

impl Packed {
    /// `[x0, y0, z0, x1, y1, z1, ...]`, length `3 * len`
    #[inline]
    pub fn as_flat(&self) -> &[f32] {
        self.values.as_slice().expect("packed storage is allocated in standard layout")
    }
}

impl Storage for Packed {
    fn zeroed(len: usize) -> Self {
        Self {
            values: Array2::zeros((len, 3)),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.values.nrows()
    }

    #[inline]
    fn fill(&mut self, index: usize, value: Point3) {
        for (c, v) in value.into_iter().enumerate() {
            self.values[[index, c]] = v;
        }
    }

    #[inline]
    fn get(&self, index: usize) -> Point3 {
        [self.values[[index, 0]], self.values[[index, 1]], self.values[[index, 2]]]
    }

    #[inline]
    fn component(&self, index: usize, c: usize) -> f32 {
        self.values[[index, c]]
    }
}

/// 3-component samples on an `NA x NB` lattice
#[derive(Debug, Clone)]
pub struct SampleGrid<S = Padded> {
    a: Axis,
    b: Axis,
    storage: S,
}

pub type PaddedGrid = SampleGrid<Padded>;
pub type PlanarGrid = SampleGrid<Planar>;
pub type PackedGrid = SampleGrid<Packed>;

impl<S: Storage> SampleGrid<S> {
    /// Create a zero-filled grid
    ///
    /// Bin counts below [`MIN_BINS`] are raised to it and degenerate ranges
    /// span one unit, see [`Axis::new`].
    pub fn new(min_a: f32, max_a: f32, bins_a: usize, min_b: f32, max_b: f32, bins_b: usize) -> Self {
        let a = Axis::new(min_a, max_a, bins_a);
        let b = Axis::new(min_b, max_b, bins_b);
        Self {
            a,
            b,
            storage: S::zeroed(a.bins * b.bins),
        }
    }

    /// Overwrite sample `index`; panics if `index >= point_count()`
    #[inline]
    pub fn fill(&mut self, index: usize, value: Point3) {
        self.storage.fill(index, value);
    }

    #[inline]
    pub fn get(&self, index: usize) -> Point3 {
        self.storage.get(index)
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.storage.len()
    }

    /// Node count along the first axis
    #[inline]
    pub fn map_size(&self) -> usize {
        self.a.bins
    }

    #[inline]
    pub fn na(&self) -> usize {
        self.a.bins
    }

    #[inline]
    pub fn nb(&self) -> usize {
        self.b.bins
    }

    #[inline]
    pub fn axis_a(&self) -> &Axis {
        &self.a
    }

    #[inline]
    pub fn axis_b(&self) -> &Axis {
        &self.b
    }

    #[inline]
    pub fn node_a(&self, i: usize) -> f32 {
        self.a.node(i)
    }

    #[inline]
    pub fn node_b(&self, j: usize) -> f32 {
        self.b.node(j)
    }

    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Locate `p` on the lattice, see [`crate::position`]
    #[inline]
    pub fn resolve(&self, p: Point2) -> GridCoordinate {
        resolve(p, &self.a, &self.b)
    }
}

/// One grid per storage layout, always holding the same samples
#[derive(Debug, Clone)]
pub struct GridSet {
    pub padded: PaddedGrid,
    pub planar: PlanarGrid,
    pub packed: PackedGrid,
}

impl GridSet {
    /// Square `size x size` grids over `[min, max]` on both axes
    pub fn new(min: f32, max: f32, size: usize) -> Self {
        Self {
            padded: SampleGrid::new(min, max, size, min, max, size),
            planar: SampleGrid::new(min, max, size, min, max, size),
            packed: SampleGrid::new(min, max, size, min, max, size),
        }
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.padded.point_count()
    }

    #[inline]
    pub fn map_size(&self) -> usize {
        self.padded.map_size()
    }

    pub fn fill(&mut self, index: usize, value: Point3) {
        self.padded.fill(index, value);
        self.planar.fill(index, value);
        self.packed.fill(index, value);
    }

    /// Fill every sample with components drawn uniformly from `[-1, 1)`
    pub fn fill_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for i in 0..self.point_count() {
            let x = rng.random_range(-1.0f32..1.0);
            let y = rng.random_range(-1.0f32..1.0);
            let z = rng.random_range(-1.0f32..1.0);
            self.fill(i, [x, y, z]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_bins_clamped() {
        for bins in 0..4 {
            let grid = PaddedGrid::new(-1.0, 1.0, bins, -1.0, 1.0, bins);
            assert_eq!(grid.na(), 4);
            assert_eq!(grid.nb(), 4);
            assert_eq!(grid.point_count(), 16);
        }

        let grid = PlanarGrid::new(-1.0, 1.0, 7, 0.0, 2.0, 9);
        assert_eq!(grid.na(), 7);
        assert_eq!(grid.nb(), 9);
        assert_eq!(grid.point_count(), 63);
    }

    #[test]
    fn test_step_and_scale() {
        let axis = Axis::new(-1.0, 1.0, 5);
        assert_relative_eq!(axis.step, 0.5);
        assert_relative_eq!(axis.scale, 2.0);
        assert_relative_eq!(axis.node(4), 1.0);
    }

    #[test]
    fn test_degenerate_range() {
        let axis = Axis::new(2.0, 2.0, 4);
        assert!(axis.step > 0.0);
        assert_relative_eq!(axis.node(3), 3.0);

        let inverted = Axis::new(2.0, -5.0, 11);
        assert_relative_eq!(inverted.step, 0.1, epsilon = 1e-7);
    }

    #[test]
    fn test_fill_row_major() {
        let mut grid = PackedGrid::new(0.0, 1.0, 4, 0.0, 1.0, 6);
        let index = 2 * grid.nb() + 5;
        grid.fill(index, [1.0, 2.0, 3.0]);

        assert_eq!(grid.get(index), [1.0, 2.0, 3.0]);
        assert_eq!(grid.storage().as_flat()[index * 3 + 1], 2.0);
        assert_eq!(grid.get(index - 1), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_layouts_agree() {
        let mut grids = GridSet::new(-1.0, 1.0, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        grids.fill_random(&mut rng);

        let n = grids.point_count();
        for i in 0..n {
            let v = grids.padded.get(i);
            assert_eq!(grids.planar.get(i), v);
            assert_eq!(grids.packed.get(i), v);
            for (c, &component) in v.iter().enumerate() {
                assert!((-1.0..1.0).contains(&component));
                assert_eq!(grids.planar.storage().plane(c)[i], component);
                assert_eq!(grids.padded.storage().as_flat()[i * 4 + c], component);
            }
            assert_eq!(grids.padded.storage().samples()[i].0[3], 0.0);
        }
    }
}
