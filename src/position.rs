//! Query point to lattice cell
//!
//! `index = floor((coord - min) * scale)` clamped to `[1, bins - 3]`, so the
//! stencil `index - 1 ..= index + 2` is always inside the grid. The fractional
//! offset is taken against the clamped index and is not clamped itself:
//! points on or past the border extrapolate the outermost cubic instead of
//! failing. The clamp is done in `f32` so the AVX2 path in
//! [`crate::simd::avx2`] reproduces it bit for bit.

use crate::grid::Axis;
use crate::lanes::F32x;
use crate::Point2;

/// Stencil position of one query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCoordinate {
    pub ia: usize,
    pub ib: usize,
    pub da: f32,
    pub db: f32,
}

impl GridCoordinate {
    /// Flat index of the first stencil sample, `(ia - 1, ib - 1)`
    #[inline]
    pub fn stencil_origin(&self, nb: usize) -> usize {
        (self.ia - 1) * nb + (self.ib - 1)
    }
}

#[inline]
pub fn resolve_axis(coord: f32, axis: &Axis) -> (usize, f32) {
    let raw = (coord - axis.min) * axis.scale;
    let index = raw.floor().max(1.0).min((axis.bins - 3) as f32);
    (index as usize, raw - index)
}

#[inline]
pub fn resolve(p: Point2, a: &Axis, b: &Axis) -> GridCoordinate {
    let (ia, da) = resolve_axis(p[0], a);
    let (ib, db) = resolve_axis(p[1], b);
    GridCoordinate { ia, ib, da, db }
}

/// Stencil positions of `N` query points, one per lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneCoordinates<const N: usize> {
    pub ia: [usize; N],
    pub ib: [usize; N],
    pub da: F32x<N>,
    pub db: F32x<N>,
}

impl<const N: usize> LaneCoordinates<N> {
    #[inline]
    pub fn stencil_origin(&self, lane: usize, nb: usize) -> usize {
        (self.ia[lane] - 1) * nb + (self.ib[lane] - 1)
    }
}

#[inline]
pub fn resolve_lanes<const N: usize>(points: &[Point2; N], a: &Axis, b: &Axis) -> LaneCoordinates<N> {
    let coords: [GridCoordinate; N] = std::array::from_fn(|l| resolve(points[l], a, b));
    LaneCoordinates {
        ia: std::array::from_fn(|l| coords[l].ia),
        ib: std::array::from_fn(|l| coords[l].ib),
        da: F32x::from_fn(|l| coords[l].da),
        db: F32x::from_fn(|l| coords[l].db),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_interior_point() {
        // nodes at -1, -0.5, 0, 0.5, 1, 1.5, 2, 2.5, 3
        let axis = Axis::new(-1.0, 3.0, 9);
        let (index, frac) = resolve_axis(0.75, &axis);
        assert_eq!(index, 3);
        assert_relative_eq!(frac, 0.5);
    }

    #[test]
    fn test_lower_bound_clamps_with_negative_offset() {
        let axis = Axis::new(-1.0, 1.0, 8);
        let (index, frac) = resolve_axis(-1.0, &axis);
        assert_eq!(index, 1);
        assert_relative_eq!(frac, -1.0);
    }

    #[test]
    fn test_upper_bound_clamps_with_offset_past_one() {
        let axis = Axis::new(-1.0, 1.0, 8);
        let (index, frac) = resolve_axis(1.0, &axis);
        assert_eq!(index, 5);
        assert_relative_eq!(frac, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_far_outside_stays_in_stencil_range() {
        let axis = Axis::new(0.0, 1.0, 4);
        for &coord in &[-1e6f32, -3.0, 0.0, 0.5, 1.0, 7.0, 1e6] {
            let (index, _) = resolve_axis(coord, &axis);
            assert_eq!(index, 1);
        }
    }

    #[test]
    fn test_stencil_origin() {
        let coord = GridCoordinate {
            ia: 2,
            ib: 3,
            da: 0.0,
            db: 0.0,
        };
        assert_eq!(coord.stencil_origin(10), 12);
    }

    #[test]
    fn test_lanes_match_scalar() {
        let a = Axis::new(-1.0, 1.0, 12);
        let b = Axis::new(-1.0, 1.0, 7);
        let points = [[-1.0, 1.0], [0.1, -0.2], [0.99, 0.0], [-0.5, 0.73]];
        let lanes = resolve_lanes(&points, &a, &b);

        for (l, &p) in points.iter().enumerate() {
            let c = resolve(p, &a, &b);
            assert_eq!(lanes.ia[l], c.ia);
            assert_eq!(lanes.ib[l], c.ib);
            assert_eq!(lanes.da.0[l], c.da);
            assert_eq!(lanes.db.0[l], c.db);
            assert_eq!(lanes.stencil_origin(l, 7), c.stencil_origin(7));
        }
    }
}
