//! Scalar (non-SIMD) spline evaluation
//!
//! One component at a time, one `f32` at a time. This is the reference every
//! vectorized variant is cross-validated against.

use crate::grid::PaddedGrid;
use crate::kernel::{cubic, cubic_slice};
use crate::{Point2, Point3};

/// Interpolate the grid at `p`
#[inline]
pub fn evaluate(grid: &PaddedGrid, p: Point2) -> Point3 {
    let coord = grid.resolve(p);
    let nb = grid.nb();
    let m = grid.storage().samples();
    let mut ind = coord.stencil_origin(nb);

    let mut vx = [0.0f32; 4];
    let mut vy = [0.0f32; 4];
    let mut vz = [0.0f32; 4];
    for i in 0..4 {
        let (s0, s1, s2, s3) = (&m[ind].0, &m[ind + 1].0, &m[ind + 2].0, &m[ind + 3].0);
        vx[i] = cubic(s0[0], s1[0], s2[0], s3[0], coord.db);
        vy[i] = cubic(s0[1], s1[1], s2[1], s3[1], coord.db);
        vz[i] = cubic(s0[2], s1[2], s2[2], s3[2], coord.db);
        ind += nb;
    }

    [
        cubic_slice(&vx, coord.da),
        cubic_slice(&vy, coord.da),
        cubic_slice(&vz, coord.da),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reproduces_nodes() {
        let mut grid = PaddedGrid::new(0.0, 7.0, 8, 0.0, 7.0, 8);
        for ia in 0..8 {
            for ib in 0..8 {
                let v = (ia * 8 + ib) as f32;
                grid.fill(ia * 8 + ib, [v, -v, 0.5 * v]);
            }
        }

        // Interior cells: the spline passes through every node
        for ia in 1..6 {
            for ib in 1..6 {
                let r = evaluate(&grid, [ia as f32, ib as f32]);
                let v = (ia * 8 + ib) as f32;
                assert_relative_eq!(r[0], v, epsilon = 1e-4);
                assert_relative_eq!(r[1], -v, epsilon = 1e-4);
                assert_relative_eq!(r[2], 0.5 * v, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_bilinear_field_exact() {
        // f(a, b) = a + 2b is reproduced exactly by the tensor-product spline
        let mut grid = PaddedGrid::new(-1.0, 1.0, 9, -1.0, 1.0, 9);
        for ia in 0..9 {
            for ib in 0..9 {
                let v = grid.node_a(ia) + 2.0 * grid.node_b(ib);
                grid.fill(ia * 9 + ib, [v, v, v]);
            }
        }

        for &(a, b) in &[(0.1f32, 0.2f32), (-0.33, 0.71), (0.9, -0.9), (-1.0, 1.0)] {
            let r = evaluate(&grid, [a, b]);
            assert_relative_eq!(r[0], a + 2.0 * b, epsilon = 1e-5);
        }
    }
}
