// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar homography from four point correspondences.

use imageproc::geometric_transformations::Projection;
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

/// A 3x3 projective transform normalised so that `h[2][2] == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    matrix: Matrix3<f64>,
}

impl Homography {
    /// Solve for the transform mapping each `src[i]` onto `dst[i]`.
    ///
    /// Returns `None` when the correspondences are degenerate (three or more
    /// collinear points, repeated points).
    pub fn from_correspondences(src: &[[f64; 2]; 4], dst: &[[f64; 2]; 4]) -> Option<Self> {
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for i in 0..4 {
            let [x, y] = src[i];
            let [u, v] = dst[i];
            let r = 2 * i;

            a[(r, 0)] = x;
            a[(r, 1)] = y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -u * x;
            a[(r, 7)] = -u * y;
            b[r] = u;

            a[(r + 1, 3)] = x;
            a[(r + 1, 4)] = y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -v * x;
            a[(r + 1, 7)] = -v * y;
            b[r + 1] = v;
        }

        let h = a.lu().solve(&b)?;
        if h.iter().any(|c| !c.is_finite()) {
            return None;
        }
        let matrix = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
        if matrix.determinant().abs() < 1e-12 {
            return None;
        }
        Some(Self { matrix })
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Map a point through the transform. `None` for points sent to infinity.
    pub fn project(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        let p = self.matrix * Vector3::new(x, y, 1.0);
        if p.z.abs() < f64::EPSILON {
            return None;
        }
        Some([p.x / p.z, p.y / p.z])
    }

    /// The same transform in the form imageproc's warping expects.
    pub fn to_projection(&self) -> Option<Projection> {
        let m = &self.matrix;
        let mut raw = [0.0f32; 9];
        for row in 0..3 {
            for col in 0..3 {
                raw[row * 3 + col] = m[(row, col)] as f32;
            }
        }
        Projection::from_matrix(raw)
    }
}
