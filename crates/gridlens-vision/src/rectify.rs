// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification: corner labelling and the warp of the grid
// quadrilateral onto an upright square.

use gridlens_core::error::FailureReason;
use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{warp_into, Interpolation};
use imageproc::point::Point;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::buffer::PixelBuffer;
use crate::contour::Contour;
use crate::homography::Homography;

/// Position of a quadrilateral vertex relative to the centroid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// Clockwise from the top-left, the order the destination square uses.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomRight => 2,
            Corner::BottomLeft => 3,
        }
    }
}

/// The four labelled vertices of the grid boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerSet {
    points: [Point<i32>; 4],
}

impl CornerSet {
    /// Label the vertices of a 4-point contour.
    ///
    /// A vertex left of the centroid (`x < cx`) is a left corner, one above
    /// it (`y < cy`) a top corner. Each label must be taken exactly once;
    /// anything else is reported as `AmbiguousCorners`.
    pub fn from_quad(quad: &Contour) -> Result<Self, FailureReason> {
        if quad.len() != 4 {
            return Err(FailureReason::AmbiguousCorners);
        }
        let pts = quad.points();
        let cx = pts.iter().map(|p| p.x as f64).sum::<f64>() / 4.0;
        let cy = pts.iter().map(|p| p.y as f64).sum::<f64>() / 4.0;

        let mut slots: [Option<Point<i32>>; 4] = [None; 4];
        for &p in pts {
            let left = (p.x as f64) < cx;
            let top = (p.y as f64) < cy;
            let corner = match (top, left) {
                (true, true) => Corner::TopLeft,
                (true, false) => Corner::TopRight,
                (false, false) => Corner::BottomRight,
                (false, true) => Corner::BottomLeft,
            };
            let slot = &mut slots[corner.index()];
            if slot.is_some() {
                debug!(?corner, x = p.x, y = p.y, "Corner label taken twice");
                return Err(FailureReason::AmbiguousCorners);
            }
            *slot = Some(p);
        }

        match slots {
            [Some(tl), Some(tr), Some(br), Some(bl)] => Ok(Self {
                points: [tl, tr, br, bl],
            }),
            _ => Err(FailureReason::AmbiguousCorners),
        }
    }

    pub fn get(&self, corner: Corner) -> Point<i32> {
        self.points[corner.index()]
    }

    /// Vertices in `Corner::ALL` order.
    pub fn points(&self) -> &[Point<i32>; 4] {
        &self.points
    }
}

/// Result of a rectification.
#[derive(Debug, Clone)]
pub struct Rectification {
    pub image: PixelBuffer,
    /// Transform from source coordinates to rectified coordinates.
    pub homography: Homography,
}

/// Warps the labelled quadrilateral onto an S x S square.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveRectifier {
    side: u32,
}

impl PerspectiveRectifier {
    pub fn new(side: u32) -> Self {
        Self { side }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    /// Map TL, TR, BR, BL onto `(0,0)`, `(S,0)`, `(S,S)`, `(0,S)` and
    /// resample bilinearly. Pixels that fall outside the source are white.
    #[instrument(skip(self, image, corners), fields(side = self.side))]
    pub fn rectify(
        &self,
        image: &PixelBuffer,
        corners: &CornerSet,
    ) -> Result<Rectification, FailureReason> {
        let s = self.side as f64;
        let src = corners.points().map(|p| [p.x as f64, p.y as f64]);
        let dst = [[0.0, 0.0], [s, 0.0], [s, s], [0.0, s]];

        let Some(homography) = Homography::from_correspondences(&src, &dst) else {
            warn!(?src, "Corner set does not define a perspective transform");
            return Err(FailureReason::AmbiguousCorners);
        };
        let Some(projection) = homography.to_projection() else {
            warn!("Perspective transform is not invertible");
            return Err(FailureReason::AmbiguousCorners);
        };

        let mut out = GrayImage::from_pixel(self.side, self.side, Luma([255u8]));
        warp_into(
            image.as_gray(),
            &projection,
            Interpolation::Bilinear,
            Luma([255u8]),
            &mut out,
        );
        debug!(side = self.side, "Grid rectified");

        Ok(Rectification {
            image: PixelBuffer::from_gray(out),
            homography,
        })
    }
}
