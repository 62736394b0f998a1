// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grid boundary search over the border image.

use gridlens_core::config::ReaderConfig;
use gridlens_core::error::FailureReason;
use tracing::{debug, info, instrument, warn};

use crate::buffer::PixelBuffer;
use crate::contour::{self, Contour};

/// Finds the quadrilateral that outlines the puzzle grid.
///
/// Every traced border is simplified to a polygon. A polygon qualifies when
/// it has exactly four vertices, is convex, encloses at least
/// `image area / boundary_area_divisor` and keeps every vertex away from the
/// image frame. Among qualifying polygons the smallest one wins; a later
/// candidate replaces the current best only when it is strictly smaller.
#[derive(Debug, Clone, Copy)]
pub struct GridContourLocator {
    area_divisor: f64,
    epsilon_ratio: f64,
    edge_margin: u32,
}

impl GridContourLocator {
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            area_divisor: config.boundary_area_divisor,
            epsilon_ratio: config.polygon_epsilon_ratio,
            edge_margin: config.edge_margin,
        }
    }

    /// Locate the grid boundary in a binary border image.
    #[instrument(skip(self, binary), fields(w = binary.width(), h = binary.height()))]
    pub fn locate(&self, binary: &PixelBuffer) -> Result<Contour, FailureReason> {
        let contours = contour::find_contours(binary);
        debug!(count = contours.len(), "Borders traced");
        self.select(&contours, binary.width(), binary.height())
            .map(|(quad, area)| {
                info!(area, "Grid boundary located");
                quad
            })
            .ok_or_else(|| {
                warn!("No contour qualifies as the grid boundary");
                FailureReason::BoundaryNotFound
            })
    }

    /// Pick the smallest qualifying polygon among `contours`.
    pub fn select(&self, contours: &[Contour], width: u32, height: u32) -> Option<(Contour, f64)> {
        let mut best: Option<(Contour, f64)> = None;
        for c in contours {
            let Some((quad, area)) = self.candidate(c, width, height) else {
                continue;
            };
            match &best {
                Some((_, best_area)) if area >= *best_area => {}
                _ => best = Some((quad, area)),
            }
        }
        best
    }

    /// Simplify `contour` and return the polygon with its area when it
    /// qualifies as a grid boundary in a `width` x `height` image.
    pub fn candidate(&self, contour: &Contour, width: u32, height: u32) -> Option<(Contour, f64)> {
        let min_area = (width as f64 * height as f64) / self.area_divisor;
        let polygon = contour.simplify(self.epsilon_ratio * contour.perimeter());
        if polygon.len() != 4 {
            return None;
        }
        let area = polygon.area();
        if area < min_area || !polygon.is_convex() {
            return None;
        }
        let margin = self.edge_margin as i64;
        let (w, h) = (width as i64, height as i64);
        let near_frame = polygon.points().iter().any(|p| {
            let (x, y) = (p.x as i64, p.y as i64);
            x <= margin || x >= w - margin || y <= margin || y >= h - margin
        });
        if near_frame {
            return None;
        }
        Some((polygon, area))
    }
}
