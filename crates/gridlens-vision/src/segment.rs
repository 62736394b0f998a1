// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Digit segmentation: find glyph-sized blobs in the spotting image and map
// each one to its grid cell.

use gridlens_core::config::ReaderConfig;
use gridlens_core::grid::GRID_SIDE;
use tracing::{debug, instrument, trace};

use crate::buffer::PixelBuffer;
use crate::contour::{self, BoundingBox, Contour};

/// A blob accepted as a glyph, with the cell it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphCandidate {
    pub contour: Contour,
    pub bbox: BoundingBox,
    pub row: usize,
    pub col: usize,
}

/// Why a blob was not accepted. Only used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Area,
    TooLarge,
    TooSmall,
    CellMargin,
}

/// Filters traced blobs down to plausible glyphs.
///
/// With C the cell side (`S / 9`) and A its area:
/// - contour area must lie within `[A / 50, A / 2]`;
/// - the bounding box must fit in a cell and be at least C/3 tall or wide;
/// - the box origin must sit inside the cell, at least `C / d` from its
///   top-left edges and at most `C * (d - 1) / d`, with d the margin divisor.
#[derive(Debug, Clone, Copy)]
pub struct DigitSegmenter {
    margin_divisor: u32,
}

impl DigitSegmenter {
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            margin_divisor: config.cell_margin_divisor,
        }
    }

    /// Cell side length for a rectified square of side `side`.
    pub fn cell_size(side: u32) -> u32 {
        side / GRID_SIDE as u32
    }

    /// Accepted glyphs in tracing order.
    #[instrument(skip(self, spotting), fields(side = spotting.width()))]
    pub fn segment(&self, spotting: &PixelBuffer) -> Vec<GlyphCandidate> {
        let cell = Self::cell_size(spotting.width());
        if cell == 0 {
            return Vec::new();
        }
        let contours = contour::find_contours(spotting);
        let total = contours.len();

        let glyphs: Vec<GlyphCandidate> = contours
            .into_iter()
            .filter_map(|c| match self.accept(&c, cell) {
                Ok((row, col)) => {
                    let bbox = c.bounding_box();
                    Some(GlyphCandidate {
                        contour: c,
                        bbox,
                        row,
                        col,
                    })
                }
                Err(reason) => {
                    trace!(?reason, "Blob rejected");
                    None
                }
            })
            .collect();

        debug!(traced = total, accepted = glyphs.len(), "Glyphs segmented");
        glyphs
    }

    fn accept(&self, contour: &Contour, cell: u32) -> Result<(usize, usize), Rejection> {
        let cell_area = cell * cell;
        let area = contour.area();
        if area < (cell_area / 50) as f64 || area > (cell_area / 2) as f64 {
            return Err(Rejection::Area);
        }

        let bbox = contour.bounding_box();
        if bbox.width > cell || bbox.height > cell {
            return Err(Rejection::TooLarge);
        }
        if bbox.height < cell / 3 && bbox.width < cell / 3 {
            return Err(Rejection::TooSmall);
        }

        let low = cell / self.margin_divisor;
        let high = cell * (self.margin_divisor - 1) / self.margin_divisor;
        let (rel_x, rel_y) = (bbox.x % cell, bbox.y % cell);
        if rel_x < low || rel_x > high || rel_y < low || rel_y > high {
            return Err(Rejection::CellMargin);
        }

        let last = GRID_SIDE - 1;
        let col = ((bbox.x as f64 + bbox.width as f64 / 2.0) / cell as f64) as usize;
        let row = ((bbox.y as f64 + bbox.height as f64 / 2.0) / cell as f64) as usize;
        Ok((row.min(last), col.min(last)))
    }
}
