// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// gridlens-vision: the image stages of the puzzle reader and the pipeline
// that drives them.
//
// Stages, in order:
// - `BorderEnhancer`: blur, dilate and threshold so grid lines stand out.
// - `GridContourLocator`: pick the quadrilateral outlining the grid.
// - `CornerSet` / `PerspectiveRectifier`: label corners, warp to a square.
// - `DigitEnhancer`: binary images for glyph spotting and classification.
// - `DigitSegmenter`: keep glyph-sized blobs and map them to cells.
// - `GlyphClassifier`: nearest-neighbour digit recognition.

pub mod border;
pub mod buffer;
pub mod classify;
pub mod contour;
pub mod digits;
pub mod filters;
pub mod homography;
pub mod locate;
pub mod pipeline;
pub mod rectify;
pub mod segment;

pub use border::BorderEnhancer;
pub use buffer::PixelBuffer;
pub use classify::{ClassifierModel, GlyphClassifier, GlyphMatch};
pub use contour::{BoundingBox, Contour};
pub use digits::DigitEnhancer;
pub use homography::Homography;
pub use locate::GridContourLocator;
pub use pipeline::{CellReading, PipelineStage, PipelineState, RecognitionPipeline};
pub use rectify::{Corner, CornerSet, PerspectiveRectifier, Rectification};
pub use segment::{DigitSegmenter, GlyphCandidate};
