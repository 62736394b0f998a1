// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for gridlens.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a recognition run stopped before producing a grid.
///
/// These are terminal for a single run. They are kept separate from
/// [`GridlensError`] so the pipeline state can record them by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FailureReason {
    /// No admissible quadrilateral was found in the border image.
    #[error("no puzzle boundary found")]
    BoundaryNotFound,

    /// Two boundary corners fell into the same quadrant around the centroid.
    #[error("ambiguous boundary corners")]
    AmbiguousCorners,

    /// A segmented glyph matched the sentinel class of the model.
    #[error("unrecognized glyph in cell ({row}, {col})")]
    GlyphUnrecognized { row: usize, col: usize },
}

/// Top-level error type for all gridlens operations.
#[derive(Debug, Error)]
pub enum GridlensError {
    // -- Input --
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Recognition --
    #[error("recognition failed: {0}")]
    Recognition(#[from] FailureReason),

    #[error("pipeline has already been executed")]
    PipelineSpent,

    // -- Model / configuration --
    #[error("malformed classifier model: {0}")]
    ModelFormat(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    // -- Storage --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GridlensError {
    /// The recognition failure carried by this error, if any.
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            Self::Recognition(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GridlensError>;
