// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion
// about what to change before trying again.

use crate::error::{FailureReason, GridlensError};

/// Who has to act for a retry to have a chance of succeeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A new photo is needed (framing, lighting, angle).
    Retake,
    /// A setting or input file must be fixed.
    ActionRequired,
    /// Retrying with the same inputs will fail the same way.
    Permanent,
}

/// A human-readable error with a plain English message and a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether a new pipeline run on a different photo may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `GridlensError` into a `HumanError`.
pub fn humanize_error(err: &GridlensError) -> HumanError {
    match err {
        GridlensError::Decode(detail) => HumanError {
            message: "The picture could not be opened.".into(),
            suggestion: format!("Save it as PNG or JPEG and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        GridlensError::Recognition(reason) => humanize_failure(*reason),

        GridlensError::ModelFormat(detail) => HumanError {
            message: "The digit model files are damaged.".into(),
            suggestion: format!("Check the samples and responses files. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        GridlensError::InvalidConfig(detail) => HumanError {
            message: "The configuration is not usable.".into(),
            suggestion: format!("Fix the configuration file. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        GridlensError::Io(io) => HumanError {
            message: "A file could not be read or written.".into(),
            suggestion: format!("Check the path and its permissions. ({io})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        GridlensError::Serialization(detail) => HumanError {
            message: "A settings file is not valid JSON.".into(),
            suggestion: format!("Fix the file syntax. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        GridlensError::ImageError(_) | GridlensError::InvalidGrid(_) | GridlensError::PipelineSpent => {
            HumanError {
                message: "Something went wrong while reading the puzzle.".into(),
                suggestion: format!("Please report this. ({err})"),
                retriable: false,
                severity: Severity::Permanent,
            }
        }
    }
}

fn humanize_failure(reason: FailureReason) -> HumanError {
    match reason {
        FailureReason::BoundaryNotFound => HumanError {
            message: "We couldn't find the puzzle in the picture.".into(),
            suggestion: "Take the photo so the whole grid is visible with a little space around it.".into(),
            retriable: true,
            severity: Severity::Retake,
        },
        FailureReason::AmbiguousCorners => HumanError {
            message: "The puzzle is too tilted to straighten.".into(),
            suggestion: "Hold the camera straight above the page and try again.".into(),
            retriable: true,
            severity: Severity::Retake,
        },
        FailureReason::GlyphUnrecognized { row, col } => HumanError {
            message: format!("We couldn't read the digit in row {}, column {}.", row + 1, col + 1),
            suggestion: "Make sure the page is evenly lit and in focus, then try again.".into(),
            retriable: true,
            severity: Severity::Retake,
        },
    }
}
