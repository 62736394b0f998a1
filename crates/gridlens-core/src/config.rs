// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reader configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GridlensError, Result};

/// Largest accepted glyph thumbnail side.
pub const MAX_THUMBNAIL_SIDE: u32 = 64;

/// Tuning knobs for a recognition run.
///
/// The defaults reproduce the behaviour the classifier sample set was
/// recorded with; changing the thumbnail side requires a matching model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Height the input is resized to before any stage runs (aspect kept).
    pub intermediate_height: u32,
    /// Side of the rectified square. `None` uses the intermediate height.
    pub rectified_size: Option<u32>,
    /// Side of the square smoothing and morphology kernels (odd).
    pub kernel_size: u32,
    /// Blur sigma for the border pass. `None` derives it from the kernel size.
    pub border_sigma: Option<f32>,
    /// Blur sigma for the digit pass.
    pub digit_sigma: f32,
    /// Neighbourhood side for the adaptive mean threshold (odd).
    pub threshold_block_size: u32,
    /// Constant subtracted from the local mean before thresholding.
    pub threshold_bias: i32,
    /// Boundary candidates must enclose at least `image area / divisor`.
    pub boundary_area_divisor: f64,
    /// Polygon simplification tolerance as a fraction of the perimeter.
    pub polygon_epsilon_ratio: f64,
    /// Boundary vertices this close to the frame are rejected.
    pub edge_margin: u32,
    /// Glyph boxes must start inside `[C / d, C * (d - 1) / d]` of their cell.
    pub cell_margin_divisor: u32,
    /// Side of the glyph thumbnail fed to the classifier.
    pub thumbnail_side: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            intermediate_height: 480,
            rectified_size: None,
            kernel_size: 3,
            border_sigma: None,
            digit_sigma: 3.0,
            threshold_block_size: 5,
            threshold_bias: 2,
            boundary_area_divisor: 5.0,
            polygon_epsilon_ratio: 0.01,
            edge_margin: 2,
            cell_margin_divisor: 10,
            thumbnail_side: 10,
        }
    }
}

impl ReaderConfig {
    /// Load a JSON configuration file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Parse a JSON configuration and validate it.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Same config with a different intermediate height.
    pub fn with_intermediate_height(mut self, height: u32) -> Self {
        self.intermediate_height = height;
        self
    }

    /// Side length S of the rectified square.
    pub fn rectified_side(&self) -> u32 {
        self.rectified_size.unwrap_or(self.intermediate_height)
    }

    /// Blur sigma for the border pass.
    ///
    /// Without an explicit value the sigma follows the kernel size:
    /// `0.3 * ((k - 1) * 0.5 - 1) + 0.8`, which is 0.8 for a 3x3 kernel.
    pub fn border_sigma(&self) -> f32 {
        self.border_sigma
            .unwrap_or_else(|| 0.3 * ((self.kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8)
    }

    /// Number of features per classifier sample.
    pub fn feature_len(&self) -> usize {
        let side = self.thumbnail_side as usize;
        side * side
    }

    /// Reject values the stages cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.intermediate_height < 9 {
            return Err(invalid("intermediate_height must be at least 9"));
        }
        if self.rectified_side() < 9 {
            return Err(invalid("rectified_size must be at least 9"));
        }
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(invalid("kernel_size must be odd"));
        }
        if self.threshold_block_size < 3 || self.threshold_block_size % 2 == 0 {
            return Err(invalid("threshold_block_size must be odd and at least 3"));
        }
        if !(self.digit_sigma > 0.0) || !(self.border_sigma() > 0.0) {
            return Err(invalid("blur sigmas must be positive"));
        }
        if !(self.boundary_area_divisor > 0.0) {
            return Err(invalid("boundary_area_divisor must be positive"));
        }
        if !(self.polygon_epsilon_ratio > 0.0 && self.polygon_epsilon_ratio < 1.0) {
            return Err(invalid("polygon_epsilon_ratio must be in (0, 1)"));
        }
        if self.cell_margin_divisor < 3 {
            return Err(invalid("cell_margin_divisor must be at least 3"));
        }
        if self.thumbnail_side == 0 || self.thumbnail_side > MAX_THUMBNAIL_SIDE {
            return Err(invalid("thumbnail_side must be between 1 and 64"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> GridlensError {
    GridlensError::InvalidConfig(msg.to_string())
}
