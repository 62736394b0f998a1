// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Border enhancement: turns a photo into a binary image in which the grid
// lines are dark and stand out against a bright background.

use gridlens_core::config::ReaderConfig;
use tracing::{debug, instrument};

use crate::buffer::PixelBuffer;
use crate::filters::{self, ThresholdPolarity};

/// Smooth, dilate, then adaptively threshold.
///
/// The dilation is a grayscale max filter, so thin dark strokes (pencil
/// marks, print noise) shrink while the heavy grid lines survive.
#[derive(Debug, Clone, Copy)]
pub struct BorderEnhancer {
    kernel_size: u32,
    sigma: f32,
    block_size: u32,
    bias: i32,
}

impl BorderEnhancer {
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            kernel_size: config.kernel_size,
            sigma: config.border_sigma(),
            block_size: config.threshold_block_size,
            bias: config.threshold_bias,
        }
    }

    /// Produce the binary border image (values 0 or 255, same dimensions).
    #[instrument(skip(self, image), fields(w = image.width(), h = image.height()))]
    pub fn enhance(&self, image: &PixelBuffer) -> PixelBuffer {
        let blurred = filters::gaussian_blur(image.as_gray(), self.kernel_size, self.sigma);
        let dilated = filters::dilate_rect(&blurred, self.kernel_size);
        let binary = filters::adaptive_threshold(
            &dilated,
            self.block_size,
            self.bias,
            ThresholdPolarity::Normal,
        );
        debug!(
            sigma = self.sigma,
            block = self.block_size,
            "Border image ready"
        );
        PixelBuffer::from_gray(binary)
    }
}
