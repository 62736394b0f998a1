// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Digit enhancement on the rectified grid.

use gridlens_core::config::ReaderConfig;
use tracing::{debug, instrument};

use crate::buffer::PixelBuffer;
use crate::filters::{self, ThresholdPolarity};

/// Builds the two binary images the digit stages work on.
///
/// The spotting image has ink as foreground (255) on a black background and
/// is used to find glyphs. The classification image is the spotting image
/// after a morphological opening, which strips specks and hairline noise
/// before glyphs are cropped and classified.
#[derive(Debug, Clone, Copy)]
pub struct DigitEnhancer {
    kernel_size: u32,
    sigma: f32,
    block_size: u32,
    bias: i32,
}

impl DigitEnhancer {
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            kernel_size: config.kernel_size,
            sigma: config.digit_sigma,
            block_size: config.threshold_block_size,
            bias: config.threshold_bias,
        }
    }

    /// Smooth and apply the inverted adaptive threshold.
    #[instrument(skip(self, rectified), fields(side = rectified.width()))]
    pub fn spotting_image(&self, rectified: &PixelBuffer) -> PixelBuffer {
        let blurred = filters::gaussian_blur(rectified.as_gray(), self.kernel_size, self.sigma);
        let binary = filters::adaptive_threshold(
            &blurred,
            self.block_size,
            self.bias,
            ThresholdPolarity::Inverted,
        );
        debug!(sigma = self.sigma, "Digit spotting image ready");
        PixelBuffer::from_gray(binary)
    }

    /// Open the spotting image with a cross-shaped kernel.
    pub fn classification_image(&self, spotting: &PixelBuffer) -> PixelBuffer {
        PixelBuffer::from_gray(filters::open_cross(spotting.as_gray(), self.kernel_size))
    }
}
