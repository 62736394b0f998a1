// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Low-level grayscale filters shared by the border and digit passes.
//
// Smoothing goes through imageproc's separable filter with a fixed-size
// Gaussian kernel; dilation and opening use imageproc's morphology. The
// adaptive mean threshold is implemented here over an integral image so
// every pixel costs O(1).

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::separable_filter_equal;
use imageproc::morphology::{self, Mask};

/// Which side of the local threshold becomes foreground (255).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdPolarity {
    /// Pixels brighter than `mean - bias` become 255.
    Normal,
    /// Pixels brighter than `mean - bias` become 0.
    Inverted,
}

/// Normalised 1-D Gaussian weights for a kernel of `size` taps.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let size = size.max(1) as i32;
    let half = size / 2;
    let denom = 2.0 * sigma * sigma;
    let mut weights: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Gaussian blur with a square `size` x `size` kernel.
pub fn gaussian_blur(image: &GrayImage, size: u32, sigma: f32) -> GrayImage {
    let kernel = gaussian_kernel(size, sigma);
    separable_filter_equal(image, &kernel)
}

/// Grayscale dilation: every pixel becomes the maximum of its
/// `size` x `size` neighbourhood (clamped at the borders).
pub fn dilate_rect(image: &GrayImage, size: u32) -> GrayImage {
    let radius = (size / 2).min(u8::MAX as u32) as u8;
    morphology::grayscale_dilate(image, &Mask::square(radius))
}

/// Morphological opening (erode then dilate) with a 3x3 cross per radius
/// step. A 3x3 kernel corresponds to one step.
pub fn open_cross(image: &GrayImage, size: u32) -> GrayImage {
    let radius = (size / 2).clamp(1, u8::MAX as u32) as u8;
    morphology::open(image, Norm::L1, radius)
}

/// Adaptive mean threshold.
///
/// The local mean is taken over a `block_size` x `block_size` window centred
/// on the pixel (clamped at the image edges) and rounded to an integer. A
/// pixel is "bright" when its value exceeds `mean - bias`; `polarity` picks
/// whether bright pixels become 255 or 0.
pub fn adaptive_threshold(
    image: &GrayImage,
    block_size: u32,
    bias: i32,
    polarity: ThresholdPolarity,
) -> GrayImage {
    let (w, h) = image.dimensions();
    let integral = IntegralImage::new(image);
    let half = block_size / 2;
    let (bright, dark) = match polarity {
        ThresholdPolarity::Normal => (255u8, 0u8),
        ThresholdPolarity::Inverted => (0u8, 255u8),
    };

    GrayImage::from_fn(w, h, |x, y| {
        let mean = integral.region_mean(x, y, half).round() as i32;
        let pixel = image.get_pixel(x, y).0[0] as i32;
        if pixel > mean - bias {
            Luma([bright])
        } else {
            Luma([dark])
        }
    })
}

/// Summed-area table with one row and column of zero padding.
struct IntegralImage {
    sums: Vec<u64>,
    width: u32,
    height: u32,
}

impl IntegralImage {
    fn new(image: &GrayImage) -> Self {
        let (w, h) = image.dimensions();
        let stride = (w + 1) as usize;
        let mut sums = vec![0u64; stride * (h + 1) as usize];
        for y in 0..h {
            let mut row_sum = 0u64;
            for x in 0..w {
                row_sum += image.get_pixel(x, y).0[0] as u64;
                let idx = (y + 1) as usize * stride + (x + 1) as usize;
                sums[idx] = row_sum + sums[idx - stride];
            }
        }
        Self {
            sums,
            width: w,
            height: h,
        }
    }

    fn region_mean(&self, cx: u32, cy: u32, half: u32) -> f64 {
        let x0 = cx.saturating_sub(half);
        let y0 = cy.saturating_sub(half);
        let x1 = (cx + half).min(self.width - 1) + 1;
        let y1 = (cy + half).min(self.height - 1) + 1;
        let stride = (self.width + 1) as usize;
        let at = |x: u32, y: u32| self.sums[y as usize * stride + x as usize];

        let sum = at(x1, y1) + at(x0, y0) - at(x0, y1) - at(x1, y0);
        let count = ((x1 - x0) * (y1 - y0)) as f64;
        sum as f64 / count
    }
}
