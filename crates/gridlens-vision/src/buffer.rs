// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grayscale pixel buffer: decoding, resizing, cropping and PNG encoding of
// 8-bit single-channel images on top of the `image` crate.

use gridlens_core::error::GridlensError;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat};
use tracing::{debug, info, instrument};

use crate::contour::BoundingBox;

/// An 8-bit grayscale image.
///
/// Buffers are never mutated once a stage has produced them: every operation
/// borrows `self` and returns a new buffer.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    image: GrayImage,
}

impl PixelBuffer {
    // -- Construction ---------------------------------------------------------

    /// Decode raw encoded bytes (PNG, JPEG, ...) to grayscale.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, GridlensError> {
        let img = image::load_from_memory(data)
            .map_err(|err| GridlensError::Decode(err.to_string()))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self::from_dynamic(&img))
    }

    /// Load and decode an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, GridlensError> {
        let data = std::fs::read(path.as_ref())?;
        let buffer = Self::from_bytes(&data)?;
        info!(
            width = buffer.width(),
            height = buffer.height(),
            "Image loaded"
        );
        Ok(buffer)
    }

    /// Convert an already-decoded image to grayscale.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self {
            image: image.to_luma8(),
        }
    }

    /// Wrap a grayscale image.
    pub fn from_gray(image: GrayImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Total number of pixels.
    pub fn area(&self) -> u64 {
        self.image.width() as u64 * self.image.height() as u64
    }

    /// Sample at `(x, y)`. Panics when out of range.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.image.get_pixel(x, y).0[0]
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_gray(self) -> GrayImage {
        self.image
    }

    // -- Derived buffers ------------------------------------------------------

    /// Scale so the height equals `height`, keeping the aspect ratio.
    ///
    /// The new width is `width * height / old_height` in integer arithmetic.
    /// A buffer that already has the requested height is returned as a copy.
    #[instrument(skip(self), fields(from_w = self.width(), from_h = self.height()))]
    pub fn resize_to_height(&self, height: u32) -> Self {
        if self.height() == height || self.height() == 0 {
            return self.clone();
        }
        let width = ((self.width() as u64 * height as u64) / self.height() as u64).max(1) as u32;
        debug!(width, height, "Resizing to intermediate height");
        self.resize_exact(width, height)
    }

    /// Bilinear resize to exactly `width` x `height`.
    pub fn resize_exact(&self, width: u32, height: u32) -> Self {
        Self {
            image: imageops::resize(&self.image, width, height, FilterType::Triangle),
        }
    }

    /// Copy the pixels inside `bbox`, clamped to the image bounds.
    pub fn crop(&self, bbox: &BoundingBox) -> Self {
        let x = bbox.x.min(self.width().saturating_sub(1));
        let y = bbox.y.min(self.height().saturating_sub(1));
        let width = bbox.width.min(self.width() - x).max(1);
        let height = bbox.height.min(self.height() - y).max(1);
        Self {
            image: imageops::crop_imm(&self.image, x, y, width, height).to_image(),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, GridlensError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| GridlensError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the buffer to a file. The format follows the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), GridlensError> {
        self.image.save(path.as_ref()).map_err(|err| {
            GridlensError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}
