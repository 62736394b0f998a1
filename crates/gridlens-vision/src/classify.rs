// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyph classification: a labelled sample set and a 1-nearest-neighbour
// classifier over downscaled glyph thumbnails.

use std::path::Path;
use std::sync::Arc;

use gridlens_core::error::{FailureReason, GridlensError, Result};
use image::imageops::{self, FilterType};
use tracing::{debug, info, instrument};

use crate::buffer::PixelBuffer;

/// Labelled feature vectors used as the nearest-neighbour reference set.
///
/// Immutable once built; share it across pipelines with `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierModel {
    feature_len: usize,
    /// Row-major `len() x feature_len` matrix.
    samples: Vec<f32>,
    labels: Vec<u8>,
}

impl ClassifierModel {
    // -- Construction ---------------------------------------------------------

    /// Build from `(label, features)` pairs.
    pub fn from_samples(feature_len: usize, samples: Vec<(u8, Vec<f32>)>) -> Result<Self> {
        if feature_len == 0 {
            return Err(model_err("feature length must be positive".into()));
        }
        if samples.is_empty() {
            return Err(model_err("model has no samples".into()));
        }
        let mut flat = Vec::with_capacity(samples.len() * feature_len);
        let mut labels = Vec::with_capacity(samples.len());
        for (idx, (label, features)) in samples.into_iter().enumerate() {
            if label > 9 {
                return Err(model_err(format!("sample {idx} has label {label}")));
            }
            if features.len() != feature_len {
                return Err(model_err(format!(
                    "sample {idx} has {} features, expected {feature_len}",
                    features.len()
                )));
            }
            flat.extend(features);
            labels.push(label);
        }
        Ok(Self {
            feature_len,
            samples: flat,
            labels,
        })
    }

    /// Parse the whitespace-separated text form.
    ///
    /// `samples` holds N rows of `feature_len` floats, `responses` holds N
    /// labels (written as floats, e.g. `7.0`). Line breaks carry no meaning;
    /// only the token counts must agree.
    pub fn from_text(samples: &str, responses: &str, feature_len: usize) -> Result<Self> {
        let labels = responses
            .split_whitespace()
            .enumerate()
            .map(|(idx, tok)| parse_label(idx, tok))
            .collect::<Result<Vec<u8>>>()?;
        let values = samples
            .split_whitespace()
            .enumerate()
            .map(|(idx, tok)| {
                tok.parse::<f32>()
                    .map_err(|_| model_err(format!("sample value {idx} is not a number: {tok:?}")))
            })
            .collect::<Result<Vec<f32>>>()?;

        if values.len() != labels.len() * feature_len {
            return Err(model_err(format!(
                "{} responses need {} sample values, found {}",
                labels.len(),
                labels.len() * feature_len,
                values.len()
            )));
        }

        let rows = values
            .chunks(feature_len.max(1))
            .map(<[f32]>::to_vec)
            .zip(labels)
            .map(|(features, label)| (label, features))
            .collect();
        Self::from_samples(feature_len, rows)
    }

    /// Load the samples and responses files.
    #[instrument(skip_all, fields(samples = %samples.as_ref().display(), responses = %responses.as_ref().display()))]
    pub fn load(
        samples: impl AsRef<Path>,
        responses: impl AsRef<Path>,
        feature_len: usize,
    ) -> Result<Self> {
        let samples_text = std::fs::read_to_string(samples.as_ref())?;
        let responses_text = std::fs::read_to_string(responses.as_ref())?;
        let model = Self::from_text(&samples_text, &responses_text, feature_len)?;
        info!(samples = model.len(), feature_len, "Classifier model loaded");
        Ok(model)
    }

    /// Text form accepted by `from_text`: `(samples, responses)`, one sample
    /// per line.
    pub fn to_text(&self) -> (String, String) {
        let mut samples = String::new();
        for row in self.samples.chunks(self.feature_len) {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            samples.push_str(&line.join(" "));
            samples.push('\n');
        }
        let mut responses = String::new();
        for label in &self.labels {
            responses.push_str(&format!("{label}.0\n"));
        }
        (samples, responses)
    }

    // -- Queries --------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn feature_len(&self) -> usize {
        self.feature_len
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Label and squared Euclidean distance of the closest sample. Ties go
    /// to the sample stored first.
    pub fn nearest(&self, features: &[f32]) -> Option<(u8, f32)> {
        if features.len() != self.feature_len {
            return None;
        }
        let mut best: Option<(u8, f32)> = None;
        for (row, &label) in self.samples.chunks(self.feature_len).zip(&self.labels) {
            let dist: f32 = row
                .iter()
                .zip(features)
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            match best {
                Some((_, d)) if dist >= d => {}
                _ => best = Some((label, dist)),
            }
        }
        best
    }
}

fn model_err(msg: String) -> GridlensError {
    GridlensError::ModelFormat(msg)
}

fn parse_label(idx: usize, tok: &str) -> Result<u8> {
    let value: f32 = tok
        .parse()
        .map_err(|_| model_err(format!("response {idx} is not a number: {tok:?}")))?;
    let rounded = value.round();
    if (value - rounded).abs() > 1e-3 || !(0.0..=9.0).contains(&rounded) {
        return Err(model_err(format!("response {idx} is not a label in 0..=9: {tok}")));
    }
    Ok(rounded as u8)
}

/// Outcome of classifying one glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMatch {
    pub label: u8,
    /// Squared Euclidean distance to the matched sample.
    pub distance: f32,
}

/// 1-nearest-neighbour glyph classifier.
#[derive(Debug, Clone)]
pub struct GlyphClassifier {
    model: Arc<ClassifierModel>,
    thumbnail_side: u32,
}

impl GlyphClassifier {
    /// The model's feature length must equal `thumbnail_side^2`.
    pub fn new(model: Arc<ClassifierModel>, thumbnail_side: u32) -> Result<Self> {
        let side = thumbnail_side as usize;
        let expected = side * side;
        if model.feature_len() != expected {
            return Err(model_err(format!(
                "model has {} features per sample, a {thumbnail_side}x{thumbnail_side} thumbnail has {expected}",
                model.feature_len()
            )));
        }
        Ok(Self {
            model,
            thumbnail_side,
        })
    }

    pub fn model(&self) -> &Arc<ClassifierModel> {
        &self.model
    }

    /// Downscale a glyph crop to the thumbnail side and flatten its raw
    /// intensities row by row.
    pub fn features(&self, crop: &PixelBuffer) -> Vec<f32> {
        thumbnail_features(crop, self.thumbnail_side)
    }

    /// Nearest sample for a glyph crop.
    pub fn classify(&self, crop: &PixelBuffer) -> Option<GlyphMatch> {
        let features = self.features(crop);
        self.model
            .nearest(&features)
            .map(|(label, distance)| GlyphMatch { label, distance })
    }

    /// Classify the glyph of cell `(row, col)`. A nearest label of 0 means
    /// the glyph is not a digit and fails the cell.
    pub fn recognize(
        &self,
        crop: &PixelBuffer,
        row: usize,
        col: usize,
    ) -> std::result::Result<GlyphMatch, FailureReason> {
        match self.classify(crop) {
            Some(m) if m.label != 0 => {
                debug!(row, col, label = m.label, distance = m.distance, "Glyph classified");
                Ok(m)
            }
            _ => {
                debug!(row, col, "Glyph not recognised");
                Err(FailureReason::GlyphUnrecognized { row, col })
            }
        }
    }
}

/// Feature vector of a crop at the given thumbnail side.
pub fn thumbnail_features(crop: &PixelBuffer, side: u32) -> Vec<f32> {
    let thumb = imageops::resize(crop.as_gray(), side, side, FilterType::Triangle);
    thumb.as_raw().iter().map(|&v| v as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn vec_of(value: f32) -> Vec<f32> {
        vec![value; 4]
    }

    #[test]
    fn nearest_neighbour_picks_closest_label() {
        let model = ClassifierModel::from_samples(
            4,
            vec![(1, vec_of(0.0)), (2, vec_of(100.0)), (3, vec_of(200.0))],
        )
        .unwrap();
        assert_eq!(model.nearest(&vec_of(90.0)).unwrap().0, 2);
        assert_eq!(model.nearest(&vec_of(180.0)).unwrap().0, 3);
        let (label, dist) = model.nearest(&vec_of(10.0)).unwrap();
        assert_eq!(label, 1);
        assert!((dist - 400.0).abs() < 1e-3);
    }

    #[test]
    fn ties_go_to_first_sample() {
        let model =
            ClassifierModel::from_samples(4, vec![(5, vec_of(0.0)), (6, vec_of(20.0))]).unwrap();
        assert_eq!(model.nearest(&vec_of(10.0)).unwrap().0, 5);
    }

    #[test]
    fn text_round_trip() {
        let model = ClassifierModel::from_samples(
            4,
            vec![(7, vec![1.0, 2.5, 0.0, 255.0]), (0, vec_of(3.0))],
        )
        .unwrap();
        let (samples, responses) = model.to_text();
        let back = ClassifierModel::from_text(&samples, &responses, 4).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn text_count_mismatch_is_rejected() {
        let err = ClassifierModel::from_text("1 2 3 4 5", "1.0", 4).unwrap_err();
        assert!(matches!(err, GridlensError::ModelFormat(_)));
    }

    #[test]
    fn bad_labels_are_rejected() {
        for responses in ["12.0", "3.5", "seven", "-1"] {
            let err = ClassifierModel::from_text("1 2 3 4", responses, 4).unwrap_err();
            assert!(matches!(err, GridlensError::ModelFormat(_)), "{responses}");
        }
    }

    #[test]
    fn empty_model_is_rejected() {
        assert!(ClassifierModel::from_text("", "", 100).is_err());
    }

    #[test]
    fn load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let samples = dir.path().join("samples.data");
        let responses = dir.path().join("responses.data");
        std::fs::write(&samples, "0 0 0 0\n9 9 9 9\n").unwrap();
        std::fs::write(&responses, "4.0\n8.0\n").unwrap();
        let model = ClassifierModel::load(&samples, &responses, 4).unwrap();
        assert_eq!(model.labels(), &[4, 8]);
    }

    #[test]
    fn classifier_requires_matching_feature_length() {
        let model = Arc::new(ClassifierModel::from_samples(4, vec![(1, vec_of(0.0))]).unwrap());
        assert!(GlyphClassifier::new(model.clone(), 10).is_err());
        assert!(GlyphClassifier::new(model.clone(), 2).is_ok());
        // Side squared does not fit a u32.
        assert!(matches!(
            GlyphClassifier::new(model, 70000),
            Err(GridlensError::ModelFormat(_))
        ));
    }

    #[test]
    fn classification_is_deterministic_and_zero_label_fails_cell() {
        let bright = PixelBuffer::from_gray(GrayImage::from_pixel(8, 12, Luma([255])));
        let dark = PixelBuffer::from_gray(GrayImage::from_pixel(8, 12, Luma([0])));
        let model = Arc::new(
            ClassifierModel::from_samples(4, vec![(9, vec![255.0; 4]), (0, vec![0.0; 4])])
                .unwrap(),
        );
        let classifier = GlyphClassifier::new(model, 2).unwrap();

        let first = classifier.classify(&bright).unwrap();
        for _ in 0..5 {
            assert_eq!(classifier.classify(&bright).unwrap(), first);
        }
        assert_eq!(classifier.recognize(&bright, 1, 2).unwrap().label, 9);
        assert_eq!(
            classifier.recognize(&dark, 3, 4),
            Err(FailureReason::GlyphUnrecognized { row: 3, col: 4 })
        );
    }
}
