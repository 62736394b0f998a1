// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition pipeline: drives the stages in order over one photo and keeps
// every intermediate result for inspection.
//
//   original ─> border image ─> grid contour ─> corners ─> rectified
//            ─> spotting image ─> classification image ─> glyphs ─> grid

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gridlens_core::config::ReaderConfig;
use gridlens_core::error::{FailureReason, GridlensError, Result};
use gridlens_core::grid::Grid;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::border::BorderEnhancer;
use crate::buffer::PixelBuffer;
use crate::classify::{ClassifierModel, GlyphClassifier};
use crate::contour::{BoundingBox, Contour};
use crate::digits::DigitEnhancer;
use crate::homography::Homography;
use crate::locate::GridContourLocator;
use crate::rectify::{CornerSet, PerspectiveRectifier};
use crate::segment::{DigitSegmenter, GlyphCandidate};

/// How far a run has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Initialized,
    BorderDetected,
    ContourFound,
    Rectified,
    DigitsSegmented,
    Complete,
    Failed(FailureReason),
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Complete | PipelineStage::Failed(_))
    }
}

/// The classification of one glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellReading {
    pub row: usize,
    pub col: usize,
    pub label: u8,
    pub distance: f32,
    pub bbox: BoundingBox,
}

/// Every intermediate result of a run. Fields are filled in stage order and
/// stay populated after a failure, up to the stage that failed.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub stage: PipelineStage,
    /// Input after resizing to the intermediate height.
    pub original: PixelBuffer,
    pub border_image: Option<PixelBuffer>,
    pub grid_contour: Option<Contour>,
    pub corners: Option<CornerSet>,
    pub homography: Option<Homography>,
    pub rectified: Option<PixelBuffer>,
    pub spotting_image: Option<PixelBuffer>,
    pub classification_image: Option<PixelBuffer>,
    pub glyphs: Vec<GlyphCandidate>,
    pub readings: Vec<CellReading>,
    pub grid: Option<Grid>,
}

/// Machine-readable run summary written next to the artifact images.
#[derive(Debug, Serialize)]
struct ArtifactSummary<'a> {
    stage: PipelineStage,
    boundary: Option<Vec<[i32; 2]>>,
    corners: Option<[[i32; 2]; 4]>,
    glyph_count: usize,
    readings: &'a [CellReading],
    grid: Option<String>,
}

impl PipelineState {
    fn new(original: PixelBuffer) -> Self {
        Self {
            stage: PipelineStage::Initialized,
            original,
            border_image: None,
            grid_contour: None,
            corners: None,
            homography: None,
            rectified: None,
            spotting_image: None,
            classification_image: None,
            glyphs: Vec::new(),
            readings: Vec::new(),
            grid: None,
        }
    }

    /// The reason the run failed, if it did.
    pub fn failure(&self) -> Option<FailureReason> {
        match self.stage {
            PipelineStage::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Write every populated buffer as a numbered PNG plus `summary.json`
    /// into `dir`. The directory is created when missing and must be empty.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn save_artifacts(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if dir.exists() {
            if std::fs::read_dir(dir)?.next().is_some() {
                return Err(GridlensError::Io(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("artifact directory {} is not empty", dir.display()),
                )));
            }
        } else {
            std::fs::create_dir_all(dir)?;
        }

        let buffers = [
            ("01_original.png", Some(&self.original)),
            ("02_border.png", self.border_image.as_ref()),
            ("03_rectified.png", self.rectified.as_ref()),
            ("04_spotting.png", self.spotting_image.as_ref()),
            ("05_classification.png", self.classification_image.as_ref()),
        ];
        let mut written = Vec::new();
        for (name, buffer) in buffers {
            if let Some(buffer) = buffer {
                let path = dir.join(name);
                buffer.save(&path)?;
                written.push(path);
            }
        }

        let summary = ArtifactSummary {
            stage: self.stage,
            boundary: self
                .grid_contour
                .as_ref()
                .map(|c| c.points().iter().map(|p| [p.x, p.y]).collect()),
            corners: self.corners.map(|c| c.points().map(|p| [p.x, p.y])),
            glyph_count: self.glyphs.len(),
            readings: &self.readings,
            grid: self.grid.map(|g| g.serialize()),
        };
        let path = dir.join("summary.json");
        std::fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
        written.push(path);

        info!(files = written.len(), "Artifacts saved");
        Ok(written)
    }
}

/// One recognition run over one photo.
///
/// `read` executes the stages at most once; a second call reports
/// `GridlensError::PipelineSpent` and leaves the state untouched.
#[derive(Debug)]
pub struct RecognitionPipeline {
    config: ReaderConfig,
    classifier: GlyphClassifier,
    state: PipelineState,
}

impl RecognitionPipeline {
    // -- Construction ---------------------------------------------------------

    /// Prepare a run. The image is resized to the configured intermediate
    /// height here.
    #[instrument(skip(image, model, config), fields(w = image.width(), h = image.height()))]
    pub fn new(
        image: PixelBuffer,
        model: Arc<ClassifierModel>,
        config: ReaderConfig,
    ) -> Result<Self> {
        config.validate()?;
        let classifier = GlyphClassifier::new(model, config.thumbnail_side)?;
        if image.width() == 0 || image.height() == 0 {
            return Err(GridlensError::Decode("image has no pixels".into()));
        }
        let original = image.resize_to_height(config.intermediate_height);
        debug!(
            w = original.width(),
            h = original.height(),
            "Pipeline initialised"
        );
        Ok(Self {
            config,
            classifier,
            state: PipelineState::new(original),
        })
    }

    /// Decode encoded image bytes and prepare a run.
    pub fn from_bytes(
        data: &[u8],
        model: Arc<ClassifierModel>,
        config: ReaderConfig,
    ) -> Result<Self> {
        Self::new(PixelBuffer::from_bytes(data)?, model, config)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn stage(&self) -> PipelineStage {
        self.state.stage
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn into_state(self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    // -- Execution ------------------------------------------------------------

    /// Run every stage and return the recognised grid.
    #[instrument(skip(self))]
    pub fn read(&mut self) -> Result<Grid> {
        if self.state.stage != PipelineStage::Initialized {
            warn!(stage = ?self.state.stage, "Pipeline already executed");
            return Err(GridlensError::PipelineSpent);
        }
        match self.run() {
            Ok(grid) => {
                self.state.stage = PipelineStage::Complete;
                info!(
                    digits = 81 - grid.blank_count(),
                    grid = %grid,
                    "Grid recognised"
                );
                Ok(grid)
            }
            Err(GridlensError::Recognition(reason)) => {
                self.state.stage = PipelineStage::Failed(reason);
                warn!(%reason, "Recognition failed");
                Err(reason.into())
            }
            Err(err) => {
                warn!(stage = ?self.state.stage, error = %err, "Pipeline aborted");
                Err(err)
            }
        }
    }

    fn run(&mut self) -> Result<Grid> {
        let config = &self.config;
        let state = &mut self.state;

        let border = BorderEnhancer::new(config).enhance(&state.original);
        let located = GridContourLocator::new(config).locate(&border);
        state.border_image = Some(border);
        state.stage = PipelineStage::BorderDetected;

        let quad = located?;
        let corners = CornerSet::from_quad(&quad);
        state.grid_contour = Some(quad);
        let corners = corners?;
        state.corners = Some(corners);
        state.stage = PipelineStage::ContourFound;

        let rectification =
            PerspectiveRectifier::new(config.rectified_side()).rectify(&state.original, &corners)?;
        state.homography = Some(rectification.homography);
        let rectified = state.rectified.insert(rectification.image);
        state.stage = PipelineStage::Rectified;

        let enhancer = DigitEnhancer::new(config);
        let spotting = enhancer.spotting_image(rectified);
        let glyphs = DigitSegmenter::new(config).segment(&spotting);
        let ocr = state
            .classification_image
            .insert(enhancer.classification_image(&spotting));
        state.spotting_image = Some(spotting);
        state.glyphs = glyphs;
        state.stage = PipelineStage::DigitsSegmented;

        let mut grid = Grid::empty();
        for glyph in &state.glyphs {
            let crop = ocr.crop(&glyph.bbox);
            let found = self.classifier.recognize(&crop, glyph.row, glyph.col)?;
            state.readings.push(CellReading {
                row: glyph.row,
                col: glyph.col,
                label: found.label,
                distance: found.distance,
                bbox: glyph.bbox,
            });
            if grid.get(glyph.row, glyph.col) != 0 {
                debug!(row = glyph.row, col = glyph.col, "Cell read twice, keeping the later glyph");
            }
            grid.set(glyph.row, glyph.col, found.label)?;
        }
        state.grid = Some(grid);
        Ok(grid)
    }
}
