// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared helpers for integration tests: a renderer for clean synthetic
// puzzle photos and a sample harvester that builds classifier models from
// rendered grids with known contents.

#![allow(dead_code)]

use std::sync::Arc;

use gridlens_core::ReaderConfig;
use gridlens_vision::classify::thumbnail_features;
use gridlens_vision::{ClassifierModel, PipelineStage, PixelBuffer, RecognitionPipeline};
use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{Interpolation, Projection, warp};

/// Cell value that renders a plus sign instead of a digit.
pub const MARK: u8 = 10;

pub const PUZZLE: [[u8; 9]; 9] = [
    [0, 0, 3, 1, 0, 7, 4, 0, 0],
    [0, 4, 0, 0, 0, 0, 0, 7, 0],
    [1, 0, 0, 0, 9, 0, 0, 0, 8],
    [9, 0, 0, 8, 0, 6, 0, 0, 2],
    [0, 0, 6, 0, 7, 0, 1, 0, 0],
    [4, 0, 0, 5, 0, 2, 0, 0, 6],
    [7, 0, 0, 0, 2, 0, 0, 0, 3],
    [0, 2, 0, 0, 0, 0, 0, 1, 0],
    [0, 0, 4, 9, 0, 3, 2, 0, 0],
];

pub const SOLVED: [[u8; 9]; 9] = [
    [7, 1, 8, 4, 9, 5, 3, 2, 6],
    [2, 5, 3, 8, 6, 1, 7, 4, 9],
    [9, 4, 6, 3, 7, 2, 1, 5, 8],
    [1, 2, 4, 9, 5, 3, 6, 8, 7],
    [3, 8, 7, 1, 4, 6, 2, 9, 5],
    [5, 6, 9, 2, 8, 7, 4, 3, 1],
    [6, 9, 5, 7, 3, 4, 8, 1, 2],
    [4, 7, 2, 5, 1, 8, 9, 6, 3],
    [8, 3, 1, 6, 2, 9, 5, 7, 4],
];

/// A valid solved grid different from `SOLVED`, used for training.
pub fn training_grid() -> [[u8; 9]; 9] {
    let mut rows = [[0u8; 9]; 9];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = ((r * 3 + r / 3 + c) % 9 + 1) as u8;
        }
    }
    rows
}

// -- Font -------------------------------------------------------------------

/// 5x7 block glyphs. All strokes are orthogonal and join edge to edge.
const FONT: [[&str; 7]; 11] = [
    ["#####", "#...#", "#...#", "#...#", "#...#", "#...#", "#####"],
    ["..#..", ".##..", "..#..", "..#..", "..#..", "..#..", ".###."],
    ["#####", "....#", "....#", "#####", "#....", "#....", "#####"],
    ["#####", "....#", "....#", "#####", "....#", "....#", "#####"],
    ["#...#", "#...#", "#...#", "#####", "....#", "....#", "....#"],
    ["#####", "#....", "#....", "#####", "....#", "....#", "#####"],
    ["#####", "#....", "#....", "#####", "#...#", "#...#", "#####"],
    ["#####", "....#", "....#", "....#", "....#", "....#", "....#"],
    ["#####", "#...#", "#...#", "#####", "#...#", "#...#", "#####"],
    ["#####", "#...#", "#...#", "#####", "....#", "....#", "#####"],
    ["..#..", "..#..", "..#..", "#####", "..#..", "..#..", "..#.."],
];

fn glyph_lit(value: u8, col: usize, row: usize) -> bool {
    FONT[value as usize][row].as_bytes()[col] == b'#'
}

// -- Renderer ---------------------------------------------------------------

const CANVAS: f64 = 480.0;
const GRID_ORIGIN: f64 = 30.0;
const GRID_SIZE: f64 = 420.0;
const PAPER: u8 = 240;
const INK: u8 = 20;
const FONT_BLOCK: f64 = 3.0;

/// Render a straight-on photo of a printed grid. `scale` multiplies every
/// dimension; 1 gives a 480x480 image.
pub fn render_grid(cells: &[[u8; 9]; 9], scale: u32) -> GrayImage {
    let s = scale as f64;
    let side = (CANVAS * s) as u32;
    let cell = GRID_SIZE / 9.0;
    let lines: Vec<(f64, f64)> = (0..=9)
        .map(|k| {
            let pos = (GRID_ORIGIN + k as f64 * cell) * s;
            let thickness = if k % 3 == 0 { 4.0 } else { 2.0 } * s;
            (pos, thickness)
        })
        .collect();
    let on_line = |v: f64| {
        lines.iter().any(|&(pos, t)| (v - pos).abs() < t / 2.0)
    };
    let in_grid = |v: f64| v > GRID_ORIGIN * s - 2.0 * s && v < (GRID_ORIGIN + GRID_SIZE) * s + 2.0 * s;

    let glyph_w = 5.0 * FONT_BLOCK * s;
    let glyph_h = 7.0 * FONT_BLOCK * s;

    GrayImage::from_fn(side, side, |x, y| {
        let (fx, fy) = (x as f64 + 0.5, y as f64 + 0.5);
        if (on_line(fx) && in_grid(fy)) || (on_line(fy) && in_grid(fx)) {
            return Luma([INK]);
        }
        let gx = (fx / s - GRID_ORIGIN) / cell;
        let gy = (fy / s - GRID_ORIGIN) / cell;
        if !(0.0..9.0).contains(&gx) || !(0.0..9.0).contains(&gy) {
            return Luma([PAPER]);
        }
        let (col, row) = (gx as usize, gy as usize);
        let value = cells[row][col];
        if value == 0 {
            return Luma([PAPER]);
        }
        let cx = (GRID_ORIGIN + (col as f64 + 0.5) * cell) * s;
        let cy = (GRID_ORIGIN + (row as f64 + 0.5) * cell) * s;
        let lx = fx - (cx - glyph_w / 2.0);
        let ly = fy - (cy - glyph_h / 2.0);
        if lx < 0.0 || ly < 0.0 || lx >= glyph_w || ly >= glyph_h {
            return Luma([PAPER]);
        }
        let block = FONT_BLOCK * s;
        if glyph_lit(value, (lx / block) as usize, (ly / block) as usize) {
            Luma([INK])
        } else {
            Luma([PAPER])
        }
    })
}

/// Render a grid, then warp the whole canvas so its corners land on `to`
/// (top-left, top-right, bottom-right, bottom-left), as if photographed at
/// an angle.
pub fn render_skewed(cells: &[[u8; 9]; 9], to: [(f32, f32); 4]) -> GrayImage {
    let flat = render_grid(cells, 1);
    let c = CANVAS as f32;
    let from = [(0.0, 0.0), (c, 0.0), (c, c), (0.0, c)];
    let projection = Projection::from_control_points(from, to).expect("skew projection");
    warp(&flat, &projection, Interpolation::Bilinear, Luma([PAPER]))
}

/// PNG bytes of a rendered grid.
pub fn render_png(cells: &[[u8; 9]; 9], scale: u32) -> Vec<u8> {
    PixelBuffer::from_gray(render_grid(cells, scale))
        .to_png_bytes()
        .expect("PNG encoding")
}

// -- Model harvesting ---------------------------------------------------------

/// A model that labels every glyph 1.
pub fn placeholder_model() -> Arc<ClassifierModel> {
    Arc::new(ClassifierModel::from_samples(100, vec![(1, vec![0.0; 100])]).expect("model"))
}

/// Run the pipeline over a rendered grid and collect one labelled sample per
/// segmented glyph, labelled with the value the grid holds at that cell
/// (`MARK` cells become label 0).
pub fn harvest(cells: &[[u8; 9]; 9]) -> Vec<(u8, Vec<f32>)> {
    let config = ReaderConfig::default();
    let image = PixelBuffer::from_gray(render_grid(cells, 1));
    let mut pipeline =
        RecognitionPipeline::new(image, placeholder_model(), config.clone()).expect("pipeline");
    pipeline.read().expect("placeholder read succeeds");
    assert_eq!(pipeline.stage(), PipelineStage::Complete);

    let state = pipeline.into_state();
    let ocr = state.classification_image.expect("classification image");
    let expected = cells.iter().flatten().filter(|&&v| v != 0).count();
    assert_eq!(state.glyphs.len(), expected, "one glyph per filled cell");

    state
        .glyphs
        .iter()
        .map(|g| {
            let value = cells[g.row][g.col];
            assert_ne!(value, 0, "glyph found in blank cell ({}, {})", g.row, g.col);
            let label = if value == MARK { 0 } else { value };
            (label, thumbnail_features(&ocr.crop(&g.bbox), config.thumbnail_side))
        })
        .collect()
}

/// Model trained on a rendered solved grid.
pub fn trained_model() -> Arc<ClassifierModel> {
    Arc::new(ClassifierModel::from_samples(100, harvest(&training_grid())).expect("model"))
}

/// Model trained on a solved grid plus a few plus-sign marks labelled 0.
pub fn trained_model_with_marks() -> Arc<ClassifierModel> {
    let mut samples = harvest(&training_grid());
    let mut marks = [[0u8; 9]; 9];
    marks[1][1] = MARK;
    marks[4][6] = MARK;
    marks[7][3] = MARK;
    samples.extend(harvest(&marks));
    Arc::new(ClassifierModel::from_samples(100, samples).expect("model"))
}
