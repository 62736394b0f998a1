// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the image stages of gridlens-vision, run over a
// synthetic 480x480 photo of a ruled grid.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{GrayImage, Luma};

use gridlens_core::ReaderConfig;
use gridlens_vision::{
    BorderEnhancer, CornerSet, DigitEnhancer, DigitSegmenter, GridContourLocator,
    PerspectiveRectifier, PixelBuffer,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Light page with a 9x9 ruling: heavy lines every third cell, a few dark
/// blocks standing in for printed digits.
fn ruled_page() -> PixelBuffer {
    let (origin, cell) = (30u32, 46u32);
    let img = GrayImage::from_fn(480, 480, |x, y| {
        let inside = |v: u32| v >= origin - 2 && v <= origin + 9 * cell + 2;
        let line = |v: u32| {
            (0..=9).any(|k| {
                let pos = origin + k * cell;
                let half = if k % 3 == 0 { 2 } else { 1 };
                v + half >= pos && v < pos + half
            })
        };
        let digit = |v: u32| v >= origin && (v - origin) % cell >= 16 && (v - origin) % cell < 30;
        if (line(x) && inside(y)) || (line(y) && inside(x)) {
            Luma([20u8])
        } else if inside(x) && inside(y) && digit(x) && digit(y) && (x / cell + y / cell) % 4 == 0 {
            Luma([40u8])
        } else {
            Luma([238u8])
        }
    });
    PixelBuffer::from_gray(img)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_border_and_locate(c: &mut Criterion) {
    let config = ReaderConfig::default();
    let page = ruled_page();
    let enhancer = BorderEnhancer::new(&config);
    let locator = GridContourLocator::new(&config);

    c.bench_function("border_enhance (480x480)", |b| {
        b.iter(|| black_box(enhancer.enhance(black_box(&page))));
    });

    let border = enhancer.enhance(&page);
    c.bench_function("locate_boundary (480x480)", |b| {
        b.iter(|| black_box(locator.locate(black_box(&border)).ok()));
    });
}

fn bench_rectify_and_segment(c: &mut Criterion) {
    let config = ReaderConfig::default();
    let page = ruled_page();
    let border = BorderEnhancer::new(&config).enhance(&page);
    let Ok(quad) = GridContourLocator::new(&config).locate(&border) else {
        return;
    };
    let Ok(corners) = CornerSet::from_quad(&quad) else {
        return;
    };
    let rectifier = PerspectiveRectifier::new(config.rectified_side());

    c.bench_function("rectify (480x480)", |b| {
        b.iter(|| black_box(rectifier.rectify(black_box(&page), &corners).ok()));
    });

    let Ok(rectified) = rectifier.rectify(&page, &corners) else {
        return;
    };
    let digits = DigitEnhancer::new(&config);
    let segmenter = DigitSegmenter::new(&config);
    c.bench_function("digit_segment (480x480)", |b| {
        b.iter(|| {
            let spotting = digits.spotting_image(black_box(&rectified.image));
            black_box(segmenter.segment(&spotting));
        });
    });
}

criterion_group!(benches, bench_border_and_locate, bench_rectify_and_segment);
criterion_main!(benches);
