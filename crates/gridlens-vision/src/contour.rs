// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contours: border tracing, polygon measures and closed-polygon
// simplification on top of imageproc's geometry helpers.

use imageproc::contours::{self, BorderType};
use imageproc::geometry;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;

/// Axis-aligned box in pixel coordinates (inclusive of both edge pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// An ordered closed sequence of integer points.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<Point<i32>>,
    hole: bool,
}

/// Trace every border in a binary image, outer borders and hole borders
/// alike. Non-zero pixels are foreground.
pub fn find_contours(binary: &PixelBuffer) -> Vec<Contour> {
    contours::find_contours::<i32>(binary.as_gray())
        .into_iter()
        .filter(|c| !c.points.is_empty())
        .map(|c| Contour {
            points: c.points,
            hole: matches!(c.border_type, BorderType::Hole),
        })
        .collect()
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self {
            points,
            hole: false,
        }
    }

    /// Build from `(x, y)` pairs.
    pub fn from_coords(coords: &[(i32, i32)]) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    pub fn points(&self) -> &[Point<i32>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when this contour traces the inside of a hole.
    pub fn is_hole(&self) -> bool {
        self.hole
    }

    // -- Measures -------------------------------------------------------------

    /// Length of the closed polyline.
    pub fn perimeter(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        geometry::arc_length(&self.points, true)
    }

    /// Enclosed area, independent of the winding direction.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        geometry::contour_area(&self.points).abs()
    }

    /// True for a simple convex polygon.
    ///
    /// All turns must go the same way (collinear steps are ignored) and the
    /// turns must add up to a single revolution, which rules out star shapes.
    pub fn is_convex(&self) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut sign = 0i64;
        let mut turning = 0.0f64;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let c = self.points[(i + 2) % n];
            let (ux, uy) = ((b.x - a.x) as i64, (b.y - a.y) as i64);
            let (vx, vy) = ((c.x - b.x) as i64, (c.y - b.y) as i64);
            let cross = ux * vy - uy * vx;
            if cross != 0 {
                if sign == 0 {
                    sign = cross.signum();
                } else if cross.signum() != sign {
                    return false;
                }
            }
            let dot = ux * vx + uy * vy;
            turning += (cross as f64).atan2(dot as f64);
        }
        sign != 0 && (turning.abs() - std::f64::consts::TAU).abs() < 1e-6
    }

    /// Smallest box containing every point.
    pub fn bounding_box(&self) -> BoundingBox {
        let Some(first) = self.points.first() else {
            return BoundingBox {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            };
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        BoundingBox {
            x: min_x.max(0) as u32,
            y: min_y.max(0) as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        }
    }

    // -- Simplification -------------------------------------------------------

    /// Douglas-Peucker simplification of the closed contour.
    ///
    /// The polygon is split at two mutually distant points so the start of
    /// the traced border does not end up as a spurious vertex. Every point
    /// dropped lies within `epsilon` of the resulting polygon edges.
    pub fn simplify(&self, epsilon: f64) -> Contour {
        let n = self.points.len();
        if n <= 3 || epsilon <= 0.0 {
            return self.clone();
        }
        let far = farthest_from(&self.points, 0);
        let start = farthest_from(&self.points, far);
        if self.points[start] == self.points[far] {
            return Contour {
                points: vec![self.points[start]],
                hole: self.hole,
            };
        }

        let rotated: Vec<Point<i32>> = (0..n).map(|i| self.points[(start + i) % n]).collect();
        let split = (far + n - start) % n;

        let first = &rotated[..=split];
        let mut second: Vec<Point<i32>> = rotated[split..].to_vec();
        second.push(rotated[0]);

        // Each open chain keeps both endpoints; drop the last so the shared
        // split points appear once.
        let mut out = Vec::new();
        for chain in [first, second.as_slice()] {
            let kept = geometry::approximate_polygon_dp(chain, epsilon, false);
            out.extend_from_slice(&kept[..kept.len().saturating_sub(1)]);
        }

        Contour {
            points: out,
            hole: self.hole,
        }
    }
}

fn farthest_from(points: &[Point<i32>], from: usize) -> usize {
    let origin = points[from];
    let mut best = from;
    let mut best_d = 0i64;
    for (i, p) in points.iter().enumerate() {
        let dx = (p.x - origin.x) as i64;
        let dy = (p.y - origin.y) as i64;
        let d = dx * dx + dy * dy;
        if d > best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn square_outline(x0: i32, y0: i32, side: i32) -> Contour {
        let mut pts = Vec::new();
        for x in x0..x0 + side {
            pts.push((x, y0));
        }
        for y in y0..y0 + side {
            pts.push((x0 + side, y));
        }
        for x in (x0 + 1..=x0 + side).rev() {
            pts.push((x, y0 + side));
        }
        for y in (y0 + 1..=y0 + side).rev() {
            pts.push((x0, y));
        }
        Contour::from_coords(&pts)
    }

    #[test]
    fn area_and_perimeter_of_square() {
        let c = Contour::from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        assert!((c.area() - 100.0).abs() < 1e-9);
        assert!((c.perimeter() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn area_ignores_winding() {
        let cw = Contour::from_coords(&[(0, 0), (8, 0), (8, 5), (0, 5)]);
        let ccw = Contour::from_coords(&[(0, 0), (0, 5), (8, 5), (8, 0)]);
        assert!((cw.area() - 40.0).abs() < 1e-9);
        assert!((ccw.area() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn convexity() {
        let square = Contour::from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        assert!(square.is_convex());

        let dart = Contour::from_coords(&[(0, 0), (10, 5), (0, 10), (4, 5)]);
        assert!(!dart.is_convex());

        let bowtie = Contour::from_coords(&[(0, 0), (10, 10), (10, 0), (0, 10)]);
        assert!(!bowtie.is_convex());
    }

    #[test]
    fn simplify_reduces_traced_square_to_corners() {
        let traced = square_outline(5, 7, 40);
        let simple = traced.simplify(0.01 * traced.perimeter());
        assert_eq!(simple.len(), 4);
        let mut corners: Vec<(i32, i32)> = simple.points().iter().map(|p| (p.x, p.y)).collect();
        corners.sort();
        assert_eq!(corners, vec![(5, 7), (5, 47), (45, 7), (45, 47)]);
        assert!(simple.is_convex());
    }

    #[test]
    fn simplify_keeps_points_within_tolerance() {
        let mut pts = Vec::new();
        for i in 0..60 {
            let t = i as f64 / 60.0 * std::f64::consts::TAU;
            pts.push(((50.0 + 30.0 * t.cos()) as i32, (50.0 + 30.0 * t.sin()) as i32));
        }
        let contour = Contour::from_coords(&pts);
        let eps = 2.0;
        let simple = contour.simplify(eps);
        assert!(simple.len() >= 6 && simple.len() < 60);
        let verts = simple.points();
        for p in contour.points() {
            let nearest = (0..verts.len())
                .map(|i| segment_distance(*p, verts[i], verts[(i + 1) % verts.len()]))
                .fold(f64::INFINITY, f64::min);
            assert!(nearest <= eps + 1e-9, "point {:?} is {} away", p, nearest);
        }
    }

    fn segment_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
        let (px, py) = (p.x as f64, p.y as f64);
        let (ax, ay) = (a.x as f64, a.y as f64);
        let (bx, by) = (b.x as f64, b.y as f64);
        let len2 = (bx - ax).powi(2) + (by - ay).powi(2);
        let t = if len2 == 0.0 {
            0.0
        } else {
            (((px - ax) * (bx - ax) + (py - ay) * (by - ay)) / len2).clamp(0.0, 1.0)
        };
        ((px - ax - t * (bx - ax)).powi(2) + (py - ay - t * (by - ay)).powi(2)).sqrt()
    }

    #[test]
    fn bounding_box_is_inclusive() {
        let c = Contour::from_coords(&[(3, 4), (9, 4), (9, 20), (3, 20)]);
        let bbox = c.bounding_box();
        assert_eq!(
            bbox,
            BoundingBox {
                x: 3,
                y: 4,
                width: 7,
                height: 17
            }
        );
    }

    #[test]
    fn find_contours_reports_outer_and_hole_borders() {
        // Dark frame on white: the white background has a hole.
        let img = GrayImage::from_fn(60, 60, |x, y| {
            let on_frame = (10..50).contains(&x)
                && (10..50).contains(&y)
                && !((14..46).contains(&x) && (14..46).contains(&y));
            if on_frame { Luma([0]) } else { Luma([255]) }
        });
        let contours = find_contours(&PixelBuffer::from_gray(img));
        assert!(contours.iter().any(|c| c.is_hole()));
        assert!(contours.iter().any(|c| !c.is_hole()));
    }
}
