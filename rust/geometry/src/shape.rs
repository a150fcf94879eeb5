// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ground-plane shape utilities
//!
//! Stateless helpers shared by every synthesizer: bounding boxes, edge
//! iteration, containment and winding. Points are `(x, z)` pairs stored in
//! `Point2`.

use nalgebra::{Point2, Vector2};
use std::f64::consts::TAU;

/// Minimum area threshold - polygons smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Compute the axis-aligned bounding box of a polygon
pub fn polygon_bounds(points: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;

    for p in points.iter().skip(1) {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    Some((min, max))
}

/// Iterate the edges of an implicitly closed polygon, closing segment included.
///
/// Yields nothing for fewer than two points.
pub fn polygon_edges(
    points: &[Point2<f64>],
) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
    let n = points.len();
    let count = if n < 2 { 0 } else { n };
    (0..count).map(move |i| (points[i], points[(i + 1) % n]))
}

/// Check if a point is inside a polygon using ray casting
pub fn point_in_polygon(point: &Point2<f64>, polygon: &[Point2<f64>]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = polygon.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// True when every point of `inner` lies inside `outer`
pub fn contour_inside(inner: &[Point2<f64>], outer: &[Point2<f64>]) -> bool {
    !inner.is_empty() && inner.iter().all(|p| point_in_polygon(p, outer))
}

/// Compute the signed area of a contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    polygon_edges(contour)
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum::<f64>()
        * 0.5
}

/// Check if a contour is valid (has area, not degenerate)
pub fn is_valid_contour(contour: &[Point2<f64>]) -> bool {
    contour.len() >= 3 && signed_area(contour).abs() > MIN_AREA_THRESHOLD
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if signed_area(contour) < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Ensure contour has clockwise winding (for holes)
pub fn ensure_cw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if signed_area(contour) > 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Drop consecutive points closer than `epsilon`, including the wrap-around pair
pub fn dedup_points(points: &[Point2<f64>], epsilon: f64) -> Vec<Point2<f64>> {
    let mut result: Vec<Point2<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if result.last().map_or(true, |last| (*p - *last).norm() >= epsilon) {
            result.push(*p);
        }
    }
    while result.len() > 1 {
        let (first, last) = (result[0], result[result.len() - 1]);
        if (first - last).norm() < epsilon {
            result.pop();
        } else {
            break;
        }
    }
    result
}

/// Counter-clockwise circle contour around `center`
pub fn circle_contour(center: Point2<f64>, radius: f64, segments: usize) -> Vec<Point2<f64>> {
    let segments = segments.max(3);
    (0..segments)
        .map(|i| {
            let angle = TAU * (i as f64) / (segments as f64);
            center + Vector2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Counter-clockwise axis-aligned rectangle contour (`width` along X, `length` along Z)
pub fn rect_contour(center: Point2<f64>, width: f64, length: f64) -> Vec<Point2<f64>> {
    let hw = width / 2.0;
    let hl = length / 2.0;
    vec![
        Point2::new(center.x - hw, center.y - hl),
        Point2::new(center.x + hw, center.y - hl),
        Point2::new(center.x + hw, center.y + hl),
        Point2::new(center.x - hw, center.y + hl),
    ]
}

/// Adaptive number of segments for a circle of `radius`
#[inline]
pub fn circle_segments(radius: f64) -> usize {
    let segments = (radius.sqrt() * 12.0).ceil() as usize;
    segments.clamp(12, 48)
}
