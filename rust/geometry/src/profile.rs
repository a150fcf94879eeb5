// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D ground-plane profiles and their triangulation

use crate::error::{Error, Result};
use crate::shape::{circle_contour, ensure_ccw, ensure_cw, rect_contour};
use nalgebra::Point2;

/// 2D Profile with optional holes
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
    /// Holes (clockwise)
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Profile2D {
    /// Create a new profile, normalizing the outer boundary to counter-clockwise
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer: ensure_ccw(&outer),
            holes: Vec::new(),
        }
    }

    /// Add a hole to the profile (stored clockwise)
    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        self.holes.push(ensure_cw(&hole));
    }

    /// Axis-aligned rectangle centered on `center`
    pub fn rectangle(center: Point2<f64>, width: f64, length: f64) -> Self {
        Self::new(rect_contour(center, width, length))
    }

    /// Disk of `radius`, or an annulus when `inner_radius` is given
    pub fn circle(center: Point2<f64>, radius: f64, inner_radius: Option<f64>, segments: usize) -> Self {
        let mut profile = Self::new(circle_contour(center, radius, segments));
        if let Some(inner) = inner_radius.filter(|r| *r > 0.0 && *r < radius) {
            profile.add_hole(circle_contour(center, inner, segments));
        }
        profile
    }

    /// Triangulate the profile using earcutr
    /// Returns triangle indices into the flattened vertex array (outer, then holes)
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "Profile must have at least 3 vertices".to_string(),
            ));
        }

        let mut vertices = Vec::with_capacity(
            (self.outer.len() + self.holes.iter().map(|h| h.len()).sum::<usize>()) * 2,
        );

        for p in &self.outer {
            vertices.push(p.x);
            vertices.push(p.y);
        }

        let mut hole_indices = Vec::with_capacity(self.holes.len());
        for hole in self.holes.iter().filter(|h| h.len() >= 3) {
            hole_indices.push(vertices.len() / 2);
            for p in hole {
                vertices.push(p.x);
                vertices.push(p.y);
            }
        }

        let indices = earcutr::earcut(&vertices, &hole_indices, 2)
            .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

        if indices.is_empty() {
            return Err(Error::TriangulationError(
                "Profile produced no triangles".to_string(),
            ));
        }

        let points = vertices
            .chunks_exact(2)
            .map(|xy| Point2::new(xy[0], xy[1]))
            .collect();

        Ok(Triangulation { points, indices })
    }
}

/// Triangulated profile result
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// All vertices (outer + holes)
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}
