// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Green surface synthesis
//!
//! The visual green is a thin slab extruded from the course outline with the
//! cup and hazard cutters subtracted in order `[base, cup, hazard₁, …]`. The
//! collision surface is built separately as one flat, unperforated box.

use crate::csg::{calculate_normals, SolidSubtractor};
use crate::error::{Error, Result};
use crate::extrusion::extrude_vertical;
use crate::mesh::Mesh;
use crate::profile::Profile2D;
use crate::shape::{circle_segments, dedup_points, is_valid_contour, polygon_bounds, rect_contour};
use nalgebra::{Point2, Point3, Vector3};
use tracing::debug;

/// Outline the green slab is extruded from
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOutline {
    /// Closed boundary polygon in local `(x, z)`
    Polygon(Vec<Point2<f64>>),
    /// Axis-aligned rectangle (`width` along X, `length` along Z)
    Rectangle {
        center: Point2<f64>,
        width: f64,
        length: f64,
    },
}

impl SurfaceOutline {
    /// Ground-plane contour of the outline
    pub fn contour(&self) -> Result<Vec<Point2<f64>>> {
        match self {
            SurfaceOutline::Polygon(points) => {
                let points = dedup_points(points, 1e-9);
                if points.len() < 3 {
                    return Err(Error::InvalidProfile(format!(
                        "boundary has {} distinct points, need at least 3",
                        points.len()
                    )));
                }
                if !is_valid_contour(&points) {
                    return Err(Error::InvalidProfile(
                        "boundary polygon has no area".to_string(),
                    ));
                }
                Ok(points)
            }
            SurfaceOutline::Rectangle { center, width, length } => {
                if !(*width > 0.0 && *length > 0.0) {
                    return Err(Error::InvalidProfile(format!(
                        "rectangle outline {}x{} must be positive",
                        width, length
                    )));
                }
                Ok(rect_contour(*center, *width, *length))
            }
        }
    }
}

/// Solid carved out of the green
#[derive(Debug, Clone, PartialEq)]
pub enum Cutter {
    /// Vertical cylinder
    Circle { center: Point2<f64>, radius: f64 },
    /// Axis-aligned box
    Rect {
        center: Point2<f64>,
        width: f64,
        length: f64,
    },
    /// Vertical prism over an arbitrary footprint, holes included (fused
    /// compound hazards)
    Profile(Profile2D),
}

impl Cutter {
    fn profile(&self, segments: Option<usize>) -> Result<Profile2D> {
        match self {
            Cutter::Circle { center, radius } => {
                if !(*radius > 0.0) {
                    return Err(Error::InvalidProfile(format!(
                        "cutter radius {} must be positive",
                        radius
                    )));
                }
                let segments = segments.unwrap_or_else(|| circle_segments(*radius));
                Ok(Profile2D::circle(*center, *radius, None, segments))
            }
            Cutter::Rect { center, width, length } => {
                if !(*width > 0.0 && *length > 0.0) {
                    return Err(Error::InvalidProfile(format!(
                        "cutter {}x{} must be positive",
                        width, length
                    )));
                }
                Ok(Profile2D::rectangle(*center, *width, *length))
            }
            Cutter::Profile(profile) => {
                if !is_valid_contour(&profile.outer) {
                    return Err(Error::InvalidProfile(
                        "cutter footprint is degenerate".to_string(),
                    ));
                }
                Ok(profile.clone())
            }
        }
    }
}

/// Slab and cutter dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceParams {
    /// Local Y of the green top
    pub surface_height: f64,
    /// Slab thickness below the top
    pub slab_thickness: f64,
    /// How far cutters reach past the slab faces
    pub cutter_margin: f64,
    /// Fixed circle resolution; adaptive when `None`
    pub circle_segments: Option<usize>,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            surface_height: 0.0,
            slab_thickness: 0.2,
            cutter_margin: 0.1,
            circle_segments: None,
        }
    }
}

/// Builds the visual green by sequential subtraction
pub struct SurfaceSynthesizer<'a> {
    subtractor: &'a dyn SolidSubtractor,
    params: SurfaceParams,
}

impl<'a> SurfaceSynthesizer<'a> {
    pub fn new(subtractor: &'a dyn SolidSubtractor, params: SurfaceParams) -> Self {
        Self { subtractor, params }
    }

    pub fn params(&self) -> &SurfaceParams {
        &self.params
    }

    /// Extrude the base slab, subtract `hole` then each of `hazards`, then
    /// recompute normals.
    pub fn synthesize_surface(
        &self,
        outline: &SurfaceOutline,
        hole: &Cutter,
        hazards: &[Cutter],
    ) -> Result<Mesh> {
        if !(self.params.slab_thickness > 0.0) {
            return Err(Error::InvalidExtrusion(format!(
                "slab thickness {} must be positive",
                self.params.slab_thickness
            )));
        }

        let top = self.params.surface_height;
        let bottom = top - self.params.slab_thickness;

        let base = Profile2D::new(outline.contour()?);
        let mut solid = extrude_vertical(&base, bottom, top)?;

        for (i, cutter) in std::iter::once(hole).chain(hazards.iter()).enumerate() {
            let cutter_mesh = self.cutter_mesh(cutter)?;
            solid = self.subtractor.subtract(&solid, &cutter_mesh)?;
            debug!(cutter = i, triangles = solid.triangle_count(), "Subtracted cutter");
        }

        calculate_normals(&mut solid);
        Ok(solid)
    }

    /// Cutter solid reaching through the whole slab
    pub fn cutter_mesh(&self, cutter: &Cutter) -> Result<Mesh> {
        let margin = self.params.cutter_margin.max(0.0);
        let top = self.params.surface_height + margin;
        let bottom = self.params.surface_height - self.params.slab_thickness - margin;
        let profile = cutter.profile(self.params.circle_segments)?;
        extrude_vertical(&profile, bottom, top)
    }
}

/// Box collider spanning the outline bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlabExtents {
    pub center: Point3<f64>,
    pub half_extents: Vector3<f64>,
}

/// Flat, unperforated collision slab whose top sits at the surface height
pub fn flat_collision_slab(outline: &SurfaceOutline, params: &SurfaceParams) -> Result<SlabExtents> {
    let contour = outline.contour()?;
    let (min, max) = polygon_bounds(&contour)
        .ok_or_else(|| Error::InvalidProfile("outline has no points".to_string()))?;

    let half_thickness = params.slab_thickness / 2.0;
    Ok(SlabExtents {
        center: Point3::new(
            (min.x + max.x) / 2.0,
            params.surface_height - half_thickness,
            (min.y + max.y) / 2.0,
        ),
        half_extents: Vector3::new((max.x - min.x) / 2.0, half_thickness, (max.y - min.y) / 2.0),
    })
}
