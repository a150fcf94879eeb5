// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh primitives
//!
//! Boxes, cylinders and flat fills centered on the local origin. Callers place
//! them with an isometry (walls, bumpers) or pass a center (fills).

use crate::error::Result;
use crate::extrusion::extrude_vertical;
use crate::mesh::Mesh;
use crate::profile::Profile2D;
use nalgebra::{Point2, Point3, Vector3};

/// Axis-aligned box centered on the origin
pub fn box_mesh(half_extents: &Vector3<f64>) -> Mesh {
    let h = half_extents;
    let corner = |sx: f64, sy: f64, sz: f64| Point3::new(sx * h.x, sy * h.y, sz * h.z);

    let mut mesh = Mesh::with_capacity(36, 36);
    let faces: [([Point3<f64>; 4], Vector3<f64>); 6] = [
        (
            [corner(1.0, -1.0, -1.0), corner(1.0, 1.0, -1.0), corner(1.0, 1.0, 1.0), corner(1.0, -1.0, 1.0)],
            Vector3::x(),
        ),
        (
            [corner(-1.0, -1.0, -1.0), corner(-1.0, -1.0, 1.0), corner(-1.0, 1.0, 1.0), corner(-1.0, 1.0, -1.0)],
            -Vector3::x(),
        ),
        (
            [corner(-1.0, 1.0, -1.0), corner(-1.0, 1.0, 1.0), corner(1.0, 1.0, 1.0), corner(1.0, 1.0, -1.0)],
            Vector3::y(),
        ),
        (
            [corner(-1.0, -1.0, -1.0), corner(1.0, -1.0, -1.0), corner(1.0, -1.0, 1.0), corner(-1.0, -1.0, 1.0)],
            -Vector3::y(),
        ),
        (
            [corner(-1.0, -1.0, 1.0), corner(1.0, -1.0, 1.0), corner(1.0, 1.0, 1.0), corner(-1.0, 1.0, 1.0)],
            Vector3::z(),
        ),
        (
            [corner(-1.0, -1.0, -1.0), corner(-1.0, 1.0, -1.0), corner(1.0, 1.0, -1.0), corner(1.0, -1.0, -1.0)],
            -Vector3::z(),
        ),
    ];

    for (corners, facing) in faces.iter() {
        mesh.add_facing_quad(*corners, facing);
    }
    mesh
}

/// Closed vertical cylinder centered on the origin
pub fn cylinder_mesh(radius: f64, half_height: f64, segments: usize) -> Result<Mesh> {
    let profile = Profile2D::circle(Point2::origin(), radius, None, segments);
    extrude_vertical(&profile, -half_height, half_height)
}

/// Upward-facing fill of `profile` at height `y`
pub fn fill_mesh(profile: &Profile2D, y: f64) -> Result<Mesh> {
    let tri = profile.triangulate()?;
    let mut mesh = Mesh::with_capacity(tri.points.len(), tri.indices.len());

    let up = Vector3::y();
    let base = mesh.vertex_count() as u32;
    for p in &tri.points {
        mesh.add_vertex(Point3::new(p.x, y, p.y), up);
    }
    for t in tri.indices.chunks_exact(3) {
        let a = tri.points[t[0]];
        let b = tri.points[t[1]];
        let c = tri.points[t[2]];
        // Counter-clockwise in (x, z) faces down
        if (b - a).perp(&(c - a)) > 0.0 {
            mesh.add_triangle(base + t[0] as u32, base + t[2] as u32, base + t[1] as u32);
        } else {
            mesh.add_triangle(base + t[0] as u32, base + t[1] as u32, base + t[2] as u32);
        }
    }
    Ok(mesh)
}

/// Flat disk facing +Y
pub fn disk_mesh(center: Point2<f64>, radius: f64, y: f64, segments: usize) -> Result<Mesh> {
    fill_mesh(&Profile2D::circle(center, radius, None, segments), y)
}

/// Flat ring facing +Y
pub fn annulus_mesh(
    center: Point2<f64>,
    inner_radius: f64,
    outer_radius: f64,
    y: f64,
    segments: usize,
) -> Result<Mesh> {
    fill_mesh(
        &Profile2D::circle(center, outer_radius, Some(inner_radius), segments),
        y,
    )
}
