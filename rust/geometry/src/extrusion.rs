// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting ground-plane profiles to vertical prisms

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::{Profile2D, Triangulation};
use nalgebra::{Point2, Point3, Vector3};

/// Extrude a ground-plane profile straight up from `bottom_y` to `top_y`.
///
/// Caps face -Y/+Y, side quads face away from the material (outward on the
/// outer boundary, into the opening on holes).
pub fn extrude_vertical(profile: &Profile2D, bottom_y: f64, top_y: f64) -> Result<Mesh> {
    if !(top_y > bottom_y) || !bottom_y.is_finite() || !top_y.is_finite() {
        return Err(Error::InvalidExtrusion(format!(
            "top {} must lie above bottom {}",
            top_y, bottom_y
        )));
    }

    let triangulation = profile.triangulate()?;

    let side_count = profile.outer.len() + profile.holes.iter().map(|h| h.len()).sum::<usize>();
    let mut mesh = Mesh::with_capacity(
        triangulation.points.len() * 2 + side_count * 6,
        triangulation.indices.len() * 2 + side_count * 6,
    );

    create_cap(&triangulation, bottom_y, -Vector3::y(), &mut mesh);
    create_cap(&triangulation, top_y, Vector3::y(), &mut mesh);

    create_sides(&profile.outer, bottom_y, top_y, &mut mesh);
    for hole in &profile.holes {
        create_sides(hole, bottom_y, top_y, &mut mesh);
    }

    Ok(mesh)
}

/// Flat cap at height `y`, every triangle wound toward `facing`
fn create_cap(triangulation: &Triangulation, y: f64, facing: Vector3<f64>, mesh: &mut Mesh) {
    let base = mesh.vertex_count() as u32;
    for p in &triangulation.points {
        mesh.add_vertex(lift(p, y), facing);
    }

    for tri in triangulation.indices.chunks_exact(3) {
        let a = lift(&triangulation.points[tri[0]], y);
        let b = lift(&triangulation.points[tri[1]], y);
        let c = lift(&triangulation.points[tri[2]], y);
        let (i0, i1, i2) = (base + tri[0] as u32, base + tri[1] as u32, base + tri[2] as u32);

        if (b - a).cross(&(c - a)).dot(&facing) >= 0.0 {
            mesh.add_triangle(i0, i1, i2);
        } else {
            mesh.add_triangle(i0, i2, i1);
        }
    }
}

/// Side quads; the right-hand side of each edge is taken as outside
fn create_sides(contour: &[Point2<f64>], bottom_y: f64, top_y: f64, mesh: &mut Mesh) {
    let n = contour.len();
    for i in 0..n {
        let p0 = contour[i];
        let p1 = contour[(i + 1) % n];
        let d = p1 - p0;

        // Skip degenerate edges (duplicate consecutive points)
        let Some(outward) = Vector3::new(d.y, 0.0, -d.x).try_normalize(1e-10) else {
            continue;
        };

        mesh.add_facing_quad(
            [
                lift(&p0, bottom_y),
                lift(&p1, bottom_y),
                lift(&p1, top_y),
                lift(&p0, top_y),
            ],
            &outward,
        );
    }
}

#[inline]
fn lift(p: &Point2<f64>, y: f64) -> Point3<f64> {
    Point3::new(p.x, y, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(tri: &[Point3<f64>; 3]) -> Vector3<f64> {
        (tri[1] - tri[0]).cross(&(tri[2] - tri[0]))
    }

    #[test]
    fn test_extrude_rectangle() {
        let profile = Profile2D::rectangle(Point2::new(0.0, 0.0), 4.0, 2.0);
        let mesh = extrude_vertical(&profile, -0.5, 0.5).unwrap();

        // 2 caps of 2 triangles + 4 sides of 2 triangles
        assert_eq!(mesh.triangle_count(), 12);

        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(-2.0, -0.5, -1.0));
        assert_eq!(max, Point3::new(2.0, 0.5, 1.0));
    }

    #[test]
    fn test_extrude_faces_point_outward() {
        let profile = Profile2D::rectangle(Point2::new(0.0, 0.0), 2.0, 2.0);
        let mesh = extrude_vertical(&profile, 0.0, 1.0).unwrap();
        let center = Point3::new(0.0, 0.5, 0.0);

        for tri in mesh.triangles() {
            let centroid = Point3::from((tri[0].coords + tri[1].coords + tri[2].coords) / 3.0);
            assert!(triangle_normal(&tri).dot(&(centroid - center)) > 0.0);
        }
    }

    #[test]
    fn test_extrude_annulus_hole_walls_face_inward() {
        let profile = Profile2D::circle(Point2::new(0.0, 0.0), 2.0, Some(1.0), 16);
        let mesh = extrude_vertical(&profile, 0.0, 1.0).unwrap();

        for tri in mesh.triangles() {
            let centroid = (tri[0].coords + tri[1].coords + tri[2].coords) / 3.0;
            let radial = Vector3::new(centroid.x, 0.0, centroid.z);
            let normal = triangle_normal(&tri);
            if normal.y.abs() > 1e-6 {
                continue;
            }
            if radial.norm() < 1.5 {
                assert!(normal.dot(&radial) < 0.0);
            } else {
                assert!(normal.dot(&radial) > 0.0);
            }
        }
    }

    #[test]
    fn test_extrude_invalid_heights() {
        let profile = Profile2D::rectangle(Point2::new(0.0, 0.0), 1.0, 1.0);
        assert!(extrude_vertical(&profile, 1.0, 1.0).is_err());
        assert!(extrude_vertical(&profile, 1.0, 0.0).is_err());
        assert!(extrude_vertical(&profile, f64::NAN, 1.0).is_err());
    }
}
