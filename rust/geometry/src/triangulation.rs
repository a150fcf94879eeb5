// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar polygon triangulation
//!
//! Used when converting csgrs polygons (arbitrary planar n-gons after the
//! subtraction) back into an indexed triangle mesh.

use crate::{Error, Point2, Point3, Result, Vector3};

/// Triangulate a simple polygon, returning indices into `points`
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();
    if n < 3 {
        return Err(Error::TriangulationError(format!(
            "Polygon has {} points, need at least 3",
            n
        )));
    }

    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    if is_convex(points) {
        return Ok((1..n - 1).flat_map(|i| [0, i, i + 1]).collect());
    }

    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    earcutr::earcut(&flat, &[], 2).map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Convex when every turn has the same sign; collinear runs are ignored
fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    let mut sign = 0.0_f64;

    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let turn = (b - a).perp(&(c - b));
        if turn.abs() <= 1e-10 {
            continue;
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return false;
        }
    }

    sign != 0.0
}

/// Project planar 3D points into a 2D basis on the plane with `normal`.
///
/// The basis is right-handed around `normal`, so a polygon wound
/// counter-clockwise when seen from the normal side stays counter-clockwise.
pub fn project_to_2d(points: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let Some(origin) = points.first() else {
        return Vec::new();
    };

    // Least-aligned world axis keeps the cross product well conditioned
    let reference = if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() {
        Vector3::x()
    } else if normal.y.abs() <= normal.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };

    let u = reference.cross(normal).normalize();
    let v = normal.cross(&u);

    points
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&u), d.dot(&v))
        })
        .collect()
}

/// Unit normal of a planar polygon by Newell's method, `None` when degenerate
pub fn polygon_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if points.len() < 3 {
        return None;
    }

    let mut normal = Vector3::zeros();
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }

    normal.try_normalize(1e-10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::signed_area;

    #[test]
    fn test_triangulate_convex_fan() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 9);
        assert_eq!(&indices[..3], &[0, 1, 2]);
    }

    #[test]
    fn test_triangulate_concave() {
        // L-shape
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        assert!(!is_convex(&points));
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 12);
    }

    #[test]
    fn test_triangulate_too_small() {
        assert!(triangulate_polygon(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]).is_err());
    }

    #[test]
    fn test_polygon_normal_ground_plane() {
        // Counter-clockwise seen from above (+Y)
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let normal = polygon_normal(&points).unwrap();
        assert!((normal.y - 1.0).abs() < 1e-9);

        let line = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        assert!(polygon_normal(&line).is_none());
    }

    #[test]
    fn test_projection_preserves_winding() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let normal = polygon_normal(&points).unwrap();
        let projected = project_to_2d(&points, &normal);
        assert_eq!(projected.len(), 4);
        assert!(signed_area(&projected) > 0.0);
    }
}
