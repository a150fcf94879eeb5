// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall extrusion along a closed boundary polygon
//!
//! Every edge becomes one box. The mesh is built around the origin and the
//! placement lives in [`WallTransform`], which is the only source for both the
//! visual node and the box collider.

use crate::mesh::Mesh;
use crate::primitives::box_mesh;
use crate::shape::polygon_edges;
use nalgebra::{Isometry3, Point2, Point3, Translation3, UnitQuaternion, Vector3};

/// Wall dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallParams {
    pub height: f64,
    pub thickness: f64,
    /// Y the wall base rests on (the green top)
    pub base_height: f64,
    /// Segments shorter than this are skipped
    pub epsilon: f64,
}

impl Default for WallParams {
    fn default() -> Self {
        Self {
            height: 0.5,
            thickness: 0.2,
            base_height: 0.0,
            epsilon: 1e-4,
        }
    }
}

/// Placement of one wall box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallTransform {
    /// Box center (segment midpoint lifted by half the wall height)
    pub center: Point3<f64>,
    /// `atan2(dz, dx)` of the segment
    pub angle: f64,
    pub rotation: UnitQuaternion<f64>,
}

impl WallTransform {
    /// Derive the placement of the wall over `start -> end`
    pub fn from_segment(start: Point2<f64>, end: Point2<f64>, params: &WallParams) -> Self {
        let delta = end - start;
        let mid = nalgebra::center(&start, &end);
        let angle = delta.y.atan2(delta.x);

        Self {
            center: Point3::new(mid.x, params.base_height + params.height / 2.0, mid.y),
            angle,
            // Local +X maps onto the segment direction
            rotation: UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -angle),
        }
    }

    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.center.coords), self.rotation)
    }
}

/// One wall: box mesh around the origin, its transform and collider extents
#[derive(Debug, Clone)]
pub struct WallSegment {
    pub mesh: Mesh,
    pub transform: WallTransform,
    /// Half of `(length, height, thickness)`
    pub half_extents: Vector3<f64>,
    pub length: f64,
}

/// Emit one wall per boundary edge, closing edge included
pub fn extrude_walls(boundary: &[Point2<f64>], params: &WallParams) -> Vec<WallSegment> {
    polygon_edges(boundary)
        .filter_map(|(start, end)| {
            let length = (end - start).norm();
            if !(length >= params.epsilon) {
                return None;
            }

            let half_extents = Vector3::new(length / 2.0, params.height / 2.0, params.thickness / 2.0);
            Some(WallSegment {
                mesh: box_mesh(&half_extents),
                transform: WallTransform::from_segment(start, end, params),
                half_extents,
                length,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_wall_transform_axis_aligned() {
        let params = WallParams::default();
        let t = WallTransform::from_segment(Point2::new(-4.0, -8.0), Point2::new(-4.0, 8.0), &params);

        assert_relative_eq!(t.angle, FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(t.center, Point3::new(-4.0, 0.25, 0.0), epsilon = 1e-12);

        // Box length axis follows the segment
        let along = t.rotation * Vector3::x();
        assert_relative_eq!(along, Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_wall_transform_diagonal() {
        let params = WallParams::default();
        let start = Point2::new(1.0, 1.0);
        let end = Point2::new(4.0, 5.0);
        let t = WallTransform::from_segment(start, end, &params);

        // Both box ends land on the segment endpoints
        let iso = t.isometry();
        let a = iso.transform_point(&Point3::new(-2.5, -0.25, 0.0));
        let b = iso.transform_point(&Point3::new(2.5, -0.25, 0.0));
        assert_relative_eq!(a, Point3::new(1.0, 0.0, 1.0), epsilon = 1e-9);
        assert_relative_eq!(b, Point3::new(4.0, 0.0, 5.0), epsilon = 1e-9);
    }

    #[test]
    fn test_extrude_walls_rectangle() {
        let boundary = vec![
            Point2::new(-4.0, -8.0),
            Point2::new(-4.0, 8.0),
            Point2::new(4.0, 8.0),
            Point2::new(4.0, -8.0),
        ];
        let walls = extrude_walls(&boundary, &WallParams::default());
        assert_eq!(walls.len(), 4);

        let lengths: Vec<f64> = walls.iter().map(|w| w.length).collect();
        assert_eq!(lengths, vec![16.0, 8.0, 16.0, 8.0]);

        for wall in &walls {
            let (min, max) = wall.mesh.bounds();
            assert_relative_eq!(max.x as f64, wall.half_extents.x, epsilon = 1e-5);
            assert_relative_eq!(-min.y as f64, wall.half_extents.y, epsilon = 1e-5);
            assert_relative_eq!(max.z as f64, wall.half_extents.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_extrude_walls_skips_degenerate() {
        let boundary = vec![
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(5.0, 5.0),
        ];
        let walls = extrude_walls(&boundary, &WallParams::default());
        assert_eq!(walls.len(), 3);
    }

    #[test]
    fn test_extrude_walls_base_height() {
        let params = WallParams {
            base_height: 1.5,
            ..WallParams::default()
        };
        let boundary = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        ];
        for wall in extrude_walls(&boundary, &params) {
            let placed = wall.mesh.transformed(&wall.transform.isometry());
            let (min, max) = placed.bounds();
            assert_relative_eq!(min.y, 1.5, epsilon = 1e-5);
            assert_relative_eq!(max.y, 2.0, epsilon = 1e-5);
        }
    }
}
