// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Container-local vs world frame.
//!
//! Scene nodes hang under a hole container anchored at `anchor`, so their
//! transforms are local. Physics bodies are registered in world space. These
//! helpers are the only place the two frames are converted.

use nalgebra::{Isometry3, Point2, Point3, Translation3};

/// World point expressed relative to the container anchor.
#[inline]
pub fn to_local(world: &Point3<f64>, anchor: &Point3<f64>) -> Point3<f64> {
    Point3::from(world - anchor)
}

/// World isometry of a container-local placement.
#[inline]
pub fn local_to_world(local: &Isometry3<f64>, anchor: &Point3<f64>) -> Isometry3<f64> {
    Translation3::from(anchor.coords) * local
}

/// Ground-plane `(x, z)` of a 3D point.
#[inline]
pub fn ground(p: &Point3<f64>) -> Point2<f64> {
    Point2::new(p.x, p.z)
}

/// World ground-plane point relative to the anchor.
#[inline]
pub fn ground_to_local(p: &Point2<f64>, anchor: &Point3<f64>) -> Point2<f64> {
    Point2::new(p.x - anchor.x, p.y - anchor.z)
}
