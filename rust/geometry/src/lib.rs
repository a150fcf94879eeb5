// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Putt-Lite Geometry
//!
//! Geometry synthesis for procedurally built mini-golf holes: boolean
//! subtraction of cup and hazard cutouts from the green slab (csgrs), wall
//! extrusion along an arbitrary boundary polygon, and the mesh primitives the
//! hole builder hands to the renderer. Triangulation uses earcutr, 2D footprint
//! booleans use i_overlay and all math is nalgebra.
//!
//! ## Frames
//!
//! The green lies in the XZ plane with +Y up. 2D points (`Point2`) are ground
//! plane coordinates where `p.x` is world X and `p.y` is world Z.

pub mod bool2d;
pub mod csg;
pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod primitives;
pub mod profile;
pub mod shape;
pub mod surface;
pub mod triangulation;
pub mod walls;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point2, Point3, UnitQuaternion, Vector2, Vector3};

pub use bool2d::{intersect_contours, profiles_area, union_contours};
pub use csg::{calculate_normals, CsgSubtractor, SolidSubtractor};
pub use error::{Error, Result};
pub use extrusion::extrude_vertical;
pub use mesh::Mesh;
pub use profile::Profile2D;
pub use shape::{point_in_polygon, polygon_bounds, polygon_edges};
pub use surface::{flat_collision_slab, Cutter, SlabExtents, SurfaceOutline, SurfaceParams, SurfaceSynthesizer};
pub use walls::{extrude_walls, WallParams, WallSegment, WallTransform};
