// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rigid-body world contract.
//!
//! Bodies are static and registered in world space. Handles are opaque; a hole
//! keeps the ones it created so it can remove exactly those.

use crate::descriptor::HazardKind;
use nalgebra::{Isometry3, Point3, Unit, Vector3};
use putt_lite_geometry::Mesh;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle for a body in the rigid-body world.
    pub struct BodyHandle;
}

/// Gameplay meaning of a body, read by the host's collision handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyTag {
    Green,
    Wall,
    Cup,
    HazardZone(HazardKind),
    Bumper,
}

/// Collider geometry in body space.
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    Box { half_extents: Vector3<f64> },
    /// Axis along local Y.
    Cylinder { radius: f64, half_height: f64 },
    Plane { normal: Unit<Vector3<f64>> },
    TriMesh {
        vertices: Vec<Point3<f64>>,
        indices: Vec<[u32; 3]>,
    },
}

impl ColliderShape {
    /// Triangle collider from a render mesh.
    pub fn trimesh(mesh: &Mesh) -> Self {
        ColliderShape::TriMesh {
            vertices: (0..mesh.vertex_count()).map(|i| mesh.vertex(i)).collect(),
            indices: mesh
                .indices
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect(),
        }
    }
}

/// Everything needed to create one body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub shape: ColliderShape,
    /// World placement.
    pub isometry: Isometry3<f64>,
    /// Triggers report overlap without a collision response.
    pub is_trigger: bool,
    /// Zero for static bodies.
    pub mass: f64,
    pub tag: BodyTag,
}

impl BodyDesc {
    pub fn solid(shape: ColliderShape, isometry: Isometry3<f64>, tag: BodyTag) -> Self {
        Self {
            shape,
            isometry,
            is_trigger: false,
            mass: 0.0,
            tag,
        }
    }

    pub fn trigger(shape: ColliderShape, isometry: Isometry3<f64>, tag: BodyTag) -> Self {
        Self {
            is_trigger: true,
            ..Self::solid(shape, isometry, tag)
        }
    }

    pub fn position(&self) -> Point3<f64> {
        Point3::from(self.isometry.translation.vector)
    }
}

/// Host rigid-body world as seen by the hole builder.
pub trait PhysicsWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Returns false if the handle was not present.
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    fn contains(&self, handle: BodyHandle) -> bool;

    fn body_count(&self) -> usize;
}

/// In-memory rigid-body world.
#[derive(Debug, Default)]
pub struct BodyStore {
    bodies: SlotMap<BodyHandle, BodyDesc>,
}

impl BodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&BodyDesc> {
        self.bodies.get(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &BodyDesc)> + '_ {
        self.bodies.iter()
    }

    /// Bodies carrying `tag`.
    pub fn tagged(&self, tag: BodyTag) -> impl Iterator<Item = &BodyDesc> + '_ {
        self.bodies.values().filter(move |b| b.tag == tag)
    }

    pub fn trigger_count(&self) -> usize {
        self.bodies.values().filter(|b| b.is_trigger).count()
    }
}

impl PhysicsWorld for BodyStore {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        self.bodies.insert(desc)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies.remove(handle).is_some()
    }

    fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
