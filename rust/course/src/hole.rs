// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One hole's complete resource set.
//!
//! A [`HoleEntity`] owns a container node in the scene graph and every mesh
//! node and physics body it registers. `init` builds everything; `destroy`
//! releases exactly what was registered and can be called any number of times.
//!
//! ```text
//! Constructed --init--> Initializing --ok--> Ready --destroy--> Destroyed
//!                            |                                     ^
//!                            +--------------err--------------------+
//! ```

use std::sync::Arc;

use crate::config::{CollisionSurface, Material, SynthesisConfig};
use crate::descriptor::HoleDescriptor;
use crate::error::{Error, Result};
use crate::frame::{ground, ground_to_local, local_to_world};
use crate::hazards::{hazard_cutters, synthesize_bumper, synthesize_hazard, SynthesisContext};
use crate::physics::{BodyDesc, BodyHandle, BodyTag, ColliderShape, PhysicsWorld};
use crate::scene::{NodeKey, NodeRole, SceneGraph, SceneNode};
use nalgebra::{Isometry3, Point2, Point3, Vector3};
use putt_lite_geometry::primitives::{annulus_mesh, disk_mesh};
use putt_lite_geometry::shape::{circle_segments, dedup_points, rect_contour};
use putt_lite_geometry::{
    extrude_walls, flat_collision_slab, CsgSubtractor, Cutter, Mesh, SolidSubtractor, SurfaceOutline,
    SurfaceSynthesizer,
};

/// Lift of decals (rim, start marker) above the green to avoid z-fighting.
const DECAL_LIFT: f64 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoleState {
    Constructed,
    Initializing,
    Ready,
    Destroyed,
}

pub struct HoleEntity {
    descriptor: HoleDescriptor,
    config: Arc<SynthesisConfig>,
    subtractor: Arc<dyn SolidSubtractor>,
    state: HoleState,
    container: Option<NodeKey>,
    /// Boundary in container coordinates.
    boundary: Vec<Point2<f64>>,
    nodes: Vec<NodeKey>,
    bodies: Vec<BodyHandle>,
}

impl std::fmt::Debug for HoleEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoleEntity")
            .field("index", &self.descriptor.index)
            .field("state", &self.state)
            .field("container", &self.container)
            .field("nodes", &self.nodes.len())
            .field("bodies", &self.bodies.len())
            .finish()
    }
}

impl HoleEntity {
    /// Validate the descriptor and create the container node.
    pub fn new(
        descriptor: HoleDescriptor,
        config: Arc<SynthesisConfig>,
        scene: &mut dyn SceneGraph,
    ) -> Result<Self> {
        Self::with_subtractor(descriptor, config, Arc::new(CsgSubtractor::new()), scene)
    }

    /// Like [`HoleEntity::new`] with a specific subtraction engine.
    pub fn with_subtractor(
        descriptor: HoleDescriptor,
        config: Arc<SynthesisConfig>,
        subtractor: Arc<dyn SolidSubtractor>,
        scene: &mut dyn SceneGraph,
    ) -> Result<Self> {
        descriptor.validate()?;
        config.validate()?;

        let anchor = config.anchor;
        let distinct = dedup_points(&descriptor.boundary, config.segment_epsilon);
        let boundary: Vec<Point2<f64>> = if distinct.len() >= 3 {
            distinct.iter().map(|p| ground_to_local(p, &anchor)).collect()
        } else {
            tracing::warn!(
                hole = descriptor.index,
                points = distinct.len(),
                "Boundary has fewer than 3 points, using fallback rectangle"
            );
            rect_contour(Point2::origin(), config.fallback_width, config.fallback_length)
        };

        let container = scene.add_node(
            None,
            SceneNode::container(descriptor.index, Isometry3::translation(anchor.x, anchor.y, anchor.z)),
        )?;

        Ok(Self {
            descriptor,
            config,
            subtractor,
            state: HoleState::Constructed,
            container: Some(container),
            boundary,
            nodes: Vec::new(),
            bodies: Vec::new(),
        })
    }

    /// Synthesize and register every mesh and body of the hole.
    ///
    /// On failure the entity destroys itself and the error is returned.
    pub fn init(&mut self, scene: &mut dyn SceneGraph, physics: &mut dyn PhysicsWorld) -> Result<()> {
        if self.state != HoleState::Constructed {
            return Err(Error::InvalidState(format!(
                "hole {} cannot init from {:?}",
                self.descriptor.index, self.state
            )));
        }

        self.state = HoleState::Initializing;
        match self.build(scene, physics) {
            Ok(()) => {
                self.state = HoleState::Ready;
                tracing::info!(
                    hole = self.descriptor.index,
                    meshes = self.nodes.len(),
                    bodies = self.bodies.len(),
                    "Hole ready"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(hole = self.descriptor.index, error = %e, "Hole init failed");
                self.destroy(scene, physics);
                Err(e)
            }
        }
    }

    fn build(&mut self, scene: &mut dyn SceneGraph, physics: &mut dyn PhysicsWorld) -> Result<()> {
        let config = Arc::clone(&self.config);
        let anchor = config.anchor;
        let height = config.surface_height;
        let cup = ground_to_local(&ground(&self.descriptor.hole), &anchor);
        let boundary = self.boundary.clone();
        let ctx = SynthesisContext {
            config: &config,
            anchor,
            boundary: &boundary,
        };

        // Green surface and its collider
        let mut cutters = Vec::new();
        for (i, hazard) in self.descriptor.hazards.iter().enumerate() {
            match hazard_cutters(hazard, &ctx) {
                Ok(c) => cutters.extend(c),
                Err(e) => tracing::warn!(hole = self.descriptor.index, hazard = i, error = %e, "Skipping hazard cutout"),
            }
        }
        let outline = SurfaceOutline::Polygon(boundary.clone());
        let params = config.surface_params();
        let surface = SurfaceSynthesizer::new(self.subtractor.as_ref(), params).synthesize_surface(
            &outline,
            &Cutter::Circle {
                center: cup,
                radius: config.cup_radius,
            },
            &cutters,
        )?;
        self.add_mesh(scene, NodeRole::Surface, surface, config.materials.green, Isometry3::identity())?;

        let green = match config.collision_surface {
            CollisionSurface::Slab => {
                let slab = flat_collision_slab(&outline, &params)?;
                BodyDesc::solid(
                    ColliderShape::Box {
                        half_extents: slab.half_extents,
                    },
                    local_to_world(&Isometry3::translation(slab.center.x, slab.center.y, slab.center.z), &anchor),
                    BodyTag::Green,
                )
            }
            CollisionSurface::Plane => BodyDesc::solid(
                ColliderShape::Plane {
                    normal: Vector3::y_axis(),
                },
                local_to_world(&Isometry3::translation(0.0, height, 0.0), &anchor),
                BodyTag::Green,
            ),
        };
        self.add_body(physics, green);

        // Cup rim
        if config.rim_width > 0.0 {
            let rim = annulus_mesh(
                cup,
                config.cup_radius,
                config.cup_radius + config.rim_width,
                height + DECAL_LIFT,
                self.segments(config.cup_radius + config.rim_width),
            )?;
            self.add_mesh(scene, NodeRole::Rim, rim, config.materials.rim, Isometry3::identity())?;
        }

        // Walls: node and collider share one transform
        for wall in extrude_walls(&boundary, &config.wall_params()) {
            let local = wall.transform.isometry();
            self.add_mesh(scene, NodeRole::Wall, wall.mesh, config.materials.wall, local)?;
            self.add_body(
                physics,
                BodyDesc::solid(
                    ColliderShape::Box {
                        half_extents: wall.half_extents,
                    },
                    local_to_world(&local, &anchor),
                    BodyTag::Wall,
                ),
            );
        }

        // Cup trigger
        let hole = self.descriptor.hole;
        self.add_body(
            physics,
            BodyDesc::trigger(
                ColliderShape::Cylinder {
                    radius: config.cup_radius,
                    half_height: config.cup_depth / 2.0,
                },
                Isometry3::translation(hole.x, anchor.y + height - config.cup_depth / 2.0, hole.z),
                BodyTag::Cup,
            ),
        );

        // Start marker
        match self.descriptor.start {
            Some(start) => {
                let marker = disk_mesh(
                    ground_to_local(&ground(&start), &anchor),
                    config.start_marker_radius,
                    height + DECAL_LIFT,
                    self.segments(config.start_marker_radius),
                )?;
                self.add_mesh(
                    scene,
                    NodeRole::StartMarker,
                    marker,
                    config.materials.start_marker,
                    Isometry3::identity(),
                )?;
            }
            None => tracing::warn!(hole = self.descriptor.index, "No start position, skipping start marker"),
        }

        // Hazards and bumpers: a bad item is skipped, its siblings still build
        for (i, hazard) in self.descriptor.hazards.clone().iter().enumerate() {
            let parts = match synthesize_hazard(hazard, height, &ctx) {
                Ok(parts) => parts,
                Err(e) => {
                    tracing::warn!(hole = self.descriptor.index, hazard = i, error = %e, "Skipping hazard");
                    continue;
                }
            };
            for fill in parts.fills {
                self.add_mesh(scene, NodeRole::HazardFill(fill.kind), fill.mesh, fill.material, Isometry3::identity())?;
            }
            for trigger in parts.triggers {
                self.add_body(physics, trigger);
            }
        }

        for (i, bumper) in self.descriptor.bumpers.clone().iter().enumerate() {
            let parts = match synthesize_bumper(bumper, &ctx) {
                Ok(parts) => parts,
                Err(e) => {
                    tracing::warn!(hole = self.descriptor.index, bumper = i, error = %e, "Skipping bumper");
                    continue;
                }
            };
            self.add_mesh(scene, NodeRole::Bumper, parts.mesh, parts.material, parts.transform)?;
            self.add_body(physics, parts.body);
        }

        Ok(())
    }

    fn segments(&self, radius: f64) -> usize {
        self.config
            .circle_segments
            .unwrap_or_else(|| circle_segments(radius))
    }

    fn add_mesh(
        &mut self,
        scene: &mut dyn SceneGraph,
        role: NodeRole,
        mesh: Mesh,
        material: Material,
        transform: Isometry3<f64>,
    ) -> Result<NodeKey> {
        let key = scene.add_node(self.container, SceneNode::mesh(role, mesh, material, transform))?;
        self.nodes.push(key);
        Ok(key)
    }

    fn add_body(&mut self, physics: &mut dyn PhysicsWorld, desc: BodyDesc) -> BodyHandle {
        let handle = physics.add_body(desc);
        self.bodies.push(handle);
        handle
    }

    /// Release every registered body and node, then the container.
    /// Calling it again is a no-op.
    pub fn destroy(&mut self, scene: &mut dyn SceneGraph, physics: &mut dyn PhysicsWorld) {
        if self.state == HoleState::Destroyed {
            return;
        }

        let body_count = self.bodies.len();
        for handle in self.bodies.drain(..) {
            physics.remove_body(handle);
        }
        // Children first; the container removal would take them anyway
        for key in self.nodes.drain(..).rev() {
            scene.remove_node(key);
        }
        if let Some(container) = self.container.take() {
            scene.remove_node(container);
        }

        self.state = HoleState::Destroyed;
        tracing::debug!(hole = self.descriptor.index, bodies = body_count, "Hole destroyed");
    }

    /// True when `ball` sits inside the cup volume.
    pub fn is_ball_in_cup(&self, ball: &Point3<f64>) -> bool {
        if self.state != HoleState::Ready {
            return false;
        }

        let hole = self.descriptor.hole;
        let top = self.config.anchor.y + self.config.surface_height;
        let planar = (ground(ball) - ground(&hole)).norm();

        planar < self.config.cup_radius
            && ball.y <= top + self.config.cup_capture_tolerance
            && ball.y >= top - self.config.cup_depth
    }

    pub fn index(&self) -> usize {
        self.descriptor.index
    }

    pub fn par(&self) -> u32 {
        self.descriptor.par
    }

    pub fn state(&self) -> HoleState {
        self.state
    }

    pub fn descriptor(&self) -> &HoleDescriptor {
        &self.descriptor
    }

    pub fn container(&self) -> Option<NodeKey> {
        self.container
    }

    pub fn surface_height(&self) -> f64 {
        self.config.surface_height
    }

    pub fn world_start_position(&self) -> Option<Point3<f64>> {
        self.descriptor.start
    }

    pub fn world_hole_position(&self) -> Point3<f64> {
        self.descriptor.hole
    }

    /// Boundary actually used, in container coordinates.
    pub fn boundary(&self) -> &[Point2<f64>] {
        &self.boundary
    }

    pub fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    pub fn nodes(&self) -> &[NodeKey] {
        &self.nodes
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes.len()
    }
}
