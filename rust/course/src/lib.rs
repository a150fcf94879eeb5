// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Putt-Lite Course
//!
//! Builds playable mini-golf holes from declarative descriptors and sequences
//! them into a course. Each hole keeps a render representation (scene nodes
//! under one container) and a collision representation (static bodies in world
//! space) in agreement.
//!
//! The scene graph and rigid-body world belong to the host and are reached
//! through [`SceneGraph`] and [`PhysicsWorld`]. [`SceneStore`] and
//! [`BodyStore`] are in-memory implementations.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use putt_lite_course::{BodyStore, CourseOrchestrator, SceneStore, SynthesisConfig};
//!
//! let mut course = CourseOrchestrator::from_json(json, SynthesisConfig::default())?;
//! course.start(&mut scene, &mut physics, &mut ball)?;
//!
//! // every tick
//! physics_step();
//! course.check_ball(&ball_position);
//! course.update();
//! course.run_post_step(&mut scene, &mut physics, &mut ball);
//! ```

pub mod config;
pub mod course;
pub mod descriptor;
pub mod error;
pub mod frame;
pub mod hazards;
pub mod hole;
pub mod physics;
pub mod scene;
pub mod tasks;

pub use config::{CollisionSurface, HazardKindConfig, Material, MaterialPalette, SynthesisConfig};
pub use course::{BallReset, CourseOrchestrator, CoursePhase, TransitionOutcome};
pub use descriptor::{
    load_course_json, BumperDescriptor, Footprint, HazardDescriptor, HazardKind, HazardShape,
    HoleDescriptor, SubShape,
};
pub use error::{Error, Result};
pub use frame::{local_to_world, to_local};
pub use hole::{HoleEntity, HoleState};
pub use physics::{BodyDesc, BodyHandle, BodyStore, BodyTag, ColliderShape, PhysicsWorld};
pub use scene::{NodeKey, NodeRole, SceneGraph, SceneNode, SceneStore};
pub use tasks::{PostStepQueue, PostStepTask};
