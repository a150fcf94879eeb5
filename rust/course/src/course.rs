// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Course orchestration.
//!
//! [`CourseOrchestrator`] owns the ordered hole descriptors and at most one
//! live [`HoleEntity`]. Completion is recorded immediately, scheduled on the
//! next [`update`](CourseOrchestrator::update), and carried out when the host
//! drains the post-step queue after stepping physics:
//!
//! ```text
//! on_ball_in_hole -> hole_complete
//! update          -> AdvanceHole queued, transition_pending
//! run_post_step   -> destroy current, init next, reset ball
//! ```

use std::sync::Arc;

use crate::config::SynthesisConfig;
use crate::descriptor::{load_course_json, HoleDescriptor};
use crate::error::{Error, Result};
use crate::hole::HoleEntity;
use crate::physics::PhysicsWorld;
use crate::scene::SceneGraph;
use crate::tasks::{PostStepQueue, PostStepTask};
use nalgebra::Point3;
use putt_lite_geometry::{CsgSubtractor, SolidSubtractor};

/// Receives the start position of each hole that becomes playable.
pub trait BallReset {
    fn reset_ball(&mut self, position: Point3<f64>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoursePhase {
    Idle,
    HoleActive,
    Transitioning,
    CourseComplete,
    /// Hole `index` failed to build; nothing is live.
    Stalled { index: usize },
}

/// Result of one post-step task.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Advanced { from: usize, to: usize },
    CourseComplete { from: usize },
    /// `from` was destroyed, `to` could not be built.
    Failed { from: usize, to: usize, error: String },
    /// Scheduled for a hole that is no longer current.
    Stale { from: usize },
}

pub struct CourseOrchestrator {
    holes: Vec<HoleDescriptor>,
    config: Arc<SynthesisConfig>,
    subtractor: Arc<dyn SolidSubtractor>,
    current_index: usize,
    active: Option<HoleEntity>,
    phase: CoursePhase,
    hole_complete: bool,
    transition_pending: bool,
    transitioning: bool,
    queue: PostStepQueue,
}

impl std::fmt::Debug for CourseOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseOrchestrator")
            .field("holes", &self.holes.len())
            .field("current_index", &self.current_index)
            .field("phase", &self.phase)
            .field("active", &self.active)
            .field("hole_complete", &self.hole_complete)
            .field("transition_pending", &self.transition_pending)
            .field("transitioning", &self.transitioning)
            .finish()
    }
}

impl CourseOrchestrator {
    pub fn new(holes: Vec<HoleDescriptor>, config: SynthesisConfig) -> Result<Self> {
        Self::with_subtractor(holes, config, Arc::new(CsgSubtractor::new()))
    }

    /// Like [`CourseOrchestrator::new`] with a specific subtraction engine.
    pub fn with_subtractor(
        mut holes: Vec<HoleDescriptor>,
        config: SynthesisConfig,
        subtractor: Arc<dyn SolidSubtractor>,
    ) -> Result<Self> {
        config.validate()?;

        // Position in the course is authoritative
        for (i, hole) in holes.iter_mut().enumerate() {
            if hole.index != i {
                tracing::warn!(authored = hole.index, position = i, "Hole index does not match its position");
                hole.index = i;
            }
        }

        Ok(Self {
            holes,
            config: Arc::new(config),
            subtractor,
            current_index: 0,
            active: None,
            phase: CoursePhase::Idle,
            hole_complete: false,
            transition_pending: false,
            transitioning: false,
            queue: PostStepQueue::new(),
        })
    }

    /// Parse a JSON course and build an orchestrator for it.
    pub fn from_json(json: &str, config: SynthesisConfig) -> Result<Self> {
        Self::new(load_course_json(json)?, config)
    }

    /// Build the first hole.
    pub fn start(
        &mut self,
        scene: &mut dyn SceneGraph,
        physics: &mut dyn PhysicsWorld,
        ball: &mut dyn BallReset,
    ) -> Result<()> {
        self.start_at(0, scene, physics, ball)
    }

    /// Tear down whatever is live and build hole `index`.
    pub fn start_at(
        &mut self,
        index: usize,
        scene: &mut dyn SceneGraph,
        physics: &mut dyn PhysicsWorld,
        ball: &mut dyn BallReset,
    ) -> Result<()> {
        if index >= self.holes.len() {
            return Err(Error::HoleIndexOutOfRange {
                index,
                count: self.holes.len(),
            });
        }

        self.clear(scene, physics);
        self.current_index = index;

        match self.spawn(index, scene, physics) {
            Ok((hole, start)) => {
                self.active = Some(hole);
                self.phase = CoursePhase::HoleActive;
                ball.reset_ball(start);
                tracing::info!(hole = index, par = self.holes[index].par, "Hole started");
                Ok(())
            }
            Err(e) => {
                self.phase = CoursePhase::Stalled { index };
                tracing::error!(hole = index, error = %e, "Failed to start hole");
                Err(e)
            }
        }
    }

    /// Record that the ball reached the cup of hole `index`.
    ///
    /// Returns true only when this call marked the current hole complete.
    pub fn on_ball_in_hole(&mut self, index: usize) -> bool {
        if self.phase != CoursePhase::HoleActive
            || index != self.current_index
            || self.transitioning
            || self.transition_pending
            || self.hole_complete
        {
            tracing::debug!(
                hole = index,
                current = self.current_index,
                phase = ?self.phase,
                "Ignoring completion event"
            );
            return false;
        }

        self.hole_complete = true;
        tracing::info!(hole = index, "Hole complete");
        true
    }

    /// Per-frame check. Schedules the advance once per completion.
    pub fn update(&mut self) -> bool {
        if !self.hole_complete || self.transition_pending || self.transitioning {
            return false;
        }

        self.queue.push(PostStepTask::AdvanceHole {
            from: self.current_index,
        });
        self.transition_pending = true;
        tracing::debug!(hole = self.current_index, "Advance scheduled");
        true
    }

    /// Drain the post-step queue. Call once per tick, after the physics step.
    pub fn run_post_step(
        &mut self,
        scene: &mut dyn SceneGraph,
        physics: &mut dyn PhysicsWorld,
        ball: &mut dyn BallReset,
    ) -> Vec<TransitionOutcome> {
        let mut outcomes = Vec::new();
        for task in self.queue.drain() {
            match task {
                PostStepTask::AdvanceHole { from } => {
                    outcomes.push(self.advance(from, scene, physics, ball));
                }
            }
        }
        outcomes
    }

    fn advance(
        &mut self,
        from: usize,
        scene: &mut dyn SceneGraph,
        physics: &mut dyn PhysicsWorld,
        ball: &mut dyn BallReset,
    ) -> TransitionOutcome {
        if from != self.current_index || self.phase != CoursePhase::HoleActive || !self.transition_pending {
            tracing::debug!(from, current = self.current_index, "Dropping stale advance");
            return TransitionOutcome::Stale { from };
        }

        self.transitioning = true;
        self.transition_pending = false;
        self.phase = CoursePhase::Transitioning;

        if let Some(mut hole) = self.active.take() {
            hole.destroy(scene, physics);
        }

        let to = from + 1;
        let outcome = if to >= self.holes.len() {
            self.phase = CoursePhase::CourseComplete;
            tracing::info!(holes = self.holes.len(), par = self.total_par(), "Course complete");
            TransitionOutcome::CourseComplete { from }
        } else {
            self.current_index = to;
            match self.spawn(to, scene, physics) {
                Ok((hole, start)) => {
                    self.active = Some(hole);
                    self.phase = CoursePhase::HoleActive;
                    ball.reset_ball(start);
                    tracing::info!(from, to, "Advanced to next hole");
                    TransitionOutcome::Advanced { from, to }
                }
                Err(e) => {
                    self.phase = CoursePhase::Stalled { index: to };
                    tracing::error!(from, to, error = %e, "Hole transition failed");
                    TransitionOutcome::Failed {
                        from,
                        to,
                        error: e.to_string(),
                    }
                }
            }
        };

        self.reset_flags();
        outcome
    }

    /// Construct and init hole `index`, returning it with its start position.
    fn spawn(
        &self,
        index: usize,
        scene: &mut dyn SceneGraph,
        physics: &mut dyn PhysicsWorld,
    ) -> Result<(HoleEntity, Point3<f64>)> {
        let descriptor = self
            .holes
            .get(index)
            .cloned()
            .ok_or(Error::HoleIndexOutOfRange {
                index,
                count: self.holes.len(),
            })?;

        let mut hole = HoleEntity::with_subtractor(
            descriptor,
            Arc::clone(&self.config),
            Arc::clone(&self.subtractor),
            scene,
        )?;
        hole.init(scene, physics)?;

        match hole.world_start_position() {
            Some(start) => Ok((hole, start)),
            None => {
                hole.destroy(scene, physics);
                Err(Error::MissingStartPosition(index))
            }
        }
    }

    /// Ball-in-cup check against the live hole, forwarded to
    /// [`on_ball_in_hole`](Self::on_ball_in_hole).
    pub fn check_ball(&mut self, position: &Point3<f64>) -> bool {
        let in_cup = self
            .active
            .as_ref()
            .is_some_and(|hole| hole.is_ball_in_cup(position));
        in_cup && self.on_ball_in_hole(self.current_index)
    }

    /// Destroy the live hole, drop pending work and return to `Idle`.
    pub fn clear(&mut self, scene: &mut dyn SceneGraph, physics: &mut dyn PhysicsWorld) {
        if let Some(mut hole) = self.active.take() {
            hole.destroy(scene, physics);
        }
        self.queue.clear();
        self.reset_flags();
        self.phase = CoursePhase::Idle;
    }

    /// Rebuild the current hole from its descriptor.
    pub fn restart_current(
        &mut self,
        scene: &mut dyn SceneGraph,
        physics: &mut dyn PhysicsWorld,
        ball: &mut dyn BallReset,
    ) -> Result<()> {
        match self.phase {
            CoursePhase::HoleActive | CoursePhase::Stalled { .. } if !self.transitioning => {
                self.start_at(self.current_index, scene, physics, ball)
            }
            phase => Err(Error::InvalidState(format!("cannot restart from {:?}", phase))),
        }
    }

    /// Try again to build a hole that failed. Only valid while stalled.
    pub fn retry(
        &mut self,
        scene: &mut dyn SceneGraph,
        physics: &mut dyn PhysicsWorld,
        ball: &mut dyn BallReset,
    ) -> Result<()> {
        match self.phase {
            CoursePhase::Stalled { index } => self.start_at(index, scene, physics, ball),
            phase => Err(Error::InvalidState(format!("cannot retry from {:?}", phase))),
        }
    }

    fn reset_flags(&mut self) {
        self.hole_complete = false;
        self.transition_pending = false;
        self.transitioning = false;
    }

    /// 1-based number of the current hole.
    pub fn current_hole_number(&self) -> usize {
        self.current_index + 1
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_par(&self) -> Option<u32> {
        self.holes.get(self.current_index).map(|h| h.par)
    }

    pub fn total_par(&self) -> u32 {
        self.holes.iter().map(|h| h.par).sum()
    }

    pub fn hole_count(&self) -> usize {
        self.holes.len()
    }

    pub fn start_position(&self) -> Option<Point3<f64>> {
        self.holes.get(self.current_index).and_then(|h| h.start)
    }

    pub fn hole_position(&self) -> Option<Point3<f64>> {
        self.holes.get(self.current_index).map(|h| h.hole)
    }

    pub fn is_course_complete(&self) -> bool {
        self.phase == CoursePhase::CourseComplete
    }

    pub fn state(&self) -> CoursePhase {
        self.phase
    }

    pub fn active_hole(&self) -> Option<&HoleEntity> {
        self.active.as_ref()
    }

    pub fn is_hole_complete(&self) -> bool {
        self.hole_complete
    }

    pub fn is_transition_pending(&self) -> bool {
        self.transition_pending
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    pub fn holes(&self) -> &[HoleDescriptor] {
        &self.holes
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyStore;
    use crate::scene::SceneStore;
    use nalgebra::Point2;

    #[derive(Default)]
    struct RecordingBall {
        resets: Vec<Point3<f64>>,
    }

    impl BallReset for RecordingBall {
        fn reset_ball(&mut self, position: Point3<f64>) {
            self.resets.push(position);
        }
    }

    struct Harness {
        scene: SceneStore,
        physics: BodyStore,
        ball: RecordingBall,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                scene: SceneStore::new(),
                physics: BodyStore::new(),
                ball: RecordingBall::default(),
            }
        }
    }

    fn simple_hole(index: usize, par: u32) -> HoleDescriptor {
        let z = index as f64;
        HoleDescriptor {
            index,
            par,
            boundary: vec![
                Point2::new(-3.0, -5.0),
                Point2::new(3.0, -5.0),
                Point2::new(3.0, 5.0),
                Point2::new(-3.0, 5.0),
            ],
            start: Some(Point3::new(0.0, 0.0, 4.0 - z * 0.1)),
            hole: Point3::new(0.0, 0.0, -4.0),
            hazards: Vec::new(),
            bumpers: Vec::new(),
        }
    }

    fn course(count: usize) -> CourseOrchestrator {
        let holes = (0..count).map(|i| simple_hole(i, 2 + (i % 3) as u32)).collect();
        CourseOrchestrator::new(holes, SynthesisConfig::default()).unwrap()
    }

    fn complete_current(course: &mut CourseOrchestrator, h: &mut Harness) -> Vec<TransitionOutcome> {
        assert!(course.on_ball_in_hole(course.current_index()));
        assert!(course.update());
        course.run_post_step(&mut h.scene, &mut h.physics, &mut h.ball)
    }

    #[test]
    fn start_builds_first_hole() {
        let mut h = Harness::new();
        let mut course = course(3);
        assert_eq!(course.state(), CoursePhase::Idle);

        course.start(&mut h.scene, &mut h.physics, &mut h.ball).unwrap();
        assert_eq!(course.state(), CoursePhase::HoleActive);
        assert_eq!(course.current_hole_number(), 1);
        assert_eq!(course.current_par(), Some(2));
        assert_eq!(h.ball.resets, vec![Point3::new(0.0, 0.0, 4.0)]);
        // green, 4 walls, cup
        assert_eq!(h.physics.body_count(), 6);
    }

    #[test]
    fn start_at_out_of_range() {
        let mut h = Harness::new();
        let mut course = course(2);
        assert!(matches!(
            course.start_at(2, &mut h.scene, &mut h.physics, &mut h.ball),
            Err(Error::HoleIndexOutOfRange { index: 2, count: 2 })
        ));
        assert_eq!(course.state(), CoursePhase::Idle);
    }

    #[test]
    fn completion_guards() {
        let mut h = Harness::new();
        let mut course = course(3);
        assert!(!course.on_ball_in_hole(0), "idle course accepts no completion");

        course.start(&mut h.scene, &mut h.physics, &mut h.ball).unwrap();
        assert!(!course.on_ball_in_hole(1));
        assert!(course.on_ball_in_hole(0));
        assert!(!course.on_ball_in_hole(0));
        assert!(course.is_hole_complete());
    }

    #[test]
    fn completion_ignored_while_transitioning() {
        let mut h = Harness::new();
        let mut course = course(3);
        course.start(&mut h.scene, &mut h.physics, &mut h.ball).unwrap();

        course.transitioning = true;
        assert!(!course.on_ball_in_hole(0));
        assert!(!course.is_hole_complete());
        assert!(!course.update());
    }

    #[test]
    fn update_schedules_once() {
        let mut h = Harness::new();
        let mut course = course(3);
        course.start(&mut h.scene, &mut h.physics, &mut h.ball).unwrap();

        assert!(!course.update());
        course.on_ball_in_hole(0);
        assert!(course.update());
        assert!(!course.update());
        assert!(course.is_transition_pending());
        assert_eq!(course.pending_tasks(), 1);
        // Advance waits for the post-step drain
        assert_eq!(course.current_index(), 0);
        assert!(!course.on_ball_in_hole(0));
    }

    #[test]
    fn post_step_advances() {
        let mut h = Harness::new();
        let mut course = course(3);
        course.start(&mut h.scene, &mut h.physics, &mut h.ball).unwrap();
        let first = course.active_hole().and_then(|hole| hole.container()).unwrap();

        let outcomes = complete_current(&mut course, &mut h);
        assert_eq!(outcomes, vec![TransitionOutcome::Advanced { from: 0, to: 1 }]);
        assert_eq!(course.state(), CoursePhase::HoleActive);
        assert_eq!(course.current_hole_number(), 2);
        assert!(!course.is_hole_complete());
        assert!(!course.is_transition_pending());
        assert!(!course.is_transitioning());

        assert!(!h.scene.contains(first));
        assert_eq!(h.scene.roots().count(), 1);
        assert_eq!(h.physics.body_count(), 6);
        assert_eq!(h.ball.resets.len(), 2);
        assert_eq!(h.ball.resets[1], course.start_position().unwrap());
    }

    #[test]
    fn stale_task_is_dropped() {
        let mut h = Harness::new();
        let mut course = course(3);
        course.start(&mut h.scene, &mut h.physics, &mut h.ball).unwrap();

        course.queue.push(PostStepTask::AdvanceHole { from: 2 });
        let outcomes = course.run_post_step(&mut h.scene, &mut h.physics, &mut h.ball);
        assert_eq!(outcomes, vec![TransitionOutcome::Stale { from: 2 }]);
        assert_eq!(course.current_index(), 0);
        assert_eq!(course.state(), CoursePhase::HoleActive);
    }

    #[test]
    fn last_hole_completes_course() {
        let mut h = Harness::new();
        let mut course = course(2);
        course.start(&mut h.scene, &mut h.physics, &mut h.ball).unwrap();
        complete_current(&mut course, &mut h);

        let outcomes = complete_current(&mut course, &mut h);
        assert_eq!(outcomes, vec![TransitionOutcome::CourseComplete { from: 1 }]);
        assert!(course.is_course_complete());
        assert!(course.active_hole().is_none());
        assert!(h.scene.is_empty());
        assert_eq!(h.physics.body_count(), 0);
        assert!(!course.on_ball_in_hole(1));
    }

    #[test]
    fn missing_start_stalls_course() {
        let mut h = Harness::new();
        let mut holes: Vec<HoleDescriptor> = (0..3).map(|i| simple_hole(i, 3)).collect();
        holes[1].start = None;
        let mut course = CourseOrchestrator::new(holes, SynthesisConfig::default()).unwrap();
        course.start(&mut h.scene, &mut h.physics, &mut h.ball).unwrap();

        let outcomes = complete_current(&mut course, &mut h);
        assert!(matches!(
            outcomes.as_slice(),
            [TransitionOutcome::Failed { from: 0, to: 1, .. }]
        ));
        assert_eq!(course.state(), CoursePhase::Stalled { index: 1 });
        assert!(course.active_hole().is_none());
        assert!(h.scene.is_empty());
        assert_eq!(h.physics.body_count(), 0);
        assert!(!course.is_transitioning());
        assert!(!course.is_transition_pending());
        assert_eq!(h.ball.resets.len(), 1);

        assert!(matches!(
            course.retry(&mut h.scene, &mut h.physics, &mut h.ball),
            Err(Error::MissingStartPosition(1))
        ));
        assert_eq!(course.state(), CoursePhase::Stalled { index: 1 });

        // The host can skip past the broken hole
        course.start_at(2, &mut h.scene, &mut h.physics, &mut h.ball).unwrap();
        assert_eq!(course.state(), CoursePhase::HoleActive);
        assert_eq!(course.current_hole_number(), 3);
    }

    #[test]
    fn check_ball_uses_cup_volume() {
        let mut h = Harness::new();
        let mut course = course(2);
        course.start(&mut h.scene, &mut h.physics, &mut h.ball).unwrap();

        assert!(!course.check_ball(&Point3::new(0.0, 0.0, 0.0)));
        assert!(course.check_ball(&Point3::new(0.1, -0.1, -4.0)));
        assert!(course.is_hole_complete());
    }

    #[test]
    fn clear_releases_everything() {
        let mut h = Harness::new();
        let mut course = course(2);
        course.start(&mut h.scene, &mut h.physics, &mut h.ball).unwrap();
        course.on_ball_in_hole(0);
        course.update();

        course.clear(&mut h.scene, &mut h.physics);
        assert_eq!(course.state(), CoursePhase::Idle);
        assert_eq!(course.pending_tasks(), 0);
        assert!(h.scene.is_empty());
        assert_eq!(h.physics.body_count(), 0);

        course.clear(&mut h.scene, &mut h.physics);
        assert!(h.scene.is_empty());
    }

    #[test]
    fn restart_rebuilds_current_hole() {
        let mut h = Harness::new();
        let mut course = course(2);
        assert!(matches!(
            course.restart_current(&mut h.scene, &mut h.physics, &mut h.ball),
            Err(Error::InvalidState(_))
        ));

        course.start(&mut h.scene, &mut h.physics, &mut h.ball).unwrap();
        let before = course.active_hole().and_then(|hole| hole.container()).unwrap();
        course.restart_current(&mut h.scene, &mut h.physics, &mut h.ball).unwrap();

        let after = course.active_hole().and_then(|hole| hole.container()).unwrap();
        assert_ne!(before, after);
        assert_eq!(h.scene.roots().count(), 1);
        assert_eq!(h.physics.body_count(), 6);
        assert_eq!(h.ball.resets.len(), 2);
    }

    #[test]
    fn course_queries() {
        let course = course(4);
        assert_eq!(course.hole_count(), 4);
        assert_eq!(course.total_par(), 2 + 3 + 4 + 2);
        assert_eq!(course.hole_position(), Some(Point3::new(0.0, 0.0, -4.0)));
        assert!(!course.is_course_complete());
    }

    #[test]
    fn positions_reindex_holes() {
        let holes = vec![simple_hole(5, 3), simple_hole(5, 4)];
        let course = CourseOrchestrator::new(holes, SynthesisConfig::default()).unwrap();
        assert_eq!(course.holes()[0].index, 0);
        assert_eq!(course.holes()[1].index, 1);
    }
}
