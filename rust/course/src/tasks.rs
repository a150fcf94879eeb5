// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Work deferred until after the current simulation step.
//!
//! Collision callbacks must not mutate the rigid-body world, so a completed
//! hole only schedules its advance here. The host drains the queue once per
//! tick, after stepping physics.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStepTask {
    /// Tear down hole `from` and build the next one.
    AdvanceHole { from: usize },
}

/// FIFO of post-step tasks.
#[derive(Debug, Default)]
pub struct PostStepQueue {
    tasks: VecDeque<PostStepTask>,
}

impl PostStepQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: PostStepTask) {
        self.tasks.push_back(task);
    }

    /// Take every queued task in scheduling order.
    pub fn drain(&mut self) -> Vec<PostStepTask> {
        self.tasks.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
