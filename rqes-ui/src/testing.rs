//! # Testing
//!
//! A deterministic harness for [`Workflow`]s. Where a [`Controller`] runs
//! tasks in the background, the tester hands them back so a test can decide
//! when, and whether, they complete.
//!
//! [`Controller`]: crate::workflow::Controller

use std::collections::VecDeque;

use futures::future::{self, BoxFuture};

use crate::workflow::{Commands, Workflow};

/// Drives a workflow without a runtime-owned event loop.
pub struct WorkflowTester<W: Workflow> {
    workflow: W,
}

/// Output of a single update.
pub struct Update<I, E> {
    /// Effects emitted, in order.
    pub effects: Vec<E>,

    /// Tasks spawned, not yet run.
    pub tasks: Vec<BoxFuture<'static, I>>,
}

impl<I, E> Update<I, E> {
    /// Run every spawned task to completion and return the resulting intents
    /// in spawn order.
    pub async fn resolve(self) -> Vec<I> {
        future::join_all(self.tasks).await
    }

    /// Whether any task was spawned.
    #[must_use]
    pub fn has_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }
}

impl<W: Workflow> WorkflowTester<W> {
    /// Wrap `workflow`.
    pub const fn new(workflow: W) -> Self {
        Self { workflow }
    }

    /// The workflow's initial state.
    pub fn initial_state(&self) -> W::State {
        self.workflow.initial_state()
    }

    /// Apply a single intent.
    pub fn update(
        &self, intent: W::Intent, state: &mut W::State,
    ) -> Update<W::Intent, W::Effect> {
        let mut cmd = Commands::new();
        self.workflow.update(intent, state, &mut cmd);
        let (effects, tasks) = cmd.into_parts();
        Update { effects, tasks }
    }

    /// Apply `intent` and every intent produced by the tasks it spawns,
    /// transitively, in the order a controller would. Returns all effects.
    pub async fn run(&self, intent: W::Intent, state: &mut W::State) -> Vec<W::Effect> {
        let mut effects = Vec::new();
        let mut pending = VecDeque::from([intent]);

        while let Some(intent) = pending.pop_front() {
            let update = self.update(intent, state);
            effects.extend(update.effects);
            for task in update.tasks {
                pending.push_back(task.await);
            }
        }
        effects
    }
}
