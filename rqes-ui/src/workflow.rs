//! # Workflow Runtime
//!
//! Each screen is a [`Workflow`]: a reducer over `(state, intent)` that may
//! emit one-shot effects and spawn asynchronous tasks through [`Commands`].
//! Every task resolves to a follow-up intent.
//!
//! A [`Controller`] runs a workflow on the tokio runtime:
//!
//! - intents are processed one at a time, in submission order, on a single
//!   event loop; task completions re-enter the same loop, so a reduction is
//!   never interleaved with another;
//! - state is published through a `watch` channel, so observers see the
//!   latest value only;
//! - effects are delivered in emission order through a single-consumer
//!   queue, each at most once;
//! - dropping the controller stops the loop and aborts every outstanding
//!   task, so no effect reaches a torn-down observer.

use std::fmt::{self, Debug};
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::Instrument;
use uuid::Uuid;

/// A screen's state machine.
pub trait Workflow: Send + Sync + 'static {
    /// Screen state snapshot.
    type State: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// User and completion events.
    type Intent: Clone + Debug + Send + 'static;

    /// One-shot instructions to the rendering layer.
    type Effect: Debug + Send + 'static;

    /// State on screen entry. Must be pure: no I/O, same value every call.
    fn initial_state(&self) -> Self::State;

    /// Apply `intent` to `state`, recording effects and tasks in `cmd`.
    fn update(
        &self, intent: Self::Intent, state: &mut Self::State,
        cmd: &mut Commands<Self::Intent, Self::Effect>,
    );
}

/// Effects and tasks produced by a single [`Workflow::update`].
pub struct Commands<I, E> {
    effects: Vec<E>,
    tasks: Vec<BoxFuture<'static, I>>,
}

impl<I, E> Default for Commands<I, E> {
    fn default() -> Self {
        Self {
            effects: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

impl<I, E> Commands<I, E> {
    /// Create an empty command set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a one-shot effect.
    pub fn emit(&mut self, effect: E) {
        self.effects.push(effect);
    }

    /// Run `task` in the background; its output is submitted as an intent.
    pub fn spawn(&mut self, task: impl Future<Output = I> + Send + 'static)
    where
        I: 'static,
    {
        self.tasks.push(task.boxed());
    }

    /// Split into queued effects and tasks.
    #[must_use]
    pub fn into_parts(self) -> (Vec<E>, Vec<BoxFuture<'static, I>>) {
        (self.effects, self.tasks)
    }
}

/// Runs a [`Workflow`] on the tokio runtime.
pub struct Controller<W: Workflow> {
    id: String,
    intents: mpsc::UnboundedSender<W::Intent>,
    state: watch::Receiver<W::State>,
    effects: Mutex<Option<mpsc::UnboundedReceiver<W::Effect>>>,
    handle: JoinHandle<()>,
}

impl<W: Workflow> Controller<W> {
    /// Start the workflow's event loop.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(workflow: W) -> Self {
        let id = Uuid::new_v4().to_string();
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (effect_tx, effect_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(workflow.initial_state());

        let span = tracing::debug_span!("workflow", %id);
        let handle = tokio::spawn(run(workflow, state_tx, effect_tx, intent_rx).instrument(span));

        Self {
            id,
            intents: intent_tx,
            state: state_rx,
            effects: Mutex::new(Some(effect_rx)),
            handle,
        }
    }

    /// Unique identifier of this controller instance, used in log spans.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Queue an intent for processing.
    pub fn submit(&self, intent: W::Intent) {
        if let Err(e) = self.intents.send(intent) {
            tracing::warn!(target: "Controller::submit", id = %self.id, intent = ?e.0, "controller stopped");
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> W::State {
        self.state.borrow().clone()
    }

    /// Observe state changes. Late subscribers see the current state only.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<W::State> {
        self.state.clone()
    }

    /// Take the effect queue. Only the first caller receives it.
    #[must_use]
    pub fn take_effects(&self) -> Option<mpsc::UnboundedReceiver<W::Effect>> {
        self.effects.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl<W: Workflow> Debug for Controller<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller").field("id", &self.id).finish_non_exhaustive()
    }
}

impl<W: Workflow> Drop for Controller<W> {
    fn drop(&mut self) {
        tracing::debug!(target: "Controller::drop", id = %self.id, "stopping");
        self.handle.abort();
    }
}

// The event loop. Dropping it (on abort) drops the `JoinSet`, which aborts
// any task still in flight.
async fn run<W: Workflow>(
    workflow: W, state_tx: watch::Sender<W::State>, effect_tx: mpsc::UnboundedSender<W::Effect>,
    mut intents: mpsc::UnboundedReceiver<W::Intent>,
) {
    let mut state = state_tx.borrow().clone();
    let mut tasks = JoinSet::new();

    loop {
        let intent = tokio::select! {
            biased;
            Some(intent) = intents.recv() => intent,
            Some(joined) = tasks.join_next() => match joined {
                Ok(intent) => intent,
                Err(e) => {
                    tracing::error!(target: "Controller::run", ?e, "task did not complete");
                    continue;
                }
            },
            else => break,
        };

        tracing::debug!(target: "Controller::run", ?intent);
        let mut cmd = Commands::new();
        workflow.update(intent, &mut state, &mut cmd);

        state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            current.clone_from(&state);
            true
        });

        let (effects, spawned) = cmd.into_parts();
        for effect in effects {
            if let Err(e) = effect_tx.send(effect) {
                tracing::debug!(target: "Controller::run", effect = ?e.0, "no effect observer");
            }
        }
        for task in spawned {
            tasks.spawn(task);
        }
    }

    tracing::debug!(target: "Controller::run", "event loop finished");
}
