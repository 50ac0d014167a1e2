// src/exec/callback.rs

//! The completion channel and the callback handed to every task body.
//!
//! The channel is a bounded `tokio::sync::mpsc` channel of capacity 1: a
//! finishing body blocks in its callback until the runtime loop has taken
//! the previous completion, so completions are processed one at a time.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::errors::TaskFailure;
use crate::result::TaskResult;
use crate::types::{Payload, TaskName};

/// Capacity of the completion channel.
pub const COMPLETION_CAPACITY: usize = 1;

pub type CompletionSender = mpsc::Sender<TaskResult>;
pub type CompletionReceiver = mpsc::Receiver<TaskResult>;

/// Create the per-run completion channel.
pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    mpsc::channel(COMPLETION_CAPACITY)
}

/// One-shot completion handle for a single task.
///
/// A body must invoke exactly one of the completion methods exactly once.
/// The handle is `Clone` so it can be moved into helper threads; invoking it
/// a second time is reported by the scheduler as a duplicate callback and
/// fails the run.
///
/// The blocking methods (`complete`, `success`, `failure`, ...) must be
/// called from a plain thread such as the one the body runs on. From async
/// code use [`Callback::complete_async`].
#[derive(Clone)]
pub struct Callback {
    task: TaskName,
    tx: CompletionSender,
    invoked: Arc<AtomicBool>,
}

impl Callback {
    pub(crate) fn new(task: TaskName, tx: CompletionSender) -> Self {
        Self {
            task,
            tx,
            invoked: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Name of the task this callback completes.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Report the task's outcome. Blocks until the runtime accepts it.
    pub fn complete(&self, outcome: Result<Option<Payload>, TaskFailure>) {
        let result = self.prepare(outcome);
        if self.tx.blocking_send(result).is_err() {
            debug!(task = %self.task, "run already finished; dropping completion");
        }
    }

    /// Async variant of [`Callback::complete`].
    pub async fn complete_async(&self, outcome: Result<Option<Payload>, TaskFailure>) {
        let result = self.prepare(outcome);
        if self.tx.send(result).await.is_err() {
            debug!(task = %self.task, "run already finished; dropping completion");
        }
    }

    pub fn success<T>(&self, value: T)
    where
        T: Any + Send + Sync,
    {
        self.complete(Ok(Some(Arc::new(value))));
    }

    /// Succeed without producing a payload.
    pub fn success_empty(&self) {
        self.complete(Ok(None));
    }

    pub fn failure(&self, failure: impl Into<TaskFailure>) {
        self.complete(Err(failure.into()));
    }

    /// Whether the run this callback belongs to has already ended.
    ///
    /// Runs do not forcibly stop bodies that are still executing after a
    /// failure or timeout. Long bodies can poll this and return early.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }

    pub(crate) fn was_invoked(&self) -> bool {
        self.invoked.load(Ordering::Acquire)
    }

    fn prepare(&self, outcome: Result<Option<Payload>, TaskFailure>) -> TaskResult {
        if self.invoked.swap(true, Ordering::AcqRel) {
            trace!(task = %self.task, "callback invoked again");
        }
        TaskResult::from_outcome(self.task.clone(), outcome)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("task", &self.task)
            .field("invoked", &self.was_invoked())
            .finish_non_exhaustive()
    }
}
