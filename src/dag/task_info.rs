// src/dag/task_info.rs

//! Task definitions, per-run task state and released tasks.

use std::fmt;
use std::sync::Arc;

use crate::exec::{Callback, TaskBody};
use crate::result::ResultSet;
use crate::types::TaskName;

/// A unit of work as supplied by the caller: its body plus the names of the
/// tasks that must succeed before it may start.
///
/// The task's own name is the key it is registered under.
#[derive(Clone)]
pub struct Task {
    pub(crate) after: Vec<TaskName>,
    pub(crate) body: Arc<dyn TaskBody>,
}

impl Task {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(Callback, ResultSet) + Send + Sync + 'static,
    {
        Self::from_body(Arc::new(body))
    }

    /// Build a task from an already erased body, e.g. a type implementing
    /// [`TaskBody`] by hand.
    pub fn from_body(body: Arc<dyn TaskBody>) -> Self {
        Self {
            after: Vec::new(),
            body,
        }
    }

    /// Declare a dependency.
    pub fn after(mut self, dep: impl Into<TaskName>) -> Self {
        self.after.push(dep.into());
        self
    }

    pub fn after_all<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        self.after.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Declared dependencies, as given.
    pub fn dependencies(&self) -> &[TaskName] {
        &self.after
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("after", &self.after)
            .finish_non_exhaustive()
    }
}

/// Per-run state of a task (internal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    /// Waiting on dependencies.
    Pending,
    /// Body dispatched, no result recorded yet.
    Running,
    DoneSuccess,
    DoneFailed,
}

impl RunState {
    pub(crate) fn is_done(self) -> bool {
        matches!(self, RunState::DoneSuccess | RunState::DoneFailed)
    }
}

/// Public, read-only view of a task's per-run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// No run has been started yet.
    NotInRun,
    Pending,
    Running,
    DoneSuccess,
    DoneFailed,
}

impl From<Option<RunState>> for TaskRunState {
    fn from(state: Option<RunState>) -> Self {
        match state {
            None => TaskRunState::NotInRun,
            Some(RunState::Pending) => TaskRunState::Pending,
            Some(RunState::Running) => TaskRunState::Running,
            Some(RunState::DoneSuccess) => TaskRunState::DoneSuccess,
            Some(RunState::DoneFailed) => TaskRunState::DoneFailed,
        }
    }
}

/// A task the scheduler has released for execution, together with the
/// results of its dependencies.
#[derive(Clone)]
pub struct ScheduledTask {
    pub name: TaskName,
    pub(crate) body: Arc<dyn TaskBody>,
    /// Results of exactly the task's declared dependencies.
    pub inputs: ResultSet,
}

impl ScheduledTask {
    pub(crate) fn new(name: TaskName, body: Arc<dyn TaskBody>, inputs: ResultSet) -> Self {
        Self { name, body, inputs }
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("name", &self.name)
            .field("inputs", &self.inputs.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
