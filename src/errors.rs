// src/errors.rs

//! Crate-wide error types and helpers.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::types::TaskName;

#[derive(Error, Debug)]
pub enum DagrunError {
    #[error("task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: TaskName, dependency: TaskName },

    #[error("cycle detected in task graph at task '{task}'")]
    CycleDetected { task: TaskName },

    #[error("isolated cycle detected among tasks {tasks:?}")]
    IsolatedCycleDetected { tasks: Vec<TaskName> },

    #[error("no task handlers given")]
    NoTasks,

    #[error("no task without dependencies to start the run from")]
    NoRootTask,

    #[error("callback invoked more than once by task '{task}'")]
    DuplicateCallback { task: TaskName },

    #[error("task '{task}' was released while already running or done")]
    RescheduleConflict { task: TaskName },

    #[error("task '{task}' failed: {source}")]
    TaskFailed {
        task: TaskName,
        #[source]
        source: TaskFailure,
    },

    #[error("run timed out after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DagrunError>;

/// Failure reported by a task body.
///
/// The same failure is stored in the run's result store and returned from
/// the run, so the underlying error is shared behind an `Arc`.
#[derive(Clone)]
pub struct TaskFailure(Arc<anyhow::Error>);

impl TaskFailure {
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self(Arc::new(anyhow::Error::msg(message)))
    }

    /// Access the wrapped error, e.g. to downcast it.
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}

impl fmt::Debug for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl std::error::Error for TaskFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<anyhow::Error> for TaskFailure {
    fn from(err: anyhow::Error) -> Self {
        Self(Arc::new(err))
    }
}

impl From<String> for TaskFailure {
    fn from(message: String) -> Self {
        Self::msg(message)
    }
}

impl From<&'static str> for TaskFailure {
    fn from(message: &'static str) -> Self {
        Self::msg(message)
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(s) = cause.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
