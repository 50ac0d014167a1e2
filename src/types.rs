// src/types.rs

//! Shared aliases and small value types.

use std::any::Any;
use std::sync::Arc;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Type-erased success value produced by a task body.
///
/// Payloads are shared between the result store and every dependent's
/// input view; dependents read them through [`crate::TaskResult::data`],
/// which hands out a copy.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Where a run currently is in its lifecycle.
///
/// `Idle -> Scheduling <-> Waiting -> {Succeeded, Failed, TimedOut, Cancelled}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// No run has been started yet.
    #[default]
    Idle,
    /// The scheduler is processing a completion and computing the next wave.
    Scheduling,
    /// Waiting for the next completion or the run deadline.
    Waiting,
    Succeeded,
    Failed,
    TimedOut,
    /// The caller dropped the run before it finished.
    Cancelled,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunPhase::Succeeded | RunPhase::Failed | RunPhase::TimedOut | RunPhase::Cancelled
        )
    }
}
