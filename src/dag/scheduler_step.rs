// src/dag/scheduler_step.rs

//! Step-by-step result type for the scheduler.

use crate::dag::task_info::ScheduledTask;

/// Structured result of a single scheduler "step".
///
/// Produced when a run starts and for every processed completion. Tests can
/// drive the scheduler by hand and make assertions on each step.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Tasks released by this step; the caller must dispatch all of them.
    pub newly_scheduled: Vec<ScheduledTask>,
    /// Whether every task now has a recorded successful result.
    pub run_finished: bool,
}

impl SchedulerStep {
    pub(crate) fn finished() -> Self {
        Self {
            newly_scheduled: Vec::new(),
            run_finished: true,
        }
    }

    pub(crate) fn released(newly_scheduled: Vec<ScheduledTask>) -> Self {
        Self {
            newly_scheduled,
            run_finished: false,
        }
    }

    /// Names of the released tasks, sorted.
    pub fn scheduled_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.newly_scheduled.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}
