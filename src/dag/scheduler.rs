// src/dag/scheduler.rs

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dag::graph::DagGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::task_info::{RunState, ScheduledTask, TaskRunState};
use crate::errors::{DagrunError, Result};
use crate::result::{ResultSet, TaskResult};
use crate::types::{RunPhase, TaskName};

/// Wavefront scheduler: the validated graph plus the state of one run.
///
/// This is a synchronous state machine with no channels or threads. The
/// runtime feeds it completions one at a time; each call returns the tasks
/// that became ready. It is responsible for:
/// - releasing the roots when a run starts
/// - recording each task's result exactly once
/// - failing the run on the first task failure or protocol violation
/// - releasing a dependent as soon as all its dependencies succeeded
///
/// Results and run states are only ever touched through `&mut self`, so the
/// single loop that owns the scheduler is the only writer.
#[derive(Debug)]
pub struct Scheduler {
    graph: DagGraph,
    states: HashMap<TaskName, RunState>,
    results: HashMap<TaskName, TaskResult>,
    phase: RunPhase,
}

impl Scheduler {
    /// Wrap a graph that already passed [`crate::dag::validate`].
    pub fn new(graph: DagGraph) -> Self {
        Self {
            graph,
            states: HashMap::new(),
            results: HashMap::new(),
            phase: RunPhase::Idle,
        }
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Whether the current run reached a terminal phase.
    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Read-only view of the given task's run state; `None` for unknown tasks.
    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        if !self.graph.contains(task) {
            return None;
        }
        Some(self.states.get(task).copied().into())
    }

    /// Whether every dependency of `task` has succeeded in this run.
    ///
    /// Returns `None` if the task is unknown.
    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        if !self.graph.contains(task) {
            return None;
        }
        Some(
            self.graph
                .dependencies_of(task)
                .iter()
                .all(|dep| self.states.get(dep.as_str()) == Some(&RunState::DoneSuccess)),
        )
    }

    pub fn results(&self) -> &HashMap<TaskName, TaskResult> {
        &self.results
    }

    pub fn result(&self, task: &str) -> Option<&TaskResult> {
        self.results.get(task)
    }

    /// Results for `names`, silently skipping names without a result.
    pub fn results_for<'n, I>(&self, names: I) -> ResultSet
    where
        I: IntoIterator<Item = &'n str>,
    {
        names
            .into_iter()
            .filter_map(|name| self.results.get(name).cloned())
            .collect()
    }

    /// Start a new run: reset per-run state and release every task without
    /// dependencies.
    ///
    /// An empty graph finishes immediately.
    pub fn start_new_run(&mut self) -> Result<SchedulerStep> {
        self.phase = RunPhase::Scheduling;
        self.results.clear();
        self.states = self
            .graph
            .tasks()
            .map(|name| (name.to_string(), RunState::Pending))
            .collect();

        if self.graph.is_empty() {
            info!("scheduler: empty task graph; nothing to run");
            self.phase = RunPhase::Succeeded;
            return Ok(SchedulerStep::finished());
        }

        let roots: Vec<TaskName> = self.graph.roots().into_iter().map(String::from).collect();
        if roots.is_empty() {
            self.phase = RunPhase::Failed;
            return Err(DagrunError::NoRootTask);
        }

        debug!(?roots, "scheduler: releasing root tasks");
        let released = self.release(roots)?;
        self.phase = RunPhase::Waiting;
        Ok(SchedulerStep::released(released))
    }

    /// Record the completion of one task and compute the next wave.
    ///
    /// Errors end the run:
    /// - [`DagrunError::DuplicateCallback`] if the task already has a result;
    /// - [`DagrunError::TaskFailed`] if the task reported a failure;
    /// - [`DagrunError::RescheduleConflict`] if a dependent that became ready
    ///   was already released.
    ///
    /// The result store keeps everything recorded so far in every case.
    pub fn handle_completion(&mut self, result: TaskResult) -> Result<SchedulerStep> {
        let task = result.name().to_string();
        self.phase = RunPhase::Scheduling;

        if self.results.contains_key(&task) {
            warn!(task = %task, "callback invoked multiple times; aborting run");
            self.phase = RunPhase::Failed;
            return Err(DagrunError::DuplicateCallback { task });
        }

        let Some(state) = self.states.get_mut(&task) else {
            warn!(task = %task, "completion for unknown task; ignoring");
            self.phase = RunPhase::Waiting;
            return Ok(SchedulerStep::default());
        };

        let failure = result.error().cloned();
        *state = if failure.is_none() {
            RunState::DoneSuccess
        } else {
            RunState::DoneFailed
        };
        self.results.insert(task.clone(), result);

        if let Some(source) = failure {
            warn!(task = %task, error = %source, "task failed; aborting run");
            self.phase = RunPhase::Failed;
            return Err(DagrunError::TaskFailed { task, source });
        }

        debug!(task = %task, done = self.results.len(), total = self.graph.len(), "task finished");

        if self.results.len() == self.graph.len() {
            info!(tasks = self.results.len(), "scheduler: all tasks done");
            self.phase = RunPhase::Succeeded;
            return Ok(SchedulerStep::finished());
        }

        // Decide first, then mutate.
        let ready: Vec<TaskName> = self
            .graph
            .dependents_of(&task)
            .iter()
            .filter(|down| self.deps_satisfied(down).unwrap_or(false))
            .cloned()
            .collect();

        let released = self.release(ready)?;
        self.phase = RunPhase::Waiting;
        Ok(SchedulerStep::released(released))
    }

    /// Mark the run as timed out. Recorded results stay queryable.
    pub fn mark_timed_out(&mut self) {
        self.phase = RunPhase::TimedOut;
    }

    /// Mark the run as cancelled by its caller. Recorded results stay
    /// queryable.
    pub fn mark_cancelled(&mut self) {
        self.phase = RunPhase::Cancelled;
    }

    /// Mark `names` as running and pair each with its body and inputs.
    fn release(&mut self, names: Vec<TaskName>) -> Result<Vec<ScheduledTask>> {
        let mut released = Vec::with_capacity(names.len());

        for name in names {
            match self.states.get(&name) {
                Some(RunState::Pending) => {}
                Some(state) => {
                    warn!(task = %name, ?state, "task became ready twice");
                    self.phase = RunPhase::Failed;
                    return Err(DagrunError::RescheduleConflict { task: name });
                }
                None => {
                    warn!(task = %name, "released task missing from run state");
                    self.phase = RunPhase::Failed;
                    return Err(DagrunError::RescheduleConflict { task: name });
                }
            }

            let Some(body) = self.graph.body_of(&name).cloned() else {
                self.phase = RunPhase::Failed;
                return Err(DagrunError::RescheduleConflict { task: name });
            };
            let inputs = self.results_for(self.graph.dependencies_of(&name).iter().map(|d| d.as_str()));

            debug!(task = %name, "dependencies satisfied; marking Running");
            self.states.insert(name.clone(), RunState::Running);
            released.push(ScheduledTask::new(name, body, inputs));
        }

        Ok(released)
    }

    /// Number of tasks whose result has been recorded in this run.
    pub fn done_count(&self) -> usize {
        self.states.values().filter(|s| s.is_done()).count()
    }
}
