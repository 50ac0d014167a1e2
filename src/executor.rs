// src/executor.rs

//! The public handle: build a validated task graph, run it, query results.

use std::sync::Arc;

use tracing::info;

use crate::config::RunOptions;
use crate::dag::{validate, DagGraph, Scheduler, Task, TaskRunState};
use crate::engine::Runtime;
use crate::errors::{DagrunError, Result};
use crate::exec::{BlockingPoolBackend, DispatchBackend, TaskBody};
use crate::result::{ResultSet, TaskResult};
use crate::types::{RunPhase, TaskName};

/// A validated task graph plus the results of its most recent run.
#[derive(Debug)]
pub struct Executor {
    scheduler: Scheduler,
}

impl Executor {
    /// Build from `name -> task` pairs.
    ///
    /// Fails before anything runs if a dependency names an unknown task or
    /// the dependency relation has a cycle.
    pub fn auto<I, S>(tasks: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Task)>,
        S: Into<TaskName>,
    {
        let graph = DagGraph::build(tasks)?;
        validate(&graph)?;
        info!(tasks = graph.len(), roots = graph.roots().len(), "task graph validated");
        Ok(Self {
            scheduler: Scheduler::new(graph),
        })
    }

    /// Build a pure fan-out: every body becomes an independent task named by
    /// its position (`"0"`, `"1"`, ...).
    pub fn parallel<I>(bodies: I) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<dyn TaskBody>>,
    {
        let tasks: Vec<(TaskName, Task)> = bodies
            .into_iter()
            .enumerate()
            .map(|(i, body)| (i.to_string(), Task::from_body(body)))
            .collect();

        if tasks.is_empty() {
            return Err(DagrunError::NoTasks);
        }
        Self::auto(tasks)
    }

    /// Run every task, returning the first failure if any.
    ///
    /// Results recorded before a failure or timeout stay queryable. Bodies
    /// still running when the run ends are not stopped; their callbacks
    /// report [`crate::Callback::is_abandoned`]. Dropping the returned future
    /// before it completes leaves the executor in [`RunPhase::Cancelled`].
    pub async fn run(&mut self, options: RunOptions) -> Result<()> {
        self.run_with(options, BlockingPoolBackend).await
    }

    /// Like [`Executor::run`] with a custom dispatch backend.
    pub async fn run_with<B: DispatchBackend>(&mut self, options: RunOptions, backend: B) -> Result<()> {
        Runtime::new(&mut self.scheduler, backend, options).run().await
    }

    /// Run on a fresh multi-threaded tokio runtime, for callers without one.
    ///
    /// Must not be called from inside a tokio runtime. Abandoned bodies are
    /// left running in the background when this returns.
    pub fn run_blocking(&mut self, options: RunOptions) -> Result<()> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let outcome = rt.block_on(self.run(options));
        rt.shutdown_background();
        outcome
    }

    /// Names of tasks with a recorded result, in no particular order.
    pub fn task_names(&self) -> Vec<TaskName> {
        self.scheduler.results().keys().cloned().collect()
    }

    pub fn result(&self, name: &str) -> Option<&TaskResult> {
        self.scheduler.result(name)
    }

    /// Results for `names`, silently skipping names without a result.
    pub fn results<'n, I>(&self, names: I) -> ResultSet
    where
        I: IntoIterator<Item = &'n str>,
    {
        self.scheduler.results_for(names)
    }

    pub fn all_results(&self) -> ResultSet {
        self.scheduler.results().values().cloned().collect()
    }

    /// Tasks grouped by dependency depth; see [`DagGraph::levels`].
    pub fn plan(&self) -> Result<Vec<Vec<TaskName>>> {
        self.scheduler.graph().levels()
    }

    pub fn phase(&self) -> RunPhase {
        self.scheduler.phase()
    }

    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        self.scheduler.run_state_of(task)
    }

    pub fn graph(&self) -> &DagGraph {
        self.scheduler.graph()
    }

    pub fn len(&self) -> usize {
        self.scheduler.graph().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduler.graph().is_empty()
    }
}
