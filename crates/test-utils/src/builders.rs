#![allow(dead_code)]

use std::collections::BTreeSet;

use dagrun::dag::DagGraph;
use dagrun::{Executor, Task};

/// Name used for the `i`-th task of generated graphs.
pub fn task_name(i: usize) -> String {
    format!("task_{i}")
}

/// A task that succeeds immediately without a payload.
pub fn noop_task() -> Task {
    Task::new(|cb, _| cb.success_empty())
}

/// A task that succeeds immediately with its own name as payload.
pub fn echo_task(name: &str) -> Task {
    let value = name.to_string();
    Task::new(move |cb, _| cb.success(value.clone()))
}

/// Turn arbitrary index lists into an acyclic shape: task `i` may only depend
/// on tasks `0..i`. Duplicates collapse.
pub fn sanitize_deps(raw: Vec<Vec<usize>>) -> Vec<BTreeSet<usize>> {
    raw.into_iter()
        .enumerate()
        .map(|(i, potential)| {
            if i == 0 {
                BTreeSet::new()
            } else {
                potential.into_iter().map(|d| d % i).collect()
            }
        })
        .collect()
}

/// Builder for task graphs to simplify test setup.
pub struct GraphBuilder {
    tasks: Vec<(String, Task)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn with_task(mut self, name: &str, task: Task) -> Self {
        self.tasks.push((name.to_string(), task));
        self
    }

    /// Add a no-op task depending on `deps`.
    pub fn with_noop(self, name: &str, deps: &[&str]) -> Self {
        let task = noop_task().after_all(deps.iter().copied());
        self.with_task(name, task)
    }

    /// `task_0 <- task_1 <- ... <- task_{n-1}`.
    pub fn chain(n: usize) -> Self {
        let mut builder = Self::new();
        for i in 0..n {
            let mut task = echo_task(&task_name(i));
            if i > 0 {
                task = task.after(task_name(i - 1));
            }
            builder = builder.with_task(&task_name(i), task);
        }
        builder
    }

    /// No-op tasks shaped by index-based dependency sets, as produced by
    /// [`sanitize_deps`].
    pub fn from_indexed(deps: &[BTreeSet<usize>]) -> Self {
        let mut builder = Self::new();
        for (i, task_deps) in deps.iter().enumerate() {
            let task = noop_task().after_all(task_deps.iter().map(|&d| task_name(d)));
            builder = builder.with_task(&task_name(i), task);
        }
        builder
    }

    pub fn into_tasks(self) -> Vec<(String, Task)> {
        self.tasks
    }

    /// Build the raw graph without cycle validation.
    pub fn build_graph(self) -> DagGraph {
        DagGraph::build(self.tasks).expect("Failed to build graph from builder")
    }

    /// Build and validate an executor.
    pub fn build(self) -> Executor {
        Executor::auto(self.tasks).expect("Failed to build valid executor from builder")
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
