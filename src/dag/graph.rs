// src/dag/graph.rs

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::task_info::Task;
use crate::errors::{DagrunError, Result};
use crate::exec::TaskBody;
use crate::types::TaskName;

static NO_NAMES: BTreeSet<TaskName> = BTreeSet::new();

/// Internal node structure: immediate deps, dependents and the body.
struct DagNode {
    /// Tasks that must succeed before this one can run.
    deps: BTreeSet<TaskName>,
    /// Tasks that list this one as a dependency.
    dependents: BTreeSet<TaskName>,
    body: Arc<dyn TaskBody>,
}

/// In-memory task graph keyed by task name, with edges in both directions.
///
/// Building it rejects dangling dependency names; acyclicity is checked
/// separately by [`crate::dag::validate`].
pub struct DagGraph {
    nodes: HashMap<TaskName, DagNode>,
}

impl DagGraph {
    /// Build the graph from `name -> task` pairs.
    ///
    /// Duplicate dependency names collapse. A later pair with the same name
    /// replaces an earlier one, as with any map.
    pub fn build<I, S>(tasks: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Task)>,
        S: Into<TaskName>,
    {
        let mut nodes: HashMap<TaskName, DagNode> = HashMap::new();

        // First pass: create nodes with their dependency sets.
        for (name, task) in tasks {
            nodes.insert(
                name.into(),
                DagNode {
                    deps: task.after.into_iter().collect(),
                    dependents: BTreeSet::new(),
                    body: task.body,
                },
            );
        }

        // Second pass: reverse edges. Sorted so a dangling reference is
        // reported deterministically.
        let mut edges: Vec<(TaskName, TaskName)> = nodes
            .iter()
            .flat_map(|(name, node)| node.deps.iter().map(move |dep| (name.clone(), dep.clone())))
            .collect();
        edges.sort();

        for (task, dep) in edges {
            match nodes.get_mut(&dep) {
                Some(dep_node) => {
                    dep_node.dependents.insert(task);
                }
                None => {
                    return Err(DagrunError::UnknownDependency {
                        task,
                        dependency: dep,
                    });
                }
            }
        }

        Ok(Self { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// All task names, in no particular order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, name: &str) -> &BTreeSet<TaskName> {
        self.nodes.get(name).map(|n| &n.deps).unwrap_or(&NO_NAMES)
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &BTreeSet<TaskName> {
        self.nodes.get(name).map(|n| &n.dependents).unwrap_or(&NO_NAMES)
    }

    pub(crate) fn body_of(&self, name: &str) -> Option<&Arc<dyn TaskBody>> {
        self.nodes.get(name).map(|n| &n.body)
    }

    /// Tasks with no dependencies, sorted.
    pub fn roots(&self) -> Vec<&str> {
        let mut roots: Vec<&str> = self
            .tasks()
            .filter(|name| self.dependencies_of(name).is_empty())
            .collect();
        roots.sort_unstable();
        roots
    }

    /// Tasks nothing depends on, sorted.
    pub fn sinks(&self) -> Vec<&str> {
        let mut sinks: Vec<&str> = self
            .tasks()
            .filter(|name| self.dependents_of(name).is_empty())
            .collect();
        sinks.sort_unstable();
        sinks
    }

    /// Group tasks by execution level: roots are level 0, every other task
    /// sits one level below its deepest dependency. Names within a level are
    /// sorted.
    ///
    /// Diagnostic only; the scheduler releases tasks from completion events
    /// and never looks at levels.
    pub fn levels(&self) -> Result<Vec<Vec<TaskName>>> {
        // Edge direction: dep -> task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in self.tasks() {
            graph.add_node(name);
        }
        for (name, node) in self.nodes.iter() {
            for dep in node.deps.iter() {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| DagrunError::CycleDetected {
            task: cycle.node_id().to_string(),
        })?;

        let mut level_of: HashMap<&str, usize> = HashMap::new();
        let mut levels: Vec<Vec<TaskName>> = Vec::new();
        for name in order {
            let level = self
                .dependencies_of(name)
                .iter()
                .filter_map(|dep| level_of.get(dep.as_str()))
                .map(|l| l + 1)
                .max()
                .unwrap_or(0);
            level_of.insert(name, level);

            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(name.to_string());
        }

        for level in levels.iter_mut() {
            level.sort();
        }
        Ok(levels)
    }
}

impl fmt::Debug for DagGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, node) in self.nodes.iter() {
            map.entry(name, &node.deps);
        }
        map.finish()
    }
}
