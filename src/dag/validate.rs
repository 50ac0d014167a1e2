// src/dag/validate.rs

//! Cycle detection.
//!
//! Three-color depth-first search seeded only from sink tasks (tasks nothing
//! depends on), walking upstream along declared dependencies:
//!
//! - reaching a task that is still on the current path is a back edge, so
//!   [`DagrunError::CycleDetected`];
//! - a cycle whose members are never reached from any sink stays uncolored,
//!   which is reported afterwards as [`DagrunError::IsolatedCycleDetected`].
//!
//! The walk uses an explicit stack so deep graphs cannot overflow the call
//! stack.

use std::collections::btree_set;
use std::collections::HashMap;

use tracing::debug;

use crate::dag::graph::DagGraph;
use crate::errors::{DagrunError, Result};
use crate::types::TaskName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// On the current DFS path.
    Gray,
    /// Fully explored, along with everything upstream of it.
    Black,
}

/// Certify that `graph` is acyclic.
pub fn validate(graph: &DagGraph) -> Result<()> {
    // Absent from the map means white (unvisited).
    let mut colors: HashMap<&str, Color> = HashMap::with_capacity(graph.len());

    for sink in graph.sinks() {
        if !colors.contains_key(sink) {
            visit(graph, sink, &mut colors)?;
        }
    }

    if colors.len() < graph.len() {
        let mut stranded: Vec<TaskName> = graph
            .tasks()
            .filter(|name| !colors.contains_key(name))
            .map(|name| name.to_string())
            .collect();
        stranded.sort();
        return Err(DagrunError::IsolatedCycleDetected { tasks: stranded });
    }

    debug!(tasks = graph.len(), "task graph is acyclic");
    Ok(())
}

fn visit<'g>(
    graph: &'g DagGraph,
    start: &'g str,
    colors: &mut HashMap<&'g str, Color>,
) -> Result<()> {
    // Each frame holds a task and the iterator over its remaining upstream
    // neighbours.
    let mut stack: Vec<(&'g str, btree_set::Iter<'g, TaskName>)> = Vec::new();

    colors.insert(start, Color::Gray);
    stack.push((start, graph.dependencies_of(start).iter()));

    while let Some((task, upstream)) = stack.last_mut() {
        let task = *task;
        match upstream.next() {
            Some(dep) => match colors.get(dep.as_str()) {
                Some(Color::Gray) => {
                    return Err(DagrunError::CycleDetected { task: dep.clone() });
                }
                Some(Color::Black) => {}
                None => {
                    colors.insert(dep.as_str(), Color::Gray);
                    stack.push((dep.as_str(), graph.dependencies_of(dep).iter()));
                }
            },
            None => {
                colors.insert(task, Color::Black);
                stack.pop();
            }
        }
    }

    Ok(())
}
