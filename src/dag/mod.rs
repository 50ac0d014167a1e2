// src/dag/mod.rs

//! Task graph representation, validation and scheduling.
//!
//! - [`graph`] builds the bidirectional task graph and its level view.
//! - [`validate`] certifies the graph is acyclic.
//! - [`scheduler`] contains the per-run state machine that decides which
//!   tasks are ready to run as completions come in.
//! - [`task_info`] provides task definitions and scheduled task types.
//! - [`scheduler_step`] defines the result type for scheduler steps.

pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod task_info;
pub mod validate;

pub use graph::DagGraph;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task_info::{ScheduledTask, Task, TaskRunState};
pub use validate::validate;
