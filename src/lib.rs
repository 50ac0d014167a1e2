// src/lib.rs

//! In-process task dependency executor.
//!
//! Give it named tasks and the tasks each one must wait for. It rejects
//! cyclic graphs up front, then runs every task whose dependencies have all
//! succeeded, each on its own thread, and hands each task the results of its
//! dependencies. The first failure ends the run.
//!
//! ```no_run
//! use dagrun::{Executor, RunOptions, Task};
//!
//! let mut exec = Executor::auto([
//!     ("fetch", Task::new(|cb, _| cb.success(vec![1, 2, 3]))),
//!     ("sum", Task::new(|cb, deps| {
//!         let mut nums: Vec<i32> = Vec::new();
//!         match deps.data("fetch", &mut nums) {
//!             Ok(()) => cb.success(nums.iter().sum::<i32>()),
//!             Err(e) => cb.failure(e.to_string()),
//!         }
//!     }).after("fetch")),
//! ])?;
//! exec.run_blocking(RunOptions::default())?;
//! # Ok::<(), dagrun::DagrunError>(())
//! ```
//!
//! This wires together:
//! - graph building and cycle validation ([`dag`])
//! - the wavefront scheduler ([`dag::scheduler`]) and its async shell
//!   ([`engine`])
//! - body dispatch and the completion channel ([`exec`])
//! - typed result extraction ([`result`])

pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod executor;
pub mod logging;
pub mod result;
pub mod types;

pub use config::RunOptions;
pub use dag::{Task, TaskRunState};
pub use errors::{DagrunError, Result, TaskFailure};
pub use exec::{body_fn, Callback, TaskBody};
pub use executor::Executor;
pub use result::{ExtractError, ResultSet, TaskResult};
pub use types::{Payload, RunPhase, TaskName};
