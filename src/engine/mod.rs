// src/engine/mod.rs

//! Orchestration engine.
//!
//! The pure wavefront state machine lives in [`crate::dag::scheduler`]; the
//! async shell that waits for completions and enforces the run deadline is
//! implemented in [`runtime`].

pub mod runtime;

pub use crate::types::{RunPhase, TaskName};
pub use runtime::Runtime;
