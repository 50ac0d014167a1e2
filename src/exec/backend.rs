// src/exec/backend.rs

//! Pluggable dispatch backend.
//!
//! The runtime hands every released task to a `DispatchBackend` instead of
//! spawning it directly. Production code uses [`BlockingPoolBackend`], which
//! runs each body on its own thread from tokio's blocking pool. Tests can
//! wrap it to record what was dispatched and when.

use std::panic::{self, AssertUnwindSafe};

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::dag::ScheduledTask;
use crate::errors::{panic_message, TaskFailure};
use crate::exec::callback::{Callback, CompletionSender};

/// Trait abstracting how released tasks are executed.
pub trait DispatchBackend: Send {
    /// Start `task` so that it runs concurrently with everything else.
    ///
    /// Must not block: the runtime loop calls this between completions.
    fn dispatch(&mut self, task: ScheduledTask, completions: &CompletionSender);
}

/// Default backend: one blocking-pool thread per task body.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockingPoolBackend;

impl DispatchBackend for BlockingPoolBackend {
    fn dispatch(&mut self, task: ScheduledTask, completions: &CompletionSender) {
        // Detached: the runtime only learns about the body through its callback.
        let _ = spawn_body(task, completions);
    }
}

/// Run `task`'s body on the blocking pool.
///
/// Must be called from within a tokio runtime. A panic in the body never
/// escapes the worker thread: if the body had not completed yet, the panic is
/// reported as the task's failure.
pub fn spawn_body(task: ScheduledTask, completions: &CompletionSender) -> JoinHandle<()> {
    let ScheduledTask { name, body, inputs } = task;
    let callback = Callback::new(name.clone(), completions.clone());

    debug!(task = %name, inputs = inputs.len(), "dispatching task body");

    tokio::task::spawn_blocking(move || {
        let guard = callback.clone();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body.run(callback, inputs)));

        if let Err(cause) = outcome {
            let message = panic_message(&*cause);
            if guard.was_invoked() {
                warn!(task = %name, panic = %message, "task body panicked after completing");
            } else {
                error!(task = %name, panic = %message, "task body panicked");
                guard.failure(TaskFailure::msg(format!("task body panicked: {message}")));
            }
        }
    })
}
