// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::config::RunOptions;
use crate::dag::{ScheduledTask, Scheduler};
use crate::errors::{DagrunError, Result};
use crate::exec::callback::{completion_channel, CompletionReceiver, CompletionSender};
use crate::exec::DispatchBackend;

/// Longest deadline the runtime arms; longer timeouts are clamped to it.
pub const MAX_DEADLINE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Drives the scheduler for one run: dispatches released tasks through a
/// `DispatchBackend` and feeds completions back until the run ends.
///
/// The scheduler holds all run semantics; this struct only waits. Its two
/// suspension points are the wait for the next completion and the run-wide
/// deadline. When `run` returns, the completion receiver is dropped, so
/// bodies still in flight see their callbacks as abandoned.
pub struct Runtime<'s, B: DispatchBackend> {
    scheduler: &'s mut Scheduler,
    backend: B,
    options: RunOptions,
}

impl<B: DispatchBackend> fmt::Debug for Runtime<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("phase", &self.scheduler.phase())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'s, B: DispatchBackend> Runtime<'s, B> {
    pub fn new(scheduler: &'s mut Scheduler, backend: B, options: RunOptions) -> Self {
        Self {
            scheduler,
            backend,
            options,
        }
    }

    /// Main event loop.
    ///
    /// - Starts a new run and dispatches the roots.
    /// - Feeds each completion into the scheduler, one at a time.
    /// - Dispatches whatever the scheduler releases.
    /// - Gives up with [`DagrunError::Timeout`] once the deadline passes.
    pub async fn run(mut self) -> Result<()> {
        let timeout = self.options.effective_timeout();
        let deadline = Instant::now() + timeout.min(MAX_DEADLINE);
        let (tx, mut rx): (CompletionSender, CompletionReceiver) = completion_channel();

        info!(tasks = self.scheduler.graph().len(), ?timeout, "run started");

        let first = self.scheduler.start_new_run()?;
        if first.run_finished {
            info!("run finished");
            return Ok(());
        }
        self.dispatch(first.newly_scheduled, &tx);

        let sleep = sleep_until(deadline);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                completion = rx.recv() => {
                    // `tx` lives until this function returns.
                    let Some(result) = completion else {
                        return Err(anyhow::anyhow!("completion channel closed unexpectedly").into());
                    };

                    debug!(task = %result.name(), success = result.is_success(), "runtime received completion");

                    let step = self.scheduler.handle_completion(result)?;
                    if step.run_finished {
                        info!("run finished");
                        return Ok(());
                    }
                    self.dispatch(step.newly_scheduled, &tx);
                }
                _ = &mut sleep => {
                    warn!(
                        ?timeout,
                        done = self.scheduler.done_count(),
                        total = self.scheduler.graph().len(),
                        "run timed out; abandoning tasks still in flight"
                    );
                    self.scheduler.mark_timed_out();
                    return Err(DagrunError::Timeout(timeout));
                }
            }
        }
    }

    fn dispatch(&mut self, tasks: Vec<ScheduledTask>, tx: &CompletionSender) {
        if tasks.is_empty() {
            return;
        }

        let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
        debug!(?names, "dispatching ready tasks");

        for task in tasks {
            self.backend.dispatch(task, tx);
        }
    }
}

impl<B: DispatchBackend> Drop for Runtime<'_, B> {
    fn drop(&mut self) {
        // Reached with a live phase only when the `run` future was dropped
        // before it completed.
        if !self.scheduler.is_finished() {
            warn!(
                done = self.scheduler.done_count(),
                total = self.scheduler.graph().len(),
                "run dropped before finishing; abandoning tasks still in flight"
            );
            self.scheduler.mark_cancelled();
        }
    }
}
