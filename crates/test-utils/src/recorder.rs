use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use dagrun::dag::ScheduledTask;
use dagrun::exec::{BlockingPoolBackend, CompletionSender, DispatchBackend};

/// One dispatch observed by a [`RecordingBackend`].
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub task: String,
    /// Names in the task's input result set, sorted.
    pub inputs: Vec<String>,
    pub at: Instant,
}

/// Shared log of dispatches and body completions.
///
/// Bodies call [`Recorder::mark_finished`] right before invoking their
/// callback, so every dispatch of a dependent can be compared against the
/// finish times of its dependencies.
#[derive(Clone, Default)]
pub struct Recorder {
    dispatched: Arc<Mutex<Vec<Dispatch>>>,
    finished: Arc<Mutex<HashMap<String, Instant>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that records into this recorder and runs bodies on the
    /// blocking pool.
    pub fn backend(&self) -> RecordingBackend {
        RecordingBackend {
            inner: BlockingPoolBackend,
            recorder: self.clone(),
        }
    }

    pub fn mark_finished(&self, task: &str) {
        self.finished
            .lock()
            .unwrap()
            .insert(task.to_string(), Instant::now());
    }

    pub fn finished_at(&self, task: &str) -> Option<Instant> {
        self.finished.lock().unwrap().get(task).copied()
    }

    pub fn dispatches(&self) -> Vec<Dispatch> {
        self.dispatched.lock().unwrap().clone()
    }

    pub fn dispatched_names(&self) -> Vec<String> {
        self.dispatches().into_iter().map(|d| d.task).collect()
    }

    /// How many times `task` was dispatched.
    pub fn count(&self, task: &str) -> usize {
        self.dispatched
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.task == task)
            .count()
    }

    fn record(&self, task: &ScheduledTask) {
        let mut inputs: Vec<String> = task.inputs.names().map(String::from).collect();
        inputs.sort();
        self.dispatched.lock().unwrap().push(Dispatch {
            task: task.name.clone(),
            inputs,
            at: Instant::now(),
        });
    }
}

/// Dispatch backend that records every task before handing it to
/// [`BlockingPoolBackend`].
pub struct RecordingBackend {
    inner: BlockingPoolBackend,
    recorder: Recorder,
}

impl DispatchBackend for RecordingBackend {
    fn dispatch(&mut self, task: ScheduledTask, completions: &CompletionSender) {
        tracing::debug!(task = %task.name, "recording dispatch");
        self.recorder.record(&task);
        self.inner.dispatch(task, completions);
    }
}
