// src/exec/body.rs

//! The unit-of-work trait implemented by task bodies.

use std::sync::Arc;

use crate::exec::callback::Callback;
use crate::result::ResultSet;

/// A user-supplied unit of work.
///
/// `run` receives the task's [`Callback`] and the results of exactly its
/// declared dependencies. It must call the callback exactly once.
///
/// Any `Fn(Callback, ResultSet) + Send + Sync + 'static` closure is a
/// `TaskBody`.
pub trait TaskBody: Send + Sync + 'static {
    fn run(&self, callback: Callback, deps: ResultSet);
}

impl<F> TaskBody for F
where
    F: Fn(Callback, ResultSet) + Send + Sync + 'static,
{
    fn run(&self, callback: Callback, deps: ResultSet) {
        self(callback, deps)
    }
}

/// Erase a closure into a shareable body.
///
/// Closures passed here get their argument types inferred, which a bare
/// `Arc::new(|cb, deps| ...)` does not.
pub fn body_fn<F>(f: F) -> Arc<dyn TaskBody>
where
    F: Fn(Callback, ResultSet) + Send + Sync + 'static,
{
    Arc::new(f)
}
