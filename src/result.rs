// src/result.rs

//! Task outcomes and typed extraction of their payloads.
//!
//! A [`TaskResult`] is created exactly once per task, when the task's
//! callback fires, and is never mutated afterwards. Dependents read a
//! result's payload with [`TaskResult::data`], which copies the stored value
//! into a caller-owned destination after a checked downcast.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;
use std::ops::Index;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::errors::{panic_message, TaskFailure};
use crate::types::{Payload, TaskName};

/// Error returned by payload extraction. Local to the caller: it never
/// affects scheduling.
#[derive(Error, Debug, Clone)]
pub enum ExtractError {
    #[error("task '{task}' failed: {source}")]
    TaskFailed {
        task: TaskName,
        #[source]
        source: TaskFailure,
    },

    #[error("payload of task '{task}' is not a `{expected}`")]
    TypeMismatch {
        task: TaskName,
        expected: &'static str,
    },

    #[error("copying payload of task '{task}' panicked: {message}")]
    Panicked { task: TaskName, message: String },

    #[error("no result recorded for task '{task}'")]
    Missing { task: TaskName },
}

#[derive(Clone)]
enum Outcome {
    Success(Option<Payload>),
    Failure(TaskFailure),
}

/// The recorded outcome of one task.
#[derive(Clone)]
pub struct TaskResult {
    name: TaskName,
    outcome: Outcome,
}

impl TaskResult {
    /// A successful result; `payload` may be absent.
    pub fn ok(name: impl Into<TaskName>, payload: Option<Payload>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Success(payload),
        }
    }

    pub fn err(name: impl Into<TaskName>, failure: TaskFailure) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Failure(failure),
        }
    }

    pub(crate) fn from_outcome(
        name: TaskName,
        outcome: std::result::Result<Option<Payload>, TaskFailure>,
    ) -> Self {
        match outcome {
            Ok(payload) => Self::ok(name, payload),
            Err(failure) => Self::err(name, failure),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// The failure this task reported, if any.
    pub fn error(&self) -> Option<&TaskFailure> {
        match &self.outcome {
            Outcome::Failure(failure) => Some(failure),
            Outcome::Success(_) => None,
        }
    }

    pub fn has_payload(&self) -> bool {
        matches!(self.outcome, Outcome::Success(Some(_)))
    }

    /// Copy the stored payload into `dest`.
    ///
    /// - a failed task returns its failure and leaves `dest` untouched;
    /// - a success without payload is a no-op;
    /// - a payload of a different type than `T` is a
    ///   [`ExtractError::TypeMismatch`], `dest` untouched;
    /// - a panicking `Clone` is caught and returned as
    ///   [`ExtractError::Panicked`], `dest` untouched.
    ///
    /// The destination receives a clone; it never aliases the stored value.
    pub fn data<T>(&self, dest: &mut T) -> Result<(), ExtractError>
    where
        T: Any + Clone,
    {
        if let Some(value) = self.payload::<T>()? {
            *dest = value;
        }
        Ok(())
    }

    /// Like [`TaskResult::data`] but returns the copy instead of assigning it.
    pub fn payload<T>(&self) -> Result<Option<T>, ExtractError>
    where
        T: Any + Clone,
    {
        let payload = match &self.outcome {
            Outcome::Failure(failure) => {
                return Err(ExtractError::TaskFailed {
                    task: self.name.clone(),
                    source: failure.clone(),
                });
            }
            Outcome::Success(None) => return Ok(None),
            Outcome::Success(Some(payload)) => payload,
        };

        let stored = (**payload)
            .downcast_ref::<T>()
            .ok_or_else(|| ExtractError::TypeMismatch {
                task: self.name.clone(),
                expected: type_name::<T>(),
            })?;

        panic::catch_unwind(AssertUnwindSafe(|| stored.clone()))
            .map(Some)
            .map_err(|cause| ExtractError::Panicked {
                task: self.name.clone(),
                message: panic_message(&*cause),
            })
    }
}

impl fmt::Debug for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("TaskResult");
        s.field("name", &self.name);
        match &self.outcome {
            Outcome::Success(payload) => s.field("payload", &payload.is_some()),
            Outcome::Failure(failure) => s.field("failure", failure),
        };
        s.finish()
    }
}

/// Results keyed by task name.
///
/// Handed to each task body restricted to its declared dependencies, and
/// returned by the query API after a run.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    results: HashMap<TaskName, TaskResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TaskResult> {
        self.results.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.results.contains_key(name)
    }

    /// Extract the payload of `name` into `dest`; see [`TaskResult::data`].
    pub fn data<T>(&self, name: &str, dest: &mut T) -> Result<(), ExtractError>
    where
        T: Any + Clone,
    {
        match self.results.get(name) {
            Some(result) => result.data(dest),
            None => Err(ExtractError::Missing {
                task: name.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Names present in this set, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> hash_map::Values<'_, TaskName, TaskResult> {
        self.results.values()
    }

    pub(crate) fn insert(&mut self, result: TaskResult) {
        self.results.insert(result.name.clone(), result);
    }
}

impl FromIterator<TaskResult> for ResultSet {
    fn from_iter<I: IntoIterator<Item = TaskResult>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        for result in iter {
            set.insert(result);
        }
        set
    }
}

impl Index<&str> for ResultSet {
    type Output = TaskResult;

    /// Panics if `name` has no result, like `HashMap` indexing.
    fn index(&self, name: &str) -> &TaskResult {
        match self.results.get(name) {
            Some(result) => result,
            None => panic!("no result recorded for task '{name}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Fragile(u32);

    impl Clone for Fragile {
        fn clone(&self) -> Self {
            panic!("fragile value cannot be copied");
        }
    }

    #[test]
    fn data_copies_matching_payload() {
        let result = TaskResult::ok("b", Some(Arc::new("b string".to_string()) as Payload));
        let mut dest = String::new();

        result.data(&mut dest).unwrap();
        assert_eq!(dest, "b string");
    }

    #[test]
    fn data_is_a_copy_not_an_alias() {
        let result = TaskResult::ok("a", Some(Arc::new(vec![1, 2, 3]) as Payload));
        let mut dest: Vec<i32> = Vec::new();
        result.data(&mut dest).unwrap();
        dest.push(4);

        let again: Vec<i32> = result.payload().unwrap().unwrap();
        assert_eq!(again, vec![1, 2, 3]);
    }

    #[test]
    fn mismatched_type_leaves_destination_untouched() {
        let result = TaskResult::ok("a", Some(Arc::new(42u64) as Payload));
        let mut dest = String::from("unchanged");

        let err = result.data(&mut dest).unwrap_err();
        assert!(matches!(err, ExtractError::TypeMismatch { ref task, .. } if task == "a"));
        assert_eq!(dest, "unchanged");
    }

    #[test]
    fn absent_payload_is_a_no_op() {
        let result = TaskResult::ok("a", None);
        let mut dest = 2i32;

        result.data(&mut dest).unwrap();
        assert_eq!(dest, 2);
        assert!(!result.has_payload());
    }

    #[test]
    fn failure_is_returned_and_destination_untouched() {
        let result = TaskResult::err("a", TaskFailure::from("boom"));
        let mut dest = 5i32;

        match result.data(&mut dest) {
            Err(ExtractError::TaskFailed { task, source }) => {
                assert_eq!(task, "a");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("expected TaskFailed, got {other:?}"),
        }
        assert_eq!(dest, 5);
        assert!(!result.is_success());
    }

    #[test]
    fn panicking_clone_is_contained() {
        let result = TaskResult::ok("f", Some(Arc::new(Fragile(1)) as Payload));
        let mut dest = Fragile(0);

        let err = result.data(&mut dest).unwrap_err();
        match err {
            ExtractError::Panicked { task, message } => {
                assert_eq!(task, "f");
                assert!(message.contains("cannot be copied"));
            }
            other => panic!("expected Panicked, got {other:?}"),
        }
        assert_eq!(dest.0, 0);
    }

    #[test]
    fn result_set_reports_missing_names() {
        let set: ResultSet = vec![TaskResult::ok("a", Some(Arc::new(1i32) as Payload))]
            .into_iter()
            .collect();
        let mut dest = 0i32;

        set.data("a", &mut dest).unwrap();
        assert_eq!(dest, 1);
        assert!(matches!(
            set.data("zzz", &mut dest),
            Err(ExtractError::Missing { .. })
        ));
        assert_eq!(set["a"].name(), "a");
    }
}
