// tests/common/mod.rs

#![allow(dead_code)]

use std::error::Error;
use std::time::Duration;

pub use dagrun_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn Error>>;

/// Struct payload handed between tasks in the scenario tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub name: String,
    pub friends: Vec<String>,
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Poll `cond` every 10ms until it holds or `limit` passes.
pub fn wait_until(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < limit {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    cond()
}
