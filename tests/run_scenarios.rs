// tests/run_scenarios.rs

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use common::{init_tracing, ms, with_timeout, Person, TestResult};
use dagrun::{body_fn, DagrunError, Executor, RunOptions, RunPhase, Task, TaskBody, TaskRunState};
use dagrun_test_utils::builders::{task_name, GraphBuilder};
use dagrun_test_utils::recorder::Recorder;

#[tokio::test(flavor = "multi_thread")]
async fn diamond_passes_payloads_to_dependents() -> TestResult {
    init_tracing();

    let seen_by_e = Arc::new(Mutex::new(Vec::<String>::new()));
    let seen = seen_by_e.clone();

    let mut exec = Executor::auto([
        (
            "a",
            Task::new(|cb, _| cb.success(vec!["bob".to_string(), "foo".to_string()])),
        ),
        (
            "b",
            Task::new(|cb, _| cb.success("b string".to_string())).after("a"),
        ),
        (
            "c",
            Task::new(|cb, deps| {
                let mut friends: Vec<String> = Vec::new();
                if let Err(e) = deps.data("a", &mut friends) {
                    return cb.failure(e.to_string());
                }
                cb.success(Person {
                    name: "from c".to_string(),
                    friends,
                })
            })
            .after("a"),
        ),
        (
            "e",
            Task::new(move |cb, deps| {
                let mut names: Vec<String> = deps.names().map(String::from).collect();
                names.sort();
                *seen.lock().unwrap() = names;

                let mut b = String::new();
                let mut c = Person::default();
                let extracted = deps
                    .data("b", &mut b)
                    .and_then(|()| deps.data("c", &mut c));
                match extracted {
                    Ok(()) => {
                        let joined = HashMap::from([
                            ("b".to_string(), b),
                            ("c".to_string(), c.name),
                        ]);
                        cb.success(joined)
                    }
                    Err(e) => cb.failure(e.to_string()),
                }
            })
            .after_all(["a", "b", "c"]),
        ),
    ])?;

    with_timeout(exec.run(RunOptions::default())).await?;

    assert_eq!(exec.phase(), RunPhase::Succeeded);
    assert_eq!(*seen_by_e.lock().unwrap(), vec!["a", "b", "c"]);

    let mut names = exec.task_names();
    names.sort();
    assert_eq!(names, vec!["a", "b", "c", "e"]);

    let mut person = Person::default();
    exec.result("c").unwrap().data(&mut person)?;
    assert_eq!(person.name, "from c");
    assert_eq!(person.friends, vec!["bob", "foo"]);

    let mut joined: HashMap<String, String> = HashMap::new();
    exec.result("e").unwrap().data(&mut joined)?;
    assert_eq!(joined["b"], "b string");
    assert_eq!(joined["c"], "from c");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn first_failure_ends_the_run_and_skips_dependents() -> TestResult {
    init_tracing();

    let mut exec = Executor::auto([
        ("a", Task::new(|cb, _| cb.failure("boom"))),
        (
            "b",
            Task::new(|cb, _| cb.success("b string".to_string())).after("a"),
        ),
    ])?;

    let err = with_timeout(exec.run(RunOptions::default()))
        .await
        .unwrap_err();

    match err {
        DagrunError::TaskFailed { task, source } => {
            assert_eq!(task, "a");
            assert_eq!(source.to_string(), "boom");
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }

    assert_eq!(exec.phase(), RunPhase::Failed);
    assert_eq!(exec.task_names(), vec!["a"]);
    assert_eq!(
        exec.result("a").and_then(|r| r.error()).map(|e| e.to_string()),
        Some("boom".to_string())
    );
    assert!(exec.result("b").is_none());
    assert_eq!(exec.run_state_of("b"), Some(TaskRunState::Pending));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn parallel_names_tasks_by_position_and_starts_them_together() -> TestResult {
    init_tracing();

    let recorder = Recorder::new();
    let first = recorder.clone();
    let second = recorder.clone();

    let bodies: Vec<Arc<dyn TaskBody>> = vec![
        body_fn(move |cb, deps| {
            assert!(deps.is_empty());
            thread::sleep(ms(20));
            first.mark_finished("0");
            cb.success(0i32)
        }),
        body_fn(move |cb, _| {
            thread::sleep(ms(20));
            second.mark_finished("1");
            cb.success(String::new())
        }),
    ];
    let mut exec = Executor::parallel(bodies)?;

    with_timeout(exec.run_with(RunOptions::default(), recorder.backend())).await?;

    let mut names = exec.task_names();
    names.sort();
    assert_eq!(names, vec!["0", "1"]);

    // Both bodies are dispatched in the first wave, before either finishes.
    let earliest_finish = ["0", "1"]
        .iter()
        .filter_map(|name| recorder.finished_at(name))
        .min()
        .unwrap();
    let dispatches = recorder.dispatches();
    assert_eq!(dispatches.len(), 2);
    assert!(dispatches.iter().all(|d| d.at <= earliest_finish && d.inputs.is_empty()));

    let mut number = 7i32;
    exec.result("0").unwrap().data(&mut number)?;
    assert_eq!(number, 0);

    let mut text = "overwritten".to_string();
    exec.result("1").unwrap().data(&mut text)?;
    assert!(text.is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn run_without_completion_times_out() -> TestResult {
    init_tracing();

    let mut exec = Executor::auto([
        ("quick", Task::new(|cb, _| cb.success(1u8))),
        ("silent", Task::new(|_cb, _| {})),
    ])?;

    let started = Instant::now();
    let err = with_timeout(exec.run(RunOptions::with_timeout(ms(100))))
        .await
        .unwrap_err();

    assert!(matches!(err, DagrunError::Timeout(d) if d == ms(100)));
    assert!(started.elapsed() >= ms(100));
    assert_eq!(exec.phase(), RunPhase::TimedOut);
    assert!(exec.result("silent").is_none());
    assert!(exec.result("quick").is_some_and(|r| r.is_success()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unbounded_timeout_runs_to_completion() -> TestResult {
    init_tracing();

    let mut exec = Executor::auto([("a", Task::new(|cb, _| cb.success(1u8)))])?;
    with_timeout(exec.run(RunOptions::with_timeout(Duration::MAX))).await?;

    assert_eq!(exec.phase(), RunPhase::Succeeded);
    assert!(exec.result("a").is_some_and(|r| r.is_success()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn dropping_the_run_future_cancels_the_run() -> TestResult {
    init_tracing();

    let mut exec = Executor::auto([
        ("quick", Task::new(|cb, _| cb.success_empty())),
        ("silent", Task::new(|_cb, _| {})),
    ])?;

    let outer = tokio::time::timeout(ms(100), exec.run(RunOptions::default())).await;
    assert!(outer.is_err());

    assert_eq!(exec.phase(), RunPhase::Cancelled);
    assert!(exec.phase().is_terminal());
    assert!(exec.result("quick").is_some());
    assert!(exec.result("silent").is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_graph_succeeds_immediately() -> TestResult {
    let mut exec = Executor::auto(Vec::<(String, Task)>::new())?;
    assert!(exec.is_empty());

    with_timeout(exec.run(RunOptions::default())).await?;

    assert_eq!(exec.phase(), RunPhase::Succeeded);
    assert!(exec.task_names().is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn rerun_starts_from_a_clean_result_store() -> TestResult {
    init_tracing();

    let mut exec = GraphBuilder::chain(3).build();

    with_timeout(exec.run(RunOptions::default())).await?;
    assert_eq!(exec.task_names().len(), 3);

    with_timeout(exec.run(RunOptions::default())).await?;
    assert_eq!(exec.task_names().len(), 3);
    assert_eq!(exec.run_state_of("task_2"), Some(TaskRunState::DoneSuccess));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn query_helpers_skip_missing_names() -> TestResult {
    let mut exec = GraphBuilder::chain(2).build();
    with_timeout(exec.run(RunOptions::default())).await?;

    let subset = exec.results(["task_1", "nope"]);
    assert_eq!(subset.len(), 1);
    assert!(subset.contains("task_1"));

    let all = exec.all_results();
    assert_eq!(all.len(), 2);

    let mut echoed = String::new();
    all.data("task_0", &mut echoed)?;
    assert_eq!(echoed, "task_0");
    assert!(exec.run_state_of("nope").is_none());
    Ok(())
}

#[test]
fn run_blocking_works_without_a_runtime() -> TestResult {
    init_tracing();

    let mut exec = GraphBuilder::chain(4).build();
    exec.run_blocking(RunOptions::default())?;

    let mut last = String::new();
    exec.result(&task_name(3)).unwrap().data(&mut last)?;
    assert_eq!(last, "task_3");
    Ok(())
}

#[test]
fn plan_groups_tasks_by_depth() -> TestResult {
    let exec = GraphBuilder::new()
        .with_noop("a", &[])
        .with_noop("b", &["a"])
        .with_noop("c", &["a"])
        .with_noop("d", &[])
        .with_noop("e", &["b", "c", "d"])
        .build();

    let plan = exec.plan()?;
    assert_eq!(plan.len(), 3);

    let mut first = plan[0].clone();
    first.sort();
    assert_eq!(first, vec!["a", "d"]);

    let mut second = plan[1].clone();
    second.sort();
    assert_eq!(second, vec!["b", "c"]);

    assert_eq!(plan[2], vec!["e"]);
    Ok(())
}
