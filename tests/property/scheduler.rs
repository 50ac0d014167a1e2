// tests/property/scheduler.rs

use std::collections::{BTreeSet, HashMap, HashSet};

use dagrun::dag::{validate, ScheduledTask, Scheduler};
use dagrun::{DagrunError, RunPhase, TaskFailure, TaskResult};
use dagrun_test_utils::builders::{sanitize_deps, task_name, GraphBuilder};
use proptest::prelude::*;

// Random acyclic shapes: task N may only depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<BTreeSet<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(sanitize_deps)
    })
}

fn index_of(name: &str) -> usize {
    name.trim_start_matches("task_")
        .parse()
        .expect("generated task names end in an index")
}

proptest! {
    #[test]
    fn scheduler_releases_each_task_once_after_its_dependencies(
        deps in dag_strategy(12),
        picks in proptest::collection::vec(any::<usize>(), 1..64),
        failing in proptest::collection::vec(0..12usize, 0..3),
    ) {
        let graph = GraphBuilder::from_indexed(&deps).build_graph();
        prop_assert!(validate(&graph).is_ok());

        let failing: HashSet<String> = failing
            .into_iter()
            .filter(|&i| i < deps.len())
            .map(task_name)
            .collect();

        let mut scheduler = Scheduler::new(graph);
        let first = scheduler.start_new_run().unwrap();
        prop_assert!(!first.run_finished);

        let mut released: HashSet<String> = HashSet::new();
        let mut succeeded: HashSet<String> = HashSet::new();
        let mut executing: Vec<ScheduledTask> = Vec::new();

        for task in first.newly_scheduled {
            prop_assert!(deps[index_of(&task.name)].is_empty());
            prop_assert!(released.insert(task.name.clone()));
            executing.push(task);
        }

        let mut finished = false;
        let mut failed = None;
        let mut step = 0;

        // Complete in-flight tasks in an arbitrary order until the run ends.
        while !executing.is_empty() {
            let idx = picks[step % picks.len()] % executing.len();
            step += 1;
            let task = executing.swap_remove(idx);

            let result = if failing.contains(&task.name) {
                TaskResult::err(task.name.clone(), TaskFailure::from("injected"))
            } else {
                TaskResult::ok(task.name.clone(), None)
            };

            match scheduler.handle_completion(result) {
                Ok(next) => {
                    succeeded.insert(task.name.clone());
                    for ready in next.newly_scheduled {
                        let i = index_of(&ready.name);
                        prop_assert!(released.insert(ready.name.clone()), "{} released twice", ready.name);
                        for &d in &deps[i] {
                            prop_assert!(succeeded.contains(&task_name(d)));
                        }

                        let mut inputs: Vec<String> = ready.inputs.names().map(String::from).collect();
                        inputs.sort();
                        let mut expected: Vec<String> = deps[i].iter().map(|&d| task_name(d)).collect();
                        expected.sort();
                        prop_assert_eq!(inputs, expected);

                        executing.push(ready);
                    }
                    if next.run_finished {
                        finished = true;
                        break;
                    }
                }
                Err(DagrunError::TaskFailed { task: name, .. }) => {
                    failed = Some(name);
                    break;
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        match failed {
            Some(name) => {
                prop_assert!(failing.contains(&name));
                prop_assert_eq!(scheduler.phase(), RunPhase::Failed);
                prop_assert!(scheduler.result(&name).is_some());
            }
            None => {
                prop_assert!(finished, "run stalled with tasks left");
                prop_assert!(executing.is_empty());
                prop_assert_eq!(released.len(), deps.len());
                prop_assert_eq!(scheduler.results().len(), deps.len());
                prop_assert_eq!(scheduler.phase(), RunPhase::Succeeded);
            }
        }
    }

    #[test]
    fn adding_a_back_edge_is_always_rejected(
        deps in dag_strategy(10),
        seed in any::<usize>(),
    ) {
        let mut deps = deps;
        let j = seed % deps.len();
        // Make one of j's dependencies (or j itself) depend on j.
        let i = deps[j].iter().next().copied().unwrap_or(j);
        deps[i].insert(j);

        let graph = GraphBuilder::from_indexed(&deps).build_graph();
        let outcome = validate(&graph);
        prop_assert!(
            matches!(
                outcome,
                Err(DagrunError::CycleDetected { .. }) | Err(DagrunError::IsolatedCycleDetected { .. })
            ),
            "cycle through {} not detected",
            task_name(j)
        );
        prop_assert!(graph.levels().is_err());
    }

    #[test]
    fn levels_place_each_task_below_its_deepest_dependency(deps in dag_strategy(15)) {
        let graph = GraphBuilder::from_indexed(&deps).build_graph();
        let levels = graph.levels().unwrap();

        let level_of: HashMap<String, usize> = levels
            .iter()
            .enumerate()
            .flat_map(|(l, names)| names.iter().map(move |n| (n.clone(), l)))
            .collect();
        prop_assert_eq!(level_of.len(), deps.len());

        for (i, task_deps) in deps.iter().enumerate() {
            let expected = task_deps
                .iter()
                .map(|&d| level_of[&task_name(d)] + 1)
                .max()
                .unwrap_or(0);
            prop_assert_eq!(level_of[&task_name(i)], expected);
        }
    }
}
