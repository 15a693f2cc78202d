use std::collections::BTreeSet;

use compute_core::domain::job::{JobSettings, JobTask, SparkSubmitTask, TaskKind};
use compute_core::domain::{GraphIntegrityError, JobTaskGraph};
use proptest::prelude::*;

fn key(i: usize) -> String {
    format!("task_{i:02}")
}

fn task(i: usize, deps: &BTreeSet<usize>) -> JobTask {
    deps.iter().fold(
        JobTask::new(key(i), TaskKind::SparkSubmit(SparkSubmitTask::default())),
        |t, d| t.depends_on(key(*d)),
    )
}

// Task N may only depend on tasks 0..N, so the graph is acyclic.
fn dag(max_tasks: usize) -> impl Strategy<Value = Vec<BTreeSet<usize>>> {
    (1..=max_tasks).prop_flat_map(|n| {
        proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..4), n).prop_map(
            |raw| {
                raw.into_iter()
                    .enumerate()
                    .map(|(i, picks)| {
                        if i == 0 {
                            BTreeSet::new()
                        } else {
                            picks.into_iter().map(|p| p % i).collect()
                        }
                    })
                    .collect()
            },
        )
    })
}

fn job(deps: &[BTreeSet<usize>]) -> JobSettings {
    // reversed so declaration order differs from key order
    let tasks = deps.iter().enumerate().rev().map(|(i, d)| task(i, d)).collect();
    JobSettings::multi_task("prop", tasks)
}

proptest! {
    #[test]
    fn random_dag_validates(deps in dag(12)) {
        let settings = job(&deps);
        let validated = JobTaskGraph::validate(&settings);
        prop_assert!(validated.is_ok(), "{:?}", validated.as_ref().err());
        let validated = validated.unwrap();

        prop_assert_eq!(validated.tasks().len(), deps.len());
        let keys: Vec<_> = validated.tasks().iter().map(|t| t.key().to_string()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
        prop_assert!(validated.roots().contains(&key(0).as_str()));
    }

    #[test]
    fn execution_order_respects_edges(deps in dag(12)) {
        let settings = job(&deps);
        let validated = JobTaskGraph::validate(&settings).unwrap();
        let order = validated.execution_order();
        prop_assert_eq!(order.len(), deps.len());

        let position = |k: &str| order.iter().position(|o| *o == k);
        for (i, ds) in deps.iter().enumerate() {
            for d in ds {
                prop_assert!(position(&key(*d)) < position(&key(i)));
            }
        }
    }

    #[test]
    fn back_edge_creates_cycle(deps in dag(12), pick in any::<usize>()) {
        // chain every task to its predecessor, then point task 0 back into the chain
        let n = deps.len();
        let mut deps = deps;
        for i in 1..n {
            deps[i].insert(i - 1);
        }
        deps[0].insert(pick % n);

        let settings = job(&deps);
        let err = JobTaskGraph::validate(&settings).unwrap_err();
        let is_cycle = matches!(err, GraphIntegrityError::CyclicDependency { .. });
        prop_assert!(is_cycle, "{:?}", err);
    }

    #[test]
    fn validation_does_not_mutate_input(deps in dag(8)) {
        let settings = job(&deps);
        let before = settings.clone();
        let _ = JobTaskGraph::validate(&settings);
        prop_assert_eq!(settings, before);
    }
}
