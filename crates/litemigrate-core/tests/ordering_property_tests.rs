#![allow(clippy::unwrap_used, clippy::expect_used)]

// Property tests for dependency ordering: topological validity on random
// DAGs and cycle rejection when a back edge is added.

use std::collections::HashMap;

use litemigrate_core::errors::MigrateError;
use litemigrate_core::{order_migrations, Migration, MigrationSet};
use proptest::prelude::*;

struct NullHandle;

/// Random DAG: node `i` may depend on any node `j < i`. Names are permuted
/// so that name order and dependency order disagree.
fn dag_strategy() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    (1usize..25)
        .prop_flat_map(|n| {
            (
                Just(n),
                proptest::collection::vec(proptest::collection::vec(any::<bool>(), n), n),
                Just((0..n).collect::<Vec<usize>>()).prop_shuffle(),
            )
        })
        .prop_map(|(n, adjacency, permutation)| {
            let name = |i: usize| format!("m{:03}", permutation[i]);
            (0..n)
                .map(|i| {
                    let deps = (0..i).filter(|&j| adjacency[i][j]).map(name).collect();
                    (name(i), deps)
                })
                .collect()
        })
}

fn build_set(dag: &[(String, Vec<String>)]) -> MigrationSet<NullHandle> {
    let migrations = dag.iter().map(|(name, deps)| {
        deps.iter()
            .fold(Migration::new(name.clone()), |m, d| m.depends_on(d.clone()))
    });
    MigrationSet::from_migrations(migrations).unwrap()
}

proptest! {
    #[test]
    fn order_respects_every_dependency(dag in dag_strategy()) {
        let set = build_set(&dag);
        let order = order_migrations(&set).unwrap();

        prop_assert_eq!(order.len(), dag.len());

        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();
        prop_assert_eq!(position.len(), dag.len());

        for (name, deps) in &dag {
            for dep in deps {
                prop_assert!(position[dep.as_str()] < position[name.as_str()]);
            }
        }
    }

    #[test]
    fn order_is_deterministic(dag in dag_strategy()) {
        let first = order_migrations(&build_set(&dag)).unwrap();
        let second = order_migrations(&build_set(&dag)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn back_edge_on_chain_is_cycle(len in 1usize..40) {
        let mut dag: Vec<(String, Vec<String>)> = (0..len)
            .map(|i| {
                let deps = if i == 0 { Vec::new() } else { vec![format!("c{:03}", i - 1)] };
                (format!("c{:03}", i), deps)
            })
            .collect();
        dag[0].1.push(format!("c{:03}", len - 1));

        let err = order_migrations(&build_set(&dag)).unwrap_err();
        let is_cycle = matches!(err, MigrateError::DependencyCycle { .. });
        prop_assert!(is_cycle);
    }
}
