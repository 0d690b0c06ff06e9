use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

use super::builder::DependencyGraph;
use crate::errors::{MigrateError, Result};
use crate::model::MigrationSet;
use crate::{log_op_end, log_op_error, log_op_start};

/// Compute a topological execution order
///
/// Depth-first traversal emitting names in reverse postorder, driven by an
/// explicit stack. Every name in `names` appears exactly once and every
/// dependency precedes its dependents. Nodes are visited in `names` order,
/// so the result is deterministic for a fixed input order.
///
/// # Arguments
/// * `names` - Every migration in the run
/// * `graph` - Adjacency map built from the same migrations
///
/// # Errors
/// * `UnresolvedDependency` - An edge starts at a name not in `names`
/// * `DependencyCycle` - A dependent leads back to a node on the current
///   path; the error carries that path
pub fn topological_order<'a, I>(names: I, graph: &'a DependencyGraph) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&'a str> = names.into_iter().collect();
    let known: BTreeSet<&str> = names.iter().copied().collect();

    // An edge source outside the set is a dependency nobody defined
    for (dependency, dependents) in graph.edges() {
        if !known.contains(dependency.as_str()) {
            return Err(MigrateError::UnresolvedDependency {
                migration: dependents.first().cloned().unwrap_or_default(),
                dependency: dependency.clone(),
            });
        }
    }

    let mut done: HashSet<&'a str> = HashSet::with_capacity(names.len());
    let mut in_progress: HashSet<&'a str> = HashSet::new();
    let mut postorder: Vec<String> = Vec::with_capacity(names.len());

    for start in names {
        if done.contains(start) {
            continue;
        }

        // (node, index of the next dependent to visit)
        let mut stack: Vec<(&'a str, usize)> = vec![(start, 0)];
        in_progress.insert(start);

        while let Some((node, next)) = stack.last_mut() {
            let dependents = graph.dependents(*node);

            if let Some(child) = dependents.get(*next) {
                *next += 1;
                let child = child.as_str();

                if done.contains(child) {
                    continue;
                }

                if in_progress.contains(child) {
                    let mut path: Vec<String> = stack
                        .iter()
                        .skip_while(|(n, _)| *n != child)
                        .map(|(n, _)| n.to_string())
                        .collect();
                    path.push(child.to_string());

                    return Err(MigrateError::DependencyCycle {
                        migration: child.to_string(),
                        path,
                    });
                }

                in_progress.insert(child);
                stack.push((child, 0));
            } else {
                let node = *node;
                stack.pop();
                in_progress.remove(node);
                done.insert(node);
                postorder.push(node.to_string());
            }
        }
    }

    postorder.reverse();
    Ok(postorder)
}

/// Build the dependency graph for a set and order it
///
/// Logs the operation boundary around [`topological_order`].
pub fn order_migrations<H: ?Sized>(set: &MigrationSet<H>) -> Result<Vec<String>> {
    let started = Instant::now();
    log_op_start!("order_migrations", migrations = set.len());

    let graph = DependencyGraph::build(set);
    match topological_order(set.names(), &graph) {
        Ok(order) => {
            log_op_end!(
                "order_migrations",
                duration_ms = started.elapsed().as_millis() as u64,
                roots = graph.roots().len()
            );
            Ok(order)
        }
        Err(err) => {
            log_op_error!(
                "order_migrations",
                err.clone(),
                duration_ms = started.elapsed().as_millis() as u64
            );
            Err(err)
        }
    }
}
