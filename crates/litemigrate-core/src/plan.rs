//! Run planning
//!
//! Narrows a computed execution order to what one run should apply: the
//! requested target's dependency closure, minus migrations the bookkeeping
//! table already records.

use std::collections::{BTreeSet, HashSet};

use crate::errors::{MigrateError, Result};
use crate::model::MigrationSet;
use crate::rules::validation::LATEST_ALIAS;

/// How far a run should migrate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Target {
    /// Every discovered migration
    #[default]
    Latest,
    /// The named migration and everything it transitively depends on
    Named(String),
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        if value == LATEST_ALIAS {
            Target::Latest
        } else {
            Target::Named(value.to_string())
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Latest => write!(f, "{}", LATEST_ALIAS),
            Target::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Migrations selected for one run, both in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunPlan {
    pub to_apply: Vec<String>,
    pub skipped: Vec<String>,
}

/// Select the migrations to run
///
/// # Arguments
/// * `order` - Full topological order of `set`
/// * `set` - The migrations the order was computed from
/// * `target` - `Latest`, or a migration whose dependency closure to keep
/// * `applied` - Names recorded in the bookkeeping table
/// * `skip_applied` - Move names in `applied` to `skipped` instead of re-running them
///
/// # Errors
/// * `MigrationNotFound` - The named target is not in `set`
pub fn plan_run<H: ?Sized>(
    order: &[String],
    set: &MigrationSet<H>,
    target: &Target,
    applied: &BTreeSet<String>,
    skip_applied: bool,
) -> Result<RunPlan> {
    let selected: Option<HashSet<&str>> = match target {
        Target::Latest => None,
        Target::Named(name) => Some(dependency_closure(set, name)?),
    };

    let mut plan = RunPlan::default();
    for name in order {
        if let Some(selected) = &selected {
            if !selected.contains(name.as_str()) {
                continue;
            }
        }

        if skip_applied && applied.contains(name) {
            plan.skipped.push(name.clone());
        } else {
            plan.to_apply.push(name.clone());
        }
    }

    Ok(plan)
}

/// `target` plus every migration reachable through `depends_on`
fn dependency_closure<'a, H: ?Sized>(
    set: &'a MigrationSet<H>,
    target: &str,
) -> Result<HashSet<&'a str>> {
    let root = set
        .get(target)
        .ok_or_else(|| MigrateError::MigrationNotFound {
            name: target.to_string(),
        })?;

    let mut closure: HashSet<&'a str> = HashSet::new();
    let mut pending = vec![root];

    while let Some(migration) = pending.pop() {
        if !closure.insert(migration.name()) {
            continue;
        }

        for dependency in migration.dependencies() {
            let next = set
                .get(dependency)
                .ok_or_else(|| MigrateError::UnresolvedDependency {
                    migration: migration.name().to_string(),
                    dependency: dependency.clone(),
                })?;
            pending.push(next);
        }
    }

    Ok(closure)
}
