use std::collections::BTreeMap;

use crate::model::MigrationSet;

/// Adjacency structure over migration names
///
/// `edges[d]` lists the migrations that declare `d` in `depends_on`, so an
/// edge reads "must run before". Built fresh per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: BTreeMap<String, Vec<String>>,
    roots: Vec<String>,
}

impl DependencyGraph {
    /// Build the graph for a migration set
    ///
    /// Edge targets are not checked against the set here. A dependency that
    /// names an absent migration is reported when the graph is ordered.
    pub fn build<H: ?Sized>(set: &MigrationSet<H>) -> Self {
        let mut graph = Self::default();

        for migration in set.iter() {
            if migration.is_root() {
                graph.roots.push(migration.name().to_string());
                continue;
            }

            for dependency in migration.dependencies() {
                graph
                    .edges
                    .entry(dependency.clone())
                    .or_default()
                    .push(migration.name().to_string());
            }
        }

        graph
    }

    /// Direct dependents of `name`; empty when it has none
    pub fn dependents(&self, name: &str) -> &[String] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Migrations with no dependencies, in set order
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Full adjacency map, keyed by dependency name
    pub fn edges(&self) -> &BTreeMap<String, Vec<String>> {
        &self.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Migration;

    struct NullHandle;

    fn set(migrations: Vec<Migration<NullHandle>>) -> MigrationSet<NullHandle> {
        MigrationSet::from_migrations(migrations).unwrap()
    }

    #[test]
    fn test_roots_and_edges() {
        let set = set(vec![
            Migration::new("initial"),
            Migration::new("users").depends_on("initial"),
            Migration::new("posts")
                .depends_on("initial")
                .depends_on("users"),
        ]);

        let graph = DependencyGraph::build(&set);

        assert_eq!(graph.roots(), ["initial"]);
        assert_eq!(graph.dependents("initial"), ["posts", "users"]);
        assert_eq!(graph.dependents("users"), ["posts"]);
        assert!(graph.dependents("posts").is_empty());
    }

    #[test]
    fn test_missing_dependency_still_gets_edge() {
        let set = set(vec![Migration::new("orphan").depends_on("ghost")]);

        let graph = DependencyGraph::build(&set);

        assert!(graph.roots().is_empty());
        assert_eq!(graph.dependents("ghost"), ["orphan"]);
    }

    #[test]
    fn test_unknown_name_has_no_dependents() {
        let graph = DependencyGraph::default();
        assert!(graph.dependents("nothing").is_empty());
    }
}
